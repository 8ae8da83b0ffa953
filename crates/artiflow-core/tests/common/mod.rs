#![allow(dead_code)]

use std::sync::Arc;

use artiflow_core::{action_kind, setup, KindRegistry, Options};
use artiflow_store::{ArtifactServer, InMemoryObjectStore, WorkQueue};
use once_cell::sync::Lazy;

action_kind!(Kustomization, "kustomize.toolkit.fluxcd.io", "Kustomization");
action_kind!(HelmRelease, "helm.toolkit.fluxcd.io", "HelmRelease");

pub static BUILTIN: Lazy<KindRegistry> = Lazy::new(KindRegistry::builtin_sources);
pub static SERVER: Lazy<ArtifactServer> = Lazy::new(|| ArtifactServer::new("http://artifacts.local"));

pub struct Harness {
    pub store: Arc<InMemoryObjectStore>,
    pub queue: Arc<WorkQueue>,
}

/// Store + cola con el controller de `Kustomization` ya registrado.
pub fn harness(options: &Options) -> Harness {
    let store = Arc::new(InMemoryObjectStore::default());
    let queue = Arc::new(WorkQueue::new());
    setup(store.clone(), &BUILTIN, Kustomization::kind(), options).expect("setup")
                                                                  .complete(store.as_ref(), queue.clone())
                                                                  .expect("complete");
    Harness { store, queue }
}

//! Escenario de demostración end-to-end sobre el substrate en memoria.
//!
//! 1. Una Kustomization `app/myapp` referencia `GitRepository repo1`.
//! 2. El repositorio publica su primer artifact (`v1`): la Action se encola.
//! 3. La Action resuelve su source y lee la revisión.
//! 4. Una segunda Action referencia un source dinámico (`ComponentVersion`)
//!    publicado a través de un proxy `Artifact`.
use std::sync::Arc;

use artiflow_core::constants::SOURCE_GROUP;
use artiflow_core::{action_kind, get_source, Artifact, Digest, GenericSource, GitRepository, GroupKind,
                    KindRegistry, Request, SourceMatcher, SourceRef};
use artiflow_store::{apply_generic_source, ArtifactServer, InMemoryObjectStore, WorkQueue};
use log::info;
use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::AppError;

action_kind!(Kustomization, "kustomize.toolkit.fluxcd.io", "Kustomization");

/// Resultado observable del escenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    /// Work items emitidos al publicar el primer artifact.
    pub requests: Vec<Request>,
    pub resolved_revision: Option<String>,
    pub resolved_digest: Option<String>,
    /// Work items emitidos al publicar el source dinámico.
    pub dynamic_requests: Vec<Request>,
    /// Clave del objeto resuelto para la referencia dinámica.
    pub dynamic_resolved: String,
}

pub fn run_scenario(config: &AppConfig) -> Result<DemoReport, AppError> {
    let options = config.options();
    let git_kind = GroupKind::new(SOURCE_GROUP, "GitRepository");
    if let Some(allowed) = &options.allowed_source_kinds {
        if !allowed.matches(&git_kind) {
            return Err(AppError::Config(format!("the demo needs {git_kind} among the allowed source kinds")));
        }
    }

    let registry = KindRegistry::builtin_sources();
    let store = Arc::new(InMemoryObjectStore::new(config.store.clone()));
    let queue = Arc::new(WorkQueue::new());
    artiflow_core::setup(store.clone(), &registry, Kustomization::kind(), &options)?
        .complete(store.as_ref(), queue.clone())?;

    store.create(Kustomization::new("app", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1")))?;
    store.create(GitRepository::new("app", "repo1"))?;
    let initial = queue.drain();
    info!("initial work items: {initial:?}");

    let content = b"apiVersion: v1\nkind: ConfigMap\n";
    let artifact = Artifact::new("http://artifacts.local/app/repo1/v1.tar.gz", "v1")
        .with_digest(Digest::sha256(content).to_string())
        .with_size(content.len() as i64);
    store.update(GitRepository::new("app", "repo1").with_artifact(artifact))?;
    let requests = queue.drain();
    info!("artifact v1 published, work items: {requests:?}");

    let ctx = config.store.dispatch_context();
    let action = Kustomization::new("app", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1"));
    let resolved = get_source(&ctx, store.as_ref(), &registry, &action, &options)?;
    let resolved_revision = resolved.artifact().map(|a| a.revision.clone());
    let resolved_digest = resolved.artifact().and_then(|a| a.digest.clone());
    info!("app/myapp resolved {} at {resolved_revision:?}", resolved.reference());

    let cv_ref = SourceRef::new("ocm.software/v1alpha1", "ComponentVersion", "cv1");
    store.create(Kustomization::new("app", "component").with_source_ref(cv_ref.clone()))?;
    queue.drain();
    let server = ArtifactServer::new("http://artifacts.local");
    apply_generic_source(store.as_ref(),
                         &server,
                         GenericSource::new(GroupKind::new("ocm.software", "ComponentVersion"), "app", "cv1"),
                         "app/cv1/1.0.0.tar.gz",
                         b"component descriptor",
                         "1.0.0")?;
    let dynamic_requests = queue.drain();
    info!("component version published, work items: {dynamic_requests:?}");

    let component = Kustomization::new("app", "component").with_source_ref(cv_ref);
    let dynamic = get_source(&ctx, store.as_ref(), &registry, &component, &options)?;
    let dynamic_resolved = artiflow_core::Reference::from_object(dynamic.object().as_ref()).key();

    Ok(DemoReport { requests,
                    resolved_revision,
                    resolved_digest,
                    dynamic_requests,
                    dynamic_resolved })
}

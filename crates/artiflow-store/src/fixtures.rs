//! Helpers para tests y demos: publican proxies `Artifact` en el store con
//! URL `<base>/<path>` y digest sha256 del contenido.
use std::sync::Arc;

use artiflow_core::constants::ARTIFACT_GROUP;
use artiflow_core::{Artifact, ArtifactResource, Digest, GenericSource, ObjectKey, OwnerReference, Resource, SourceRef,
                    StoreError};
use thiserror::Error;

use crate::memory::InMemoryObjectStore;

/// Versión con la que se construyen los `apiVersion` de los fixtures.
pub const FIXTURE_VERSION: &str = "v1alpha1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FixtureError {
    #[error("source group and kind must be set")]
    MissingKind,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Servidor de artifacts simulado: sólo compone URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactServer {
    base_url: String,
}

impl ArtifactServer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Artifact servido en `path` con el digest de `content`.
    pub fn artifact(&self, path: &str, content: &[u8], revision: &str) -> Artifact {
        Artifact::new(self.url(path), revision).with_digest(Digest::sha256(content).to_string())
                                               .with_size(content.len() as i64)
    }
}

fn api_version(group: &str) -> String {
    if group.is_empty() {
        FIXTURE_VERSION.to_string()
    } else {
        format!("{group}/{FIXTURE_VERSION}")
    }
}

/// Publica (crea o actualiza) un Artifact sin dueño y devuelve la referencia
/// que una Action usaría para apuntarlo.
pub fn apply_artifact(store: &InMemoryObjectStore,
                      server: &ArtifactServer,
                      key: &ObjectKey,
                      path: &str,
                      content: &[u8],
                      revision: &str)
                      -> Result<SourceRef, FixtureError> {
    let art = ArtifactResource::new(key.namespace.clone(),
                                    key.name.clone(),
                                    server.artifact(path, content, revision));
    store.apply(art)?;
    Ok(SourceRef::new(api_version(ARTIFACT_GROUP), ArtifactResource::kind().kind, key.name.clone())
        .in_namespace(key.namespace.clone()))
}

/// Crea un source de kind dinámico y su proxy Artifact (mismo nombre y
/// namespace, con owner reference al source). Devuelve la referencia al
/// source.
pub fn apply_generic_source(store: &InMemoryObjectStore,
                            server: &ArtifactServer,
                            source: GenericSource,
                            path: &str,
                            content: &[u8],
                            revision: &str)
                            -> Result<SourceRef, FixtureError> {
    let gk = source.group_kind.clone();
    if gk.group.is_empty() || gk.kind.is_empty() {
        return Err(FixtureError::MissingKind);
    }
    let created: Arc<dyn Resource> = store.create(source)?;
    let meta = created.meta();

    let mut art = ArtifactResource::new(meta.namespace.clone(),
                                        meta.name.clone(),
                                        server.artifact(path, content, revision));
    art.metadata.owner_references.push(OwnerReference::to(created.as_ref(), FIXTURE_VERSION));
    store.apply(art)?;

    Ok(SourceRef::new(api_version(&gk.group), gk.kind, meta.name.clone()).in_namespace(meta.namespace.clone()))
}

#[cfg(test)]
mod tests {
    use artiflow_core::{Context, GroupKind, ObjectStore};

    use super::*;

    #[test]
    fn artifact_carries_sha256_digest_and_url() {
        let server = ArtifactServer::new("http://localhost:9000/");
        let a = server.artifact("/repo/v1.tar.gz", b"hello", "v1");
        assert_eq!(a.url, "http://localhost:9000/repo/v1.tar.gz");
        assert_eq!(a.digest.as_deref(),
                   Some("sha256:2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"));
        assert_eq!(a.size, Some(5));
    }

    #[test]
    fn generic_source_gets_owned_proxy() {
        let store = InMemoryObjectStore::default();
        let server = ArtifactServer::new("http://localhost:9000");
        let cv = GenericSource::new(GroupKind::new("ocm.software", "ComponentVersion"), "app", "cv1");
        let sref = apply_generic_source(&store, &server, cv, "cv1.tgz", b"x", "1.0.0").expect("apply");
        assert_eq!(sref.api_version, "ocm.software/v1alpha1");

        let proxy = store.get(&Context::background(), &ArtifactResource::kind(), &ObjectKey::new("app", "cv1"))
                         .expect("proxy stored");
        let owner = &proxy.meta().owner_references[0];
        assert_eq!(owner.kind, "ComponentVersion");
        assert!(owner.uid.is_some());
    }

    #[test]
    fn generic_source_requires_kind() {
        let store = InMemoryObjectStore::default();
        let server = ArtifactServer::new("http://localhost:9000");
        let bad = GenericSource::new(GroupKind::new("", ""), "app", "x");
        assert_eq!(apply_generic_source(&store, &server, bad, "x.tgz", b"x", "1"),
                   Err(FixtureError::MissingKind));
    }
}

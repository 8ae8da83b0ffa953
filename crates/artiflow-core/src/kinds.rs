//! Kinds bien conocidos: sources builtin, el proxy `Artifact` y un source
//! genérico para kinds dinámicos.
use std::any::Any;

use crate::constants::{
    ARTIFACT_GROUP, ARTIFACT_KIND, BUCKET_KIND, GIT_REPOSITORY_KIND, HELM_CHART_KIND, HELM_REPOSITORY_KIND,
    OCI_REPOSITORY_KIND, SOURCE_GROUP,
};
use crate::model::Artifact;
use crate::object::{ArtifactSource, ObjectMeta, Resource};
use crate::reference::{GroupKind, SourceRef};
use crate::source_kind;

/// Estado observado de un Source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStatus {
    pub artifact: Option<Artifact>,
    pub observed_generation: i64,
}

/// Spec mínimo de una Action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionSpec {
    pub source_ref: Option<SourceRef>,
}

source_kind!(GitRepository, SOURCE_GROUP, GIT_REPOSITORY_KIND);
source_kind!(Bucket, SOURCE_GROUP, BUCKET_KIND);
source_kind!(OciRepository, SOURCE_GROUP, OCI_REPOSITORY_KIND);
source_kind!(HelmRepository, SOURCE_GROUP, HELM_REPOSITORY_KIND);
source_kind!(HelmChart, SOURCE_GROUP, HELM_CHART_KIND);

/// Proxy `Artifact`: proyección como recurso del artifact de un source de
/// kind no builtin. Su dueño (owner reference) es el source real.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactResource {
    pub metadata: ObjectMeta,
    pub spec: Artifact,
}

impl ArtifactResource {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, spec: Artifact) -> Self {
        Self { metadata: ObjectMeta::new(namespace, name),
               spec }
    }

    pub fn kind() -> GroupKind {
        GroupKind::new(ARTIFACT_GROUP, ARTIFACT_KIND)
    }
}

impl Default for ArtifactResource {
    fn default() -> Self {
        Self::new("", "", Artifact::new("", ""))
    }
}

impl Resource for ArtifactResource {
    fn group_kind(&self) -> GroupKind {
        Self::kind()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn clone_resource(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_source(&self) -> Option<&dyn ArtifactSource> {
        Some(self)
    }
}

impl ArtifactSource for ArtifactResource {
    // El spec siempre contiene un artifact.
    fn artifact(&self) -> Option<&Artifact> {
        Some(&self.spec)
    }
}

/// Source de kind arbitrario conocido sólo en tiempo de ejecución.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSource {
    pub group_kind: GroupKind,
    pub metadata: ObjectMeta,
    pub status: SourceStatus,
}

impl GenericSource {
    pub fn new(group_kind: GroupKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { group_kind,
               metadata: ObjectMeta::new(namespace, name),
               status: SourceStatus::default() }
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.status.artifact = Some(artifact);
        self
    }
}

impl Resource for GenericSource {
    fn group_kind(&self) -> GroupKind {
        self.group_kind.clone()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn clone_resource(&self) -> Box<dyn Resource> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_source(&self) -> Option<&dyn ArtifactSource> {
        Some(self)
    }
}

impl ArtifactSource for GenericSource {
    fn artifact(&self) -> Option<&Artifact> {
        self.status.artifact.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_kind;

    action_kind!(Kustomization, "kustomize.toolkit.fluxcd.io", "Kustomization");

    #[test]
    fn builtin_sources_expose_status_artifact() {
        let repo = GitRepository::new("app", "repo1");
        assert!(repo.as_source().and_then(|s| s.artifact()).is_none());
        let repo = repo.with_artifact(Artifact::new("http://x/repo1.tgz", "v1"));
        let src = repo.as_source().expect("git repository is a source");
        assert_eq!(src.artifact().map(|a| a.revision.as_str()), Some("v1"));
        assert_eq!(repo.group_kind(), GroupKind::new(SOURCE_GROUP, "GitRepository"));
        assert!(repo.as_action().is_none());
    }

    #[test]
    fn action_kind_validates_its_reference() {
        let ks = Kustomization::new("app", "myapp");
        let action = ks.as_action().expect("kustomization is an action");
        assert!(action.source_ref().is_err());

        let ks = ks.with_source_ref(SourceRef::new("", "GitRepository", "repo1"));
        assert_eq!(ks.as_action().and_then(|a| a.source_ref().ok()).map(|r| r.name),
                   Some("repo1".to_string()));

        let ks = Kustomization::new("app", "bad").with_source_ref(SourceRef::new("", "", "repo1"));
        assert!(ks.as_action().map(|a| a.source_ref().is_err()).unwrap_or(false));
    }

    #[test]
    fn clone_resource_is_a_deep_copy() {
        let art = ArtifactResource::new("ns", "a", Artifact::new("u", "v1"));
        let copy = art.clone_resource();
        let back = copy.downcast_ref::<ArtifactResource>().expect("same concrete type");
        assert_eq!(back, &art);
    }
}

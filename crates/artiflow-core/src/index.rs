//! Funciones de índice que el motor registra en el substrate y el helper de
//! lookup tolerante a fallos.
//!
//! - Índice inverso (`SOURCE_REF_INDEX`, uno por kind de Action): clave de la
//!   referencia declarada y normalizada -> Action.
//! - Índice de dueños (`ARTIFACT_OWNER_INDEX`, sobre el kind Artifact): clave
//!   propia del Artifact + clave de cada owner reference -> Artifact.
use std::sync::Arc;

use log::{debug, warn};

use crate::context::Context;
use crate::errors::IndexError;
use crate::object::Resource;
use crate::reference::{GroupKind, Reference};
use crate::store::{IndexFn, ObjectStore};

/// Clave de índice para la referencia declarada por una Action, o `None` si
/// la referencia es inválida.
pub fn source_ref_key(obj: &dyn Resource) -> Result<Option<String>, IndexError> {
    let action = obj.as_action()
                    .ok_or_else(|| IndexError::NotAnAction(obj.group_kind()))?;
    match action.source_ref() {
        Ok(source_ref) => Ok(Some(source_ref.to_reference()
                                            .normalize(&obj.meta().namespace)
                                            .key())),
        Err(e) => {
            warn!("skipping source ref index for {}/{}: {e}",
                  obj.meta().namespace,
                  obj.meta().name);
            Ok(None)
        }
    }
}

/// Índice inverso de referencias declaradas.
pub fn source_ref_index() -> IndexFn {
    Arc::new(|obj: &dyn Resource| -> Result<Vec<String>, IndexError> {
        Ok(source_ref_key(obj)?.into_iter().collect())
    })
}

/// Claves bajo las que se indexa un Artifact: la propia primero y luego una
/// por owner reference (el dueño vive en el namespace del Artifact).
pub fn owner_keys(obj: &dyn Resource) -> Vec<String> {
    let meta = obj.meta();
    let mut keys = Vec::with_capacity(1 + meta.owner_references.len());
    keys.push(Reference::from_object(obj).key());
    for owner in &meta.owner_references {
        keys.push(Reference::from_owner(owner, &meta.namespace).key());
    }
    keys
}

/// Índice de cadena de dueños sobre `artifact_kind`.
pub fn owner_reference_index(artifact_kind: GroupKind) -> IndexFn {
    Arc::new(move |obj: &dyn Resource| -> Result<Vec<String>, IndexError> {
        let actual = obj.group_kind();
        if actual != artifact_kind {
            return Err(IndexError::UnexpectedKind { expected: artifact_kind.clone(),
                                                    actual });
        }
        Ok(owner_keys(obj))
    })
}

/// Lookup que degrada a "sin resultados" ante cualquier error del substrate
/// (incluida la cancelación). Sólo para el camino de propagación.
pub fn lookup(store: &dyn ObjectStore, ctx: &Context, kind: &GroupKind, index: &str, key: &str) -> Vec<Arc<dyn Resource>> {
    debug!("lookup:start kind={kind} index={index} key={key}");
    match store.list(ctx, kind, index, key) {
        Ok(objs) => {
            debug!("lookup:done kind={kind} key={key} count={}", objs.len());
            objs
        }
        Err(e) => {
            warn!("failed to list objects for revision change: kind={kind} index={index} key={key}: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_kind;
    use crate::constants::{ARTIFACT_GROUP, SOURCE_GROUP};
    use crate::kinds::{ArtifactResource, GitRepository};
    use crate::model::Artifact;
    use crate::object::OwnerReference;
    use crate::reference::SourceRef;

    action_kind!(Kustomization, "kustomize.toolkit.fluxcd.io", "Kustomization");

    #[test]
    fn source_ref_index_normalizes_namespace() {
        let ks = Kustomization::new("app", "myapp").with_source_ref(SourceRef::new("", "GitRepository", "repo1"));
        let keys = source_ref_index()(&ks).expect("action object");
        assert_eq!(keys, vec![format!("{SOURCE_GROUP}/GitRepository/app/repo1")]);

        let ks = Kustomization::new("app", "other").with_source_ref(SourceRef::new("", "GitRepository", "repo1").in_namespace("shared"));
        let keys = source_ref_index()(&ks).expect("action object");
        assert_eq!(keys, vec![format!("{SOURCE_GROUP}/GitRepository/shared/repo1")]);
    }

    #[test]
    fn invalid_reference_contributes_no_key() {
        let ks = Kustomization::new("app", "myapp");
        assert_eq!(source_ref_index()(&ks), Ok(vec![]));
    }

    #[test]
    fn non_action_is_a_typed_error() {
        let repo = GitRepository::new("app", "repo1");
        assert_eq!(source_ref_index()(&repo), Err(IndexError::NotAnAction(GitRepository::kind())));
    }

    #[test]
    fn owner_index_includes_self_and_owners() {
        let mut art = ArtifactResource::new("app", "cv1", Artifact::new("u", "v1"));
        art.metadata.owner_references.push(OwnerReference { api_version: "ocm.software/v1alpha1".into(),
                                                            kind: "ComponentVersion".into(),
                                                            name: "cv1".into(),
                                                            uid: None });
        let keys = owner_reference_index(ArtifactResource::kind())(&art).expect("artifact object");
        assert_eq!(keys,
                   vec![format!("{ARTIFACT_GROUP}/Artifact/app/cv1"),
                        "ocm.software/ComponentVersion/app/cv1".to_string()]);
    }

    #[test]
    fn owner_index_rejects_other_kinds() {
        let repo = GitRepository::new("app", "repo1");
        assert!(matches!(owner_reference_index(ArtifactResource::kind())(&repo),
                         Err(IndexError::UnexpectedKind { .. })));
    }
}

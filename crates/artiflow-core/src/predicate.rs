//! Predicados de eventos.
//!
//! `SourceRevisionChangePredicate` decide, para cada update de un Source o
//! Artifact, si hubo un cambio de revisión relevante:
//!
//! | old artifact | new artifact | dispara |
//! |---|---|---|
//! | ausente | presente | sí |
//! | presente | presente, otra revisión | sí |
//! | presente | presente, misma revisión | no |
//! | cualquiera | ausente | no |
//!
//! Create/delete/generic no se evalúan aquí: pasan tal cual por los caminos
//! genéricos del substrate.
use std::sync::Arc;

use crate::constants::RECONCILE_REQUESTED_ANNOTATION;
use crate::model::Artifact;
use crate::object::Resource;
use crate::store::{EventPredicate, WatchEvent};

/// Tabla de decisión de cambio de revisión.
pub fn revision_changed(old: Option<&Artifact>, new: Option<&Artifact>) -> bool {
    match (old, new) {
        (None, Some(_)) => true,
        (Some(old), Some(new)) => !old.has_revision(&new.revision),
        (_, None) => false,
    }
}

fn update_pair(event: &WatchEvent) -> Option<(&Arc<dyn Resource>, &Arc<dyn Resource>)> {
    match event {
        WatchEvent::Update { old: Some(old), new: Some(new) } => Some((old, new)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SourceRevisionChangePredicate;

impl EventPredicate for SourceRevisionChangePredicate {
    fn accepts(&self, event: &WatchEvent) -> bool {
        if !matches!(event, WatchEvent::Update { .. }) {
            return true;
        }
        let Some((old, new)) = update_pair(event) else {
            return false;
        };
        let (Some(old_src), Some(new_src)) = (old.as_source(), new.as_source()) else {
            return false;
        };
        revision_changed(old_src.artifact(), new_src.artifact())
    }
}

/// Update dispara sólo si cambió `metadata.generation` (cambios de spec).
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationChangedPredicate;

impl EventPredicate for GenerationChangedPredicate {
    fn accepts(&self, event: &WatchEvent) -> bool {
        if !matches!(event, WatchEvent::Update { .. }) {
            return true;
        }
        match update_pair(event) {
            Some((old, new)) => old.meta().generation != new.meta().generation,
            None => false,
        }
    }
}

/// Update dispara si la anotación de reconciliación manual cambió a un
/// valor no vacío.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileRequestedPredicate;

impl EventPredicate for ReconcileRequestedPredicate {
    fn accepts(&self, event: &WatchEvent) -> bool {
        if !matches!(event, WatchEvent::Update { .. }) {
            return true;
        }
        let Some((old, new)) = update_pair(event) else {
            return false;
        };
        match new.meta().annotations.get(RECONCILE_REQUESTED_ANNOTATION) {
            Some(requested) if !requested.is_empty() => {
                old.meta().annotations.get(RECONCILE_REQUESTED_ANNOTATION) != Some(requested)
            }
            _ => false,
        }
    }
}

/// OR lógico de predicados.
#[derive(Debug, Clone)]
pub struct AnyPredicate(pub Vec<Arc<dyn EventPredicate>>);

impl EventPredicate for AnyPredicate {
    fn accepts(&self, event: &WatchEvent) -> bool {
        self.0.iter().any(|p| p.accepts(event))
    }
}

/// Deja pasar todos los eventos.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllEvents;

impl EventPredicate for AllEvents {
    fn accepts(&self, _event: &WatchEvent) -> bool {
        true
    }
}

/// Predicado por defecto del watch sobre la propia Action.
pub fn default_for_predicate() -> Arc<dyn EventPredicate> {
    Arc::new(AnyPredicate(vec![Arc::new(GenerationChangedPredicate),
                               Arc::new(ReconcileRequestedPredicate)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::GitRepository;

    fn art(revision: &str) -> Artifact {
        Artifact::new(format!("http://x/{revision}.tgz"), revision)
    }

    fn repo(artifact: Option<Artifact>) -> Arc<dyn Resource> {
        let mut r = GitRepository::new("app", "repo1");
        r.status.artifact = artifact;
        Arc::new(r)
    }

    fn update(old: Option<Artifact>, new: Option<Artifact>) -> WatchEvent {
        WatchEvent::Update { old: Some(repo(old)),
                             new: Some(repo(new)) }
    }

    #[test]
    fn revision_table() {
        assert!(revision_changed(None, Some(&art("v1"))));
        assert!(!revision_changed(Some(&art("v1")), Some(&art("v1"))));
        assert!(revision_changed(Some(&art("v1")), Some(&art("v2"))));
        assert!(!revision_changed(Some(&art("v1")), None));
        assert!(!revision_changed(None, None));
    }

    #[test]
    fn same_revision_with_new_digest_does_not_fire() {
        let old = art("v1").with_digest("sha256:aaa");
        let new = art("v1").with_digest("sha256:bbb");
        assert!(!SourceRevisionChangePredicate.accepts(&update(Some(old), Some(new))));
    }

    #[test]
    fn predicate_evaluates_updates_only() {
        let p = SourceRevisionChangePredicate;
        assert!(p.accepts(&update(None, Some(art("v1")))));
        assert!(p.accepts(&update(Some(art("v1")), Some(art("v2")))));
        assert!(!p.accepts(&update(Some(art("v1")), Some(art("v1")))));
        assert!(!p.accepts(&update(Some(art("v1")), None)));
        assert!(!p.accepts(&WatchEvent::Update { old: None,
                                                 new: Some(repo(Some(art("v1")))) }));
        assert!(p.accepts(&WatchEvent::Create { object: repo(None) }));
        assert!(p.accepts(&WatchEvent::Delete { object: repo(None) }));
    }

    #[test]
    fn generation_and_reconcile_requested() {
        let mut old = GitRepository::new("app", "a");
        let mut new = old.clone();
        let ev = |o: &GitRepository, n: &GitRepository| WatchEvent::Update { old: Some(Arc::new(o.clone())),
                                                                             new: Some(Arc::new(n.clone())) };
        assert!(!default_for_predicate().accepts(&ev(&old, &new)));

        new.metadata.generation += 1;
        assert!(GenerationChangedPredicate.accepts(&ev(&old, &new)));
        assert!(default_for_predicate().accepts(&ev(&old, &new)));

        old = new.clone();
        new.metadata.annotations.insert(RECONCILE_REQUESTED_ANNOTATION.into(), "2024-01-01T00:00:00Z".into());
        assert!(!GenerationChangedPredicate.accepts(&ev(&old, &new)));
        assert!(ReconcileRequestedPredicate.accepts(&ev(&old, &new)));
        assert!(default_for_predicate().accepts(&ev(&old, &new)));

        old = new.clone();
        assert!(!ReconcileRequestedPredicate.accepts(&ev(&old, &new)));
    }
}

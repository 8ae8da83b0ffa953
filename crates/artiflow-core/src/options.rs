//! Opciones de `setup` y `get_source`.
//!
//! Los campos sin valor significan "usar el default"; `apply` superpone un
//! conjunto de opciones sobre otro (los campos definidos ganan) y `evaluate`
//! rellena los defaults.
use std::fmt;
use std::sync::Arc;

use crate::matchers::SharedMatcher;
use crate::object::{ActionResource, ArtifactSource, Resource};
use crate::predicate::default_for_predicate;
use crate::request::{default_request_mapper, trigger_always, Request, RequestMapper, TriggerPredicate};
use crate::store::EventPredicate;

#[derive(Clone, Default)]
pub struct Options {
    /// Kinds de Source aceptados. `None`: sin restricción al resolver y todos
    /// los builtin al configurar watches.
    pub allowed_source_kinds: Option<SharedMatcher>,
    pub no_cross_namespace_refs: Option<bool>,
    pub trigger_predicate: Option<TriggerPredicate>,
    pub request_mapper: Option<RequestMapper>,
    /// Predicados del watch sobre la propia Action.
    pub for_predicates: Option<Vec<Arc<dyn EventPredicate>>>,
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
         .field("allowed_source_kinds", &self.allowed_source_kinds)
         .field("no_cross_namespace_refs", &self.no_cross_namespace_refs)
         .field("trigger_predicate", &self.trigger_predicate.is_some())
         .field("request_mapper", &self.request_mapper.is_some())
         .field("for_predicates", &self.for_predicates)
         .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_source_kinds(mut self, matcher: SharedMatcher) -> Self {
        self.allowed_source_kinds = Some(matcher);
        self
    }

    pub fn with_no_cross_namespace_refs(mut self, forbidden: bool) -> Self {
        self.no_cross_namespace_refs = Some(forbidden);
        self
    }

    pub fn with_trigger_predicate<F>(mut self, f: F) -> Self
        where F: Fn(&dyn ActionResource, &dyn ArtifactSource) -> bool + Send + Sync + 'static
    {
        self.trigger_predicate = Some(Arc::new(f));
        self
    }

    pub fn with_request_mapper<F>(mut self, f: F) -> Self
        where F: Fn(&[Arc<dyn Resource>]) -> Vec<Request> + Send + Sync + 'static
    {
        self.request_mapper = Some(Arc::new(f));
        self
    }

    /// Añade predicados al watch de la Action. Una lista vacía desactiva el
    /// filtro por defecto.
    pub fn with_for_predicates(mut self, predicates: Vec<Arc<dyn EventPredicate>>) -> Self {
        if predicates.is_empty() {
            self.for_predicates = Some(predicates);
        } else {
            self.for_predicates.get_or_insert_with(Vec::new).extend(predicates);
        }
        self
    }

    pub fn cross_namespace_refs_forbidden(&self) -> bool {
        self.no_cross_namespace_refs.unwrap_or(false)
    }

    /// Superpone `self` sobre `target`: los campos definidos aquí ganan.
    pub fn apply(&self, target: &mut Options) {
        if let Some(m) = &self.allowed_source_kinds {
            target.allowed_source_kinds = Some(m.clone());
        }
        if let Some(b) = self.no_cross_namespace_refs {
            target.no_cross_namespace_refs = Some(b);
        }
        if let Some(p) = &self.trigger_predicate {
            target.trigger_predicate = Some(p.clone());
        }
        if let Some(m) = &self.request_mapper {
            target.request_mapper = Some(m.clone());
        }
        if let Some(p) = &self.for_predicates {
            target.for_predicates = Some(p.clone());
        }
    }

    /// Combina una lista de opciones en orden (la última gana).
    pub fn merge<'a>(list: impl IntoIterator<Item = &'a Options>) -> Options {
        let mut out = Options::default();
        for o in list {
            o.apply(&mut out);
        }
        out
    }

    /// Opciones con todos los defaults resueltos.
    pub fn evaluate(&self) -> EvaluatedOptions {
        EvaluatedOptions { allowed_source_kinds: self.allowed_source_kinds.clone(),
                           no_cross_namespace_refs: self.cross_namespace_refs_forbidden(),
                           trigger_predicate: self.trigger_predicate
                                                  .clone()
                                                  .unwrap_or_else(|| Arc::new(trigger_always)),
                           request_mapper: self.request_mapper
                                               .clone()
                                               .unwrap_or_else(|| Arc::new(default_request_mapper)),
                           for_predicates: self.for_predicates
                                               .clone()
                                               .unwrap_or_else(|| vec![default_for_predicate()]) }
    }
}

/// Resultado de `Options::evaluate`.
#[derive(Clone)]
pub struct EvaluatedOptions {
    pub allowed_source_kinds: Option<SharedMatcher>,
    pub no_cross_namespace_refs: bool,
    pub trigger_predicate: TriggerPredicate,
    pub request_mapper: RequestMapper,
    pub for_predicates: Vec<Arc<dyn EventPredicate>>,
}

impl fmt::Debug for EvaluatedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatedOptions")
         .field("allowed_source_kinds", &self.allowed_source_kinds)
         .field("no_cross_namespace_refs", &self.no_cross_namespace_refs)
         .field("for_predicates", &self.for_predicates)
         .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::{KindRegistry, SourceMatcher};
    use crate::reference::GroupKind;

    #[test]
    fn apply_overlays_only_set_fields() {
        let base = Options::new().with_no_cross_namespace_refs(true)
                                 .with_allowed_source_kinds(Arc::new(KindRegistry::general_sources()));
        let overlay = Options::new().with_no_cross_namespace_refs(false);
        let merged = Options::merge([&base, &overlay]);
        assert!(!merged.cross_namespace_refs_forbidden());
        assert!(merged.allowed_source_kinds.is_some());
    }

    #[test]
    fn evaluate_fills_defaults() {
        let eval = Options::new().evaluate();
        assert!(!eval.no_cross_namespace_refs);
        assert!(eval.allowed_source_kinds.is_none());
        assert_eq!(eval.for_predicates.len(), 1);
        assert!((eval.request_mapper)(&[]).is_empty());
    }

    #[test]
    fn empty_for_predicates_disable_default_filter() {
        let eval = Options::new().with_for_predicates(vec![]).evaluate();
        assert!(eval.for_predicates.is_empty());
    }

    #[test]
    fn allowed_kinds_matcher_is_kept() {
        let eval = Options::new().with_allowed_source_kinds(Arc::new(KindRegistry::helm_index_sources()))
                                 .evaluate();
        let m = eval.allowed_source_kinds.expect("matcher set");
        assert!(m.matches(&GroupKind::new(crate::constants::SOURCE_GROUP, "HelmRepository")));
        assert!(!m.matches(&GroupKind::new(crate::constants::SOURCE_GROUP, "GitRepository")));
    }
}

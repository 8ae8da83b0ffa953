//! Registro de kinds de Source y álgebra de matchers.
//!
//! `KindRegistry` asocia (group, kind) -> prototipo vacío. Sirve para dos
//! cosas: saber en O(1) si una referencia apunta a un kind builtin, y crear
//! instancias frescas (copia profunda del prototipo) sin un objeto vivo.
//! Los registros se construyen una vez al arrancar y se pasan por
//! referencia; no hay mapas globales.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kinds::{ArtifactResource, Bucket, GitRepository, HelmChart, HelmRepository, OciRepository};
use crate::object::Resource;
use crate::reference::GroupKind;

/// Predicado sobre kinds.
pub trait SourceMatcher: Send + Sync + fmt::Debug {
    fn matches(&self, gk: &GroupKind) -> bool;
}

pub type SharedMatcher = Arc<dyn SourceMatcher>;

/// Registro (group, kind) -> prototipo.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    prototypes: HashMap<GroupKind, Arc<dyn Resource>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un prototipo bajo su propio group/kind.
    pub fn register<R: Resource + Default>(mut self) -> Self {
        let proto = R::default();
        self.prototypes.insert(proto.group_kind(), Arc::new(proto));
        self
    }

    /// Registra un prototipo ya construido (kinds con group/kind dinámico).
    pub fn register_prototype(mut self, proto: Arc<dyn Resource>) -> Self {
        self.prototypes.insert(proto.group_kind(), proto);
        self
    }

    /// Todos los sources builtin, incluido el proxy `Artifact`.
    pub fn builtin_sources() -> Self {
        Self::general_sources().register::<HelmRepository>()
                               .register::<HelmChart>()
                               .register::<ArtifactResource>()
    }

    /// Sources de contenido general (git, bucket, oci).
    pub fn general_sources() -> Self {
        Self::new().register::<GitRepository>()
                   .register::<Bucket>()
                   .register::<OciRepository>()
    }

    /// Sources que publican un índice de Helm.
    pub fn helm_index_sources() -> Self {
        Self::new().register::<HelmRepository>()
    }

    /// Instancia fresca del prototipo, o `None` si el kind no está registrado.
    pub fn create(&self, gk: &GroupKind) -> Option<Box<dyn Resource>> {
        self.prototypes.get(gk).map(|p| p.clone_resource())
    }

    /// Kinds registrados, en orden estable.
    pub fn kinds(&self) -> Vec<GroupKind> {
        let mut kinds: Vec<GroupKind> = self.prototypes.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

impl SourceMatcher for KindRegistry {
    fn matches(&self, gk: &GroupKind) -> bool {
        self.prototypes.contains_key(gk)
    }
}

/// Matcher a partir de una función.
pub struct MatchFn<F>(pub F);

impl<F> fmt::Debug for MatchFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MatchFn")
    }
}

impl<F> SourceMatcher for MatchFn<F> where F: Fn(&GroupKind) -> bool + Send + Sync
{
    fn matches(&self, gk: &GroupKind) -> bool {
        (self.0)(gk)
    }
}

#[derive(Debug)]
struct AllOf(Vec<SharedMatcher>);

impl SourceMatcher for AllOf {
    fn matches(&self, gk: &GroupKind) -> bool {
        self.0.iter().all(|m| m.matches(gk))
    }
}

#[derive(Debug)]
struct AnyOf(Vec<SharedMatcher>);

impl SourceMatcher for AnyOf {
    fn matches(&self, gk: &GroupKind) -> bool {
        self.0.iter().any(|m| m.matches(gk))
    }
}

#[derive(Debug)]
struct Negated(SharedMatcher);

impl SourceMatcher for Negated {
    fn matches(&self, gk: &GroupKind) -> bool {
        !self.0.matches(gk)
    }
}

#[derive(Debug)]
struct Everything;

impl SourceMatcher for Everything {
    fn matches(&self, _gk: &GroupKind) -> bool {
        true
    }
}

/// Todos los matchers aceptan (vacío = true).
pub fn and(matchers: Vec<SharedMatcher>) -> SharedMatcher {
    Arc::new(AllOf(matchers))
}

/// Alguno acepta (vacío = false).
pub fn or(matchers: Vec<SharedMatcher>) -> SharedMatcher {
    Arc::new(AnyOf(matchers))
}

pub fn not(matcher: SharedMatcher) -> SharedMatcher {
    Arc::new(Negated(matcher))
}

/// Sin restricción.
pub fn all() -> SharedMatcher {
    Arc::new(Everything)
}

/// Kinds que no son builtin: deben pasar por la indirección `Artifact`.
pub fn dynamic_sources(builtin: &KindRegistry) -> SharedMatcher {
    not(Arc::new(builtin.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ARTIFACT_GROUP, SOURCE_GROUP};

    fn gk(kind: &str) -> GroupKind {
        GroupKind::new(SOURCE_GROUP, kind)
    }

    #[test]
    fn builtin_registry_contains_all_kinds() {
        let reg = KindRegistry::builtin_sources();
        assert_eq!(reg.len(), 6);
        for kind in ["GitRepository", "Bucket", "OCIRepository", "HelmRepository", "HelmChart"] {
            assert!(reg.matches(&gk(kind)), "{kind} should be builtin");
        }
        assert!(reg.matches(&GroupKind::new(ARTIFACT_GROUP, "Artifact")));
        assert!(!reg.matches(&GroupKind::new("ocm.software", "ComponentVersion")));
        assert!(!reg.matches(&GroupKind::new("other.group", "GitRepository")));
    }

    #[test]
    fn create_returns_fresh_prototype_copies() {
        let reg = KindRegistry::builtin_sources();
        let obj = reg.create(&gk("GitRepository")).expect("registered kind");
        assert_eq!(obj.group_kind(), gk("GitRepository"));
        assert!(obj.as_source().is_some());
        assert!(obj.meta().name.is_empty());
        assert!(reg.create(&GroupKind::new("x", "Y")).is_none());
    }

    #[test]
    fn algebra_composes_without_materializing() {
        let general: SharedMatcher = Arc::new(KindRegistry::general_sources());
        let helm: SharedMatcher = Arc::new(KindRegistry::helm_index_sources());
        let either = or(vec![general.clone(), helm.clone()]);
        assert!(either.matches(&gk("Bucket")));
        assert!(either.matches(&gk("HelmRepository")));
        assert!(!either.matches(&gk("HelmChart")));

        let both = and(vec![general.clone(), helm]);
        assert!(!both.matches(&gk("Bucket")));

        assert!(!not(general.clone()).matches(&gk("GitRepository")));
        assert!(all().matches(&GroupKind::new("any", "Thing")));
        assert!(and(vec![]).matches(&gk("Bucket")));
        assert!(!or(vec![]).matches(&gk("Bucket")));

        let only_git = MatchFn(|gk: &GroupKind| gk.kind == "GitRepository");
        assert!(only_git.matches(&gk("GitRepository")));
        assert!(!only_git.matches(&gk("Bucket")));
    }

    #[test]
    fn dynamic_sources_are_the_complement_of_builtin() {
        let builtin = KindRegistry::builtin_sources();
        let dynamic = dynamic_sources(&builtin);
        assert!(dynamic.matches(&GroupKind::new("ocm.software", "ComponentVersion")));
        assert!(!dynamic.matches(&gk("GitRepository")));
    }
}

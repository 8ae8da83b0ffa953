//! Registro de índices y construcción de watches para un kind de Action.
//!
//! `setup` no arranca nada: registra las funciones de índice en el substrate
//! y devuelve un `ControllerBuilder` con los watches listos. El caller lo
//! completa con su registrador y su cola (`complete`).
use std::sync::Arc;

use log::{debug, info};

use crate::constants::{ARTIFACT_OWNER_INDEX, SOURCE_REF_INDEX};
use crate::context::Context;
use crate::errors::{SetupError, StoreError};
use crate::index::{owner_reference_index, source_ref_index};
use crate::kinds::ArtifactResource;
use crate::matchers::{KindRegistry, SourceMatcher};
use crate::object::{ActionResource, Resource};
use crate::options::Options;
use crate::pipeline::RevisionChangeMapper;
use crate::predicate::{AllEvents, AnyPredicate, SourceRevisionChangePredicate};
use crate::reference::GroupKind;
use crate::request::Request;
use crate::store::{EventPredicate, MapFn, ObjectStore, RequestSink, Watch, WatchRegistrar};

/// Watches preparados para un kind de Action, pendientes de registrar.
#[derive(Debug, Clone)]
pub struct ControllerBuilder {
    action_kind: GroupKind,
    watches: Vec<Watch>,
}

impl ControllerBuilder {
    pub fn action_kind(&self) -> &GroupKind {
        &self.action_kind
    }

    /// Watches en orden de registro: el de la propia Action primero y luego
    /// uno por kind de Source.
    pub fn watches(&self) -> &[Watch] {
        &self.watches
    }

    /// Kinds de Source vigilados.
    pub fn source_kinds(&self) -> Vec<GroupKind> {
        self.watches
            .iter()
            .skip(1)
            .map(|w| w.kind.clone())
            .collect()
    }

    /// Registra todos los watches; los work items llegan a `sink`.
    pub fn complete(self, registrar: &dyn WatchRegistrar, sink: Arc<dyn RequestSink>) -> Result<(), SetupError> {
        let count = self.watches.len();
        for watch in self.watches {
            debug!("setup:watch kind={}", watch.kind);
            registrar.watch(watch, Arc::clone(&sink)).map_err(SetupError::Watch)?;
        }
        info!("controller for {} registered {count} watches", self.action_kind);
        Ok(())
    }
}

fn for_watch(action_kind: GroupKind, predicates: Vec<Arc<dyn EventPredicate>>) -> Watch {
    let predicate: Arc<dyn EventPredicate> = if predicates.is_empty() {
        Arc::new(AllEvents)
    } else {
        Arc::new(AnyPredicate(predicates))
    };
    let map: MapFn = Arc::new(|_ctx: &Context, obj: &dyn Resource| vec![Request::for_object(obj)]);
    Watch { kind: action_kind,
            predicate,
            map }
}

/// Registra índices y prepara watches para `action_kind`.
///
/// `registry` es el conjunto de kinds builtin; con
/// `options.allowed_source_kinds` sin definir se vigilan todos.
pub fn setup(store: Arc<dyn ObjectStore>,
             registry: &KindRegistry,
             action_kind: GroupKind,
             options: &Options)
             -> Result<ControllerBuilder, SetupError> {
    debug!("setup:start action={action_kind}");
    store.register_index(&action_kind, SOURCE_REF_INDEX, source_ref_index())
         .map_err(SetupError::Index)?;

    let artifact_kind = ArtifactResource::kind();
    match store.register_index(&artifact_kind, ARTIFACT_OWNER_INDEX, owner_reference_index(artifact_kind.clone())) {
        Ok(()) => {}
        // Índice compartido entre kinds de Action.
        Err(StoreError::IndexConflict { .. }) => {
            debug!("setup:owner index already registered for {artifact_kind}");
        }
        Err(e) => return Err(SetupError::Index(e)),
    }

    let opts = options.evaluate();
    let mut watches = vec![for_watch(action_kind.clone(), opts.for_predicates)];
    for kind in registry.kinds() {
        if let Some(allowed) = &opts.allowed_source_kinds {
            if !allowed.matches(&kind) {
                continue;
            }
        }
        let mapper = if kind == artifact_kind {
            RevisionChangeMapper::indirect(Arc::clone(&store),
                                           action_kind.clone(),
                                           artifact_kind.clone(),
                                           opts.trigger_predicate.clone(),
                                           opts.request_mapper.clone())
        } else {
            RevisionChangeMapper::direct(Arc::clone(&store),
                                         action_kind.clone(),
                                         opts.trigger_predicate.clone(),
                                         opts.request_mapper.clone())
        };
        watches.push(Watch { kind,
                             predicate: Arc::new(SourceRevisionChangePredicate),
                             map: mapper.into_map_fn() });
    }

    debug!("setup:done action={action_kind} watches={}", watches.len());
    Ok(ControllerBuilder { action_kind, watches })
}

/// Igual que `setup`, tomando el kind de un tipo de Action concreto.
pub fn setup_for<A>(store: Arc<dyn ObjectStore>,
                    registry: &KindRegistry,
                    options: &Options)
                    -> Result<ControllerBuilder, SetupError>
    where A: ActionResource + Default
{
    setup(store, registry, A::default().group_kind(), options)
}

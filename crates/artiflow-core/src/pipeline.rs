//! Pipeline de propagación: objeto cambiado -> work items deduplicados.
//!
//! Pasos:
//! 1. el objeto debe exponer un Artifact (si no, nada que hacer);
//! 2. lookup en el índice inverso por la clave propia del objeto;
//! 3. si el objeto es un proxy `Artifact`, un lookup adicional por cada owner
//!    reference (Action -> Artifact -> Source real);
//! 4. dedup por identidad (kind + namespace + name) conservando el orden;
//! 5. `TriggerPredicate(action, source)` sobre cada candidato;
//! 6. `RequestMapper` sobre los supervivientes.
//!
//! Ningún error escapa de aquí: un lookup fallido se registra y cuenta como
//! vacío para ese lookup solamente.
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::constants::SOURCE_REF_INDEX;
use crate::context::Context;
use crate::index::lookup;
use crate::object::Resource;
use crate::reference::{GroupKind, Reference};
use crate::request::{Request, RequestMapper, TriggerPredicate};
use crate::store::{MapFn, ObjectStore};

/// Mapper de cambios de revisión para un kind de Action.
#[derive(Clone)]
pub struct RevisionChangeMapper {
    store: Arc<dyn ObjectStore>,
    action_kind: GroupKind,
    /// Si es `Some`, los objetos de este kind son proxies y se recorren sus
    /// owner references.
    artifact_kind: Option<GroupKind>,
    trigger: TriggerPredicate,
    mapper: RequestMapper,
}

impl RevisionChangeMapper {
    /// Mapper para sources que referencian las Actions directamente.
    pub fn direct(store: Arc<dyn ObjectStore>,
                  action_kind: GroupKind,
                  trigger: TriggerPredicate,
                  mapper: RequestMapper)
                  -> Self {
        Self { store,
               action_kind,
               artifact_kind: None,
               trigger,
               mapper }
    }

    /// Mapper para el kind proxy `Artifact`: además del lookup directo,
    /// recorre las owner references.
    pub fn indirect(store: Arc<dyn ObjectStore>,
                    action_kind: GroupKind,
                    artifact_kind: GroupKind,
                    trigger: TriggerPredicate,
                    mapper: RequestMapper)
                    -> Self {
        Self { store,
               action_kind,
               artifact_kind: Some(artifact_kind),
               trigger,
               mapper }
    }

    pub fn action_kind(&self) -> &GroupKind {
        &self.action_kind
    }

    fn lookup_key(&self, ctx: &Context, key: &str) -> Vec<Arc<dyn Resource>> {
        lookup(self.store.as_ref(), ctx, &self.action_kind, SOURCE_REF_INDEX, key)
    }

    /// Actions afectadas (pasos 1-5), en orden de índice.
    pub fn affected(&self, ctx: &Context, obj: &dyn Resource) -> Vec<Arc<dyn Resource>> {
        let Some(source) = obj.as_source() else {
            warn!("expected an object exposing an artifact, got {}; skipping revision change",
                  obj.group_kind());
            return Vec::new();
        };
        if source.artifact().is_none() {
            return Vec::new();
        }

        let own = Reference::from_object(obj);
        let mut candidates = self.lookup_key(ctx, &own.key());

        if self.artifact_kind.as_ref() == Some(&own.group_kind()) {
            for owner in &obj.meta().owner_references {
                let owner_ref = Reference::from_owner(owner, &own.namespace);
                candidates.extend(self.lookup_key(ctx, &owner_ref.key()));
            }
        }

        let mut unique: IndexMap<String, Arc<dyn Resource>> = IndexMap::with_capacity(candidates.len());
        for c in candidates {
            unique.entry(Reference::from_object(c.as_ref()).key()).or_insert(c);
        }

        let affected: Vec<Arc<dyn Resource>> =
            unique.into_values()
                  .filter(|c| match c.as_action() {
                      Some(action) => (self.trigger)(action, source),
                      None => {
                          warn!("indexed object {} is not an action; dropping", Reference::from_object(c.as_ref()));
                          false
                      }
                  })
                  .collect();
        debug!("revision change of {own}: {} affected {}", affected.len(), self.action_kind);
        affected
    }

    /// Pipeline completo: work items para el objeto cambiado.
    pub fn map(&self, ctx: &Context, obj: &dyn Resource) -> Vec<Request> {
        let affected = self.affected(ctx, obj);
        if affected.is_empty() {
            return Vec::new();
        }
        (self.mapper)(&affected)
    }

    /// Adaptador a la firma de mapeo del substrate.
    pub fn into_map_fn(self) -> MapFn {
        Arc::new(move |ctx: &Context, obj: &dyn Resource| self.map(ctx, obj))
    }
}

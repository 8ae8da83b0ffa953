//! Contrato del substrate de almacenamiento/watch.
//!
//! El motor no guarda estado propio: consume una vista eventualmente
//! consistente a través de estos traits. Los índices secundarios los mantiene
//! el substrate a partir de las funciones que el motor registra en `setup`.
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::errors::{IndexError, StoreError};
use crate::object::Resource;
use crate::reference::{GroupKind, ObjectKey};
use crate::request::Request;

/// Función de índice: claves bajo las que se indexa un objeto.
pub type IndexFn = Arc<dyn Fn(&dyn Resource) -> Result<Vec<String>, IndexError> + Send + Sync>;

/// Acceso de lectura + registro de índices.
pub trait ObjectStore: Send + Sync {
    /// Objeto por clave; `StoreError::NotFound` si no existe.
    fn get(&self, ctx: &Context, kind: &GroupKind, key: &ObjectKey) -> Result<Arc<dyn Resource>, StoreError>;

    /// Objetos de `kind` cuyo índice `index` contiene `key`.
    fn list(&self, ctx: &Context, kind: &GroupKind, index: &str, key: &str) -> Result<Vec<Arc<dyn Resource>>, StoreError>;

    /// Registra un índice una única vez por (kind, index).
    fn register_index(&self, kind: &GroupKind, index: &str, index_fn: IndexFn) -> Result<(), StoreError>;
}

/// Evento de cambio entregado por el substrate.
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Create { object: Arc<dyn Resource> },
    Update {
        old: Option<Arc<dyn Resource>>,
        new: Option<Arc<dyn Resource>>,
    },
    Delete { object: Arc<dyn Resource> },
    Generic { object: Arc<dyn Resource> },
}

impl WatchEvent {
    /// Objeto sobre el que se ejecuta el mapeo (el nuevo, en updates).
    pub fn object(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Self::Create { object } | Self::Delete { object } | Self::Generic { object } => Some(object),
            Self::Update { new, .. } => new.as_ref(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Generic { .. } => "generic",
        }
    }
}

/// Decide qué eventos llegan a la función de mapeo.
pub trait EventPredicate: Send + Sync + fmt::Debug {
    fn accepts(&self, event: &WatchEvent) -> bool;
}

/// Función de mapeo: objeto cambiado -> work items.
pub type MapFn = Arc<dyn Fn(&Context, &dyn Resource) -> Vec<Request> + Send + Sync>;

/// Destino de los work items (la cola del caller).
pub trait RequestSink: Send + Sync {
    fn enqueue(&self, requests: Vec<Request>);
}

/// Watch sobre un kind.
#[derive(Clone)]
pub struct Watch {
    pub kind: GroupKind,
    pub predicate: Arc<dyn EventPredicate>,
    pub map: MapFn,
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
         .field("kind", &self.kind)
         .field("predicate", &self.predicate)
         .finish_non_exhaustive()
    }
}

/// Registro de watches.
pub trait WatchRegistrar: Send + Sync {
    fn watch(&self, watch: Watch, sink: Arc<dyn RequestSink>) -> Result<(), StoreError>;
}

//! Work items emitidos por el pipeline y las funciones por defecto de mapeo
//! y disparo.
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::object::{ActionResource, ArtifactSource, Resource};

/// Pedido de reconciliación para un objeto (namespace + name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Request {
    pub namespace: String,
    pub name: String,
}

impl Request {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(),
               name: name.into() }
    }

    pub fn for_object(obj: &dyn Resource) -> Self {
        Self::new(obj.meta().namespace.clone(), obj.meta().name.clone())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Convierte los objetos afectados en work items.
pub type RequestMapper = Arc<dyn Fn(&[Arc<dyn Resource>]) -> Vec<Request> + Send + Sync>;

/// Filtro de negocio `(action, source) -> bool` aplicado a cada candidato.
pub type TriggerPredicate = Arc<dyn Fn(&dyn ActionResource, &dyn ArtifactSource) -> bool + Send + Sync>;

/// Un work item por objeto, sin orden ni dedup adicional.
pub fn default_request_mapper(objects: &[Arc<dyn Resource>]) -> Vec<Request> {
    objects.iter().map(|o| Request::for_object(o.as_ref())).collect()
}

pub fn trigger_always(_action: &dyn ActionResource, _source: &dyn ArtifactSource) -> bool {
    true
}

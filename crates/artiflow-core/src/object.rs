//! Modelo de objetos almacenados en el substrate y sus capacidades.
//!
//! Todo objeto implementa `Resource` (object-safe). Las dos capacidades que
//! el motor necesita se exponen como traits aparte:
//! - `ArtifactSource`: el objeto produce (o no, todavía) un `Artifact`.
//! - `ActionResource`: el objeto declara una referencia a un Source.
//!
//! El despacho es dinámico (`as_source` / `as_action`) para que el motor
//! pueda trabajar con kinds registrados en tiempo de ejecución.
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::InvalidReference;
use crate::model::Artifact;
use crate::reference::{GroupKind, SourceRef};

/// Owner reference: arista de propiedad hacia otro recurso del mismo
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
}

impl OwnerReference {
    /// Owner reference apuntando al objeto `owner`.
    pub fn to(owner: &dyn Resource, version: &str) -> Self {
        let gk = owner.group_kind();
        let api_version = if gk.group.is_empty() {
            version.to_string()
        } else {
            format!("{}/{}", gk.group, version)
        };
        Self { api_version,
               kind: gk.kind,
               name: owner.meta().name.clone(),
               uid: owner.meta().uid }
    }
}

/// Metadata común.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Asignado por el substrate al crear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,
    #[serde(default)]
    pub generation: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { name: name.into(),
               namespace: namespace.into(),
               generation: 1,
               ..Default::default() }
    }

    pub fn with_owner(mut self, owner: OwnerReference) -> Self {
        self.owner_references.push(owner);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

/// Objeto almacenable en el substrate.
pub trait Resource: Debug + Send + Sync + 'static {
    /// Tipo del objeto.
    fn group_kind(&self) -> GroupKind;

    fn meta(&self) -> &ObjectMeta;

    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// Copia profunda (los prototipos del registro se instancian así).
    fn clone_resource(&self) -> Box<dyn Resource>;

    fn as_any(&self) -> &dyn Any;

    /// Capacidad Source, si el kind la tiene.
    fn as_source(&self) -> Option<&dyn ArtifactSource> {
        None
    }

    /// Capacidad Action, si el kind la tiene.
    fn as_action(&self) -> Option<&dyn ActionResource> {
        None
    }
}

impl dyn Resource {
    pub fn downcast_ref<T: Resource>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Capacidad "produce un Artifact".
pub trait ArtifactSource: Resource {
    /// `None` mientras el Source no haya producido contenido.
    fn artifact(&self) -> Option<&Artifact>;
}

/// Capacidad "declara una referencia a un Source".
pub trait ActionResource: Resource {
    /// Referencia declarada; falla si está ausente o incompleta.
    fn source_ref(&self) -> Result<SourceRef, InvalidReference>;
}

/// Valida una referencia opcional tal como la guardan los specs.
pub fn require_source_ref(source_ref: Option<&SourceRef>) -> Result<SourceRef, InvalidReference> {
    let r = source_ref.ok_or_else(|| InvalidReference("no source ref specified".into()))?;
    if r.kind.is_empty() {
        return Err(InvalidReference(format!("source ref '{}' has no kind", r.name)));
    }
    if r.name.is_empty() {
        return Err(InvalidReference(format!("source ref of kind '{}' has no name", r.kind)));
    }
    Ok(r.clone())
}

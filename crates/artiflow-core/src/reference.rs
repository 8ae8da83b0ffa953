//! Codec de referencias: coordenadas `(group, kind, namespace, name)` y su
//! clave canónica.
//!
//! La clave canónica es la moneda común de todos los índices secundarios:
//! `<group>/<kind>/<namespace>/<name>`, omitiendo el segmento de namespace
//! cuando está vacío (recursos de ámbito cluster). Dos referencias son iguales
//! si y sólo si sus claves canónicas son iguales.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::SOURCE_GROUP;
use crate::object::{OwnerReference, Resource};

/// Par (group, kind) que identifica un tipo de recurso.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GroupKind {
    pub group: String,
    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { group: group.into(),
               kind: kind.into() }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// Par (namespace, name) usado para `get` contra el substrate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(),
               name: name.into() }
    }

    /// Clave del objeto vivo.
    pub fn of(obj: &dyn Resource) -> Self {
        let meta = obj.meta();
        Self::new(meta.namespace.clone(), meta.name.clone())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// Construye la clave canónica de una coordenada.
pub fn key(group: &str, kind: &str, namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        format!("{group}/{kind}/{name}")
    } else {
        format!("{group}/{kind}/{namespace}/{name}")
    }
}

/// Extrae el grupo de un `apiVersion` (`group/version`). Un `apiVersion` sin
/// barra pertenece al grupo core (vacío).
pub fn extract_group_name(api_version: &str) -> &str {
    match api_version.split_once('/') {
        Some((group, _)) => group,
        None => "",
    }
}

/// Coordenada completa de un recurso.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reference {
    pub group: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
}

impl Reference {
    pub fn new(group: impl Into<String>,
               kind: impl Into<String>,
               namespace: impl Into<String>,
               name: impl Into<String>)
               -> Self {
        Self { group: group.into(),
               kind: kind.into(),
               namespace: namespace.into(),
               name: name.into() }
    }

    /// Coordenada viva de un objeto (group/kind del tipo + namespace/name de
    /// su metadata).
    pub fn from_object(obj: &dyn Resource) -> Self {
        let gk = obj.group_kind();
        let meta = obj.meta();
        Self { group: gk.group,
               kind: gk.kind,
               namespace: meta.namespace.clone(),
               name: meta.name.clone() }
    }

    /// Coordenada del dueño declarado en una owner reference. Las owner
    /// references no cruzan namespaces: el dueño vive en `namespace`.
    pub fn from_owner(owner: &OwnerReference, namespace: &str) -> Self {
        Self::new(extract_group_name(&owner.api_version),
                  owner.kind.clone(),
                  namespace,
                  owner.name.clone())
    }

    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group.clone(), self.kind.clone())
    }

    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace.clone(), self.name.clone())
    }

    /// Devuelve una copia con `default_namespace` si el namespace está vacío;
    /// en otro caso la referencia queda igual.
    pub fn normalize(&self, default_namespace: &str) -> Self {
        if self.namespace.is_empty() {
            Self { namespace: default_namespace.to_string(),
                   ..self.clone() }
        } else {
            self.clone()
        }
    }

    /// Clave canónica.
    pub fn key(&self) -> String {
        key(&self.group, &self.kind, &self.namespace, &self.name)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Reference {}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Referencia tal como aparece serializada en el spec de una Action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    /// `group/version` del referido; vacío = grupo de sources builtin.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    pub kind: String,
    pub name: String,
    /// Vacío = namespace del objeto que contiene la referencia.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

impl SourceRef {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self { api_version: api_version.into(),
               kind: kind.into(),
               name: name.into(),
               namespace: String::new() }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn group_kind(&self) -> GroupKind {
        if self.api_version.is_empty() {
            return GroupKind::new(SOURCE_GROUP, self.kind.clone());
        }
        GroupKind::new(extract_group_name(&self.api_version), self.kind.clone())
    }

    /// Coordenada sin normalizar.
    pub fn to_reference(&self) -> Reference {
        let gk = self.group_kind();
        Reference { group: gk.group,
                    kind: gk.kind,
                    namespace: self.namespace.clone(),
                    name: self.name.clone() }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_reference().key())
    }
}

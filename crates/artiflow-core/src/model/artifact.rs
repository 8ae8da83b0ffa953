//! Artifact: snapshot de contenido descargable producido por un Source.
//!
//! Un `Artifact` es un valor:
//! - `url`: dirección desde donde se obtiene el contenido.
//! - `revision`: identificador opaco de versión, propio del sistema de origen
//!   (SHA de git, tag, versión de chart, ...).
//! - `digest`: opcional, `<algorithm>:<checksum>`; informativo, no participa
//!   en la igualdad de revisión.
//! - `metadata`: anotaciones del origen (p.ej. anotaciones OCI).
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub url: String,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub last_update_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Artifact {
    /// Artifact mínimo con `last_update_time = now`.
    pub fn new(url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self { url: url.into(),
               revision: revision.into(),
               digest: None,
               last_update_time: Utc::now(),
               size: None,
               metadata: BTreeMap::new() }
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Misma revisión: sólo compara `revision`.
    pub fn has_revision(&self, revision: &str) -> bool {
        self.revision == revision
    }
}

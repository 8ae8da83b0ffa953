//! artiflow-store: substrate de almacenamiento/watch en memoria para
//! artiflow-core.
//!
//! - `InMemoryObjectStore`: objetos, índices secundarios y watches.
//! - `WorkQueue`: cola de work items que coalesce duplicados.
//! - `fixtures`: helpers para publicar Artifacts en tests y demos.
//! - `config`: parámetros del substrate desde el entorno.
pub mod config;
pub mod fixtures;
pub mod memory;
pub mod queue;

pub use config::StoreConfig;
pub use fixtures::{apply_artifact, apply_generic_source, ArtifactServer, FixtureError};
pub use memory::InMemoryObjectStore;
pub use queue::WorkQueue;

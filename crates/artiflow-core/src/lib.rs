//! artiflow-core: motor de propagación de cambios de Artifact.
//!
//! Cuando un Source (repositorio git, bucket, chart, ...) publica una nueva
//! revisión de su Artifact, el motor encuentra las Actions que lo referencian
//! (directamente o a través de un proxy `Artifact`) y emite work items para
//! reconciliarlas. De forma independiente, `get_source` resuelve el Source
//! declarado por una Action.
//!
//! El motor no posee hilos ni estado: consume un substrate de
//! almacenamiento/watch a través de los traits de `store`.
mod macros;

pub mod constants;
pub mod context;
pub mod errors;
pub mod index;
pub mod kinds;
pub mod matchers;
pub mod model;
pub mod object;
pub mod options;
pub mod pipeline;
pub mod predicate;
pub mod reference;
pub mod request;
pub mod resolver;
pub mod setup;
pub mod store;

pub use context::Context;
pub use errors::{classify_error, ErrorClass, IndexError, InvalidReference, ResolveError, SetupError, StoreError};
pub use kinds::{ArtifactResource, Bucket, GenericSource, GitRepository, HelmChart, HelmRepository, OciRepository};
pub use matchers::{KindRegistry, SharedMatcher, SourceMatcher};
pub use model::{Artifact, Digest};
pub use object::{ActionResource, ArtifactSource, ObjectMeta, OwnerReference, Resource};
pub use options::Options;
pub use pipeline::RevisionChangeMapper;
pub use reference::{GroupKind, ObjectKey, Reference, SourceRef};
pub use request::{Request, RequestMapper, TriggerPredicate};
pub use resolver::{get_source, ResolvedSource};
pub use setup::{setup, setup_for, ControllerBuilder};
pub use store::{EventPredicate, ObjectStore, RequestSink, Watch, WatchEvent, WatchRegistrar};

//! Errores del core.
//!
//! Cada frontera tiene su enum: `StoreError` (substrate), `IndexError`
//! (funciones de índice), `ResolveError` (resolución de sources) y
//! `SetupError` (registro de índices/watches). `classify_error` permite al
//! caller decidir reencolar vs abandonar sin comparar strings.

use thiserror::Error;

use crate::reference::{GroupKind, ObjectKey};

/// Referencia declarada ausente o mal formada.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid source reference: {0}")]
pub struct InvalidReference(pub String);

/// Errores del substrate de almacenamiento/watch.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StoreError {
    #[error("{kind} '{key}' not found")]
    NotFound { kind: GroupKind, key: ObjectKey },
    #[error("{kind} '{key}' already exists")]
    AlreadyExists { kind: GroupKind, key: ObjectKey },
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("index '{index}' already registered for {kind}")]
    IndexConflict { kind: GroupKind, index: String },
    #[error("index '{index}' not registered for {kind}")]
    UnknownIndex { kind: GroupKind, index: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Cancelación o deadline: nunca debe confundirse con "cero resultados".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Errores devueltos por funciones de índice en lugar de abortar.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum IndexError {
    #[error("expected an action resource, got {0}")]
    NotAnAction(GroupKind),
    #[error("expected a {expected} resource, got {actual}")]
    UnexpectedKind { expected: GroupKind, actual: GroupKind },
}

/// Errores de `get_source`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidReference(#[from] InvalidReference),
    #[error("can't access '{kind}/{namespace}', cross-namespace references have been blocked")]
    AccessDenied { kind: String, namespace: String },
    #[error("source objects of kind {0} are not allowed")]
    KindNotAllowed(GroupKind),
    #[error("no source found for {0}")]
    SourceNotFound(String),
    #[error("multiple artifacts found for {key}: {candidates:?}")]
    AmbiguousSource { key: String, candidates: Vec<String> },
    #[error("unable to get source '{key}': {source}")]
    Resolution {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Clasificación de errores para políticas de reintento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Dato de entrada inválido; reintentar no sirve hasta que cambie.
    Validation,
    /// Violación de política o de invariante; terminal.
    Permanent,
    /// Puede resolverse solo (source que aún no existe, fallo del substrate).
    Transient,
}

impl ResolveError {
    pub fn classify(&self) -> ErrorClass {
        classify_error(self)
    }

    pub fn is_retryable(&self) -> bool {
        self.classify() == ErrorClass::Transient
    }
}

pub fn classify_error(err: &ResolveError) -> ErrorClass {
    match err {
        ResolveError::InvalidReference(_) => ErrorClass::Validation,
        ResolveError::AccessDenied { .. } | ResolveError::KindNotAllowed(_) | ResolveError::AmbiguousSource { .. } => {
            ErrorClass::Permanent
        }
        ResolveError::SourceNotFound(_) | ResolveError::Resolution { .. } => ErrorClass::Transient,
    }
}

/// Errores de `setup`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SetupError {
    #[error("failed setting index fields: {0}")]
    Index(#[source] StoreError),
    #[error("failed registering watch: {0}")]
    Watch(#[source] StoreError),
}

use artiflow_core::{ErrorClass, ResolveError, SetupError, StoreError};
use artiflow_store::FixtureError;
use thiserror::Error;

/// Errores de la aplicación (demo y arranque).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
    #[error(transparent)]
    Setup(#[from] SetupError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("Serialización fallida: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Reintentable sólo si la causa es transitoria.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Resolve(e) => e.classify() == ErrorClass::Transient,
            AppError::Store(e) => e.is_cancellation() || matches!(e, StoreError::Unavailable(_)),
            _ => false,
        }
    }
}

//! Configuración del substrate en memoria desde variables de entorno.
//! Convención `ARTIFLOW_*`; el archivo `.env` se carga una sola vez.

use std::env;

use artiflow_core::Context;
use chrono::Duration;
use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;

/// Timeout por defecto de cada despacho de watch.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;
/// Tope aceptado para el timeout (24h).
pub const MAX_LOOKUP_TIMEOUT_MS: u64 = 86_400_000;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Deadline de cada despacho de watch; `None` = sin deadline.
    pub lookup_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { lookup_timeout: Some(Duration::milliseconds(DEFAULT_LOOKUP_TIMEOUT_MS as i64)) }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_timeout_var(env::var("ARTIFLOW_LOOKUP_TIMEOUT_MS").ok().as_deref())
    }

    /// `0` desactiva el deadline; un valor no numérico cae al default.
    pub fn from_timeout_var(raw: Option<&str>) -> Self {
        let ms = match raw.map(str::trim) {
            None | Some("") => DEFAULT_LOOKUP_TIMEOUT_MS,
            Some(v) => v.parse().unwrap_or_else(|_| {
                         warn!("invalid ARTIFLOW_LOOKUP_TIMEOUT_MS '{v}', using {DEFAULT_LOOKUP_TIMEOUT_MS}");
                         DEFAULT_LOOKUP_TIMEOUT_MS
                     }),
        };
        let lookup_timeout = (ms > 0).then(|| Duration::milliseconds(ms.min(MAX_LOOKUP_TIMEOUT_MS) as i64));
        Self { lookup_timeout }
    }

    /// Contexto nuevo para un despacho.
    pub fn dispatch_context(&self) -> Context {
        match self.lookup_timeout {
            Some(t) => Context::background().with_timeout(t),
            None => Context::background(),
        }
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

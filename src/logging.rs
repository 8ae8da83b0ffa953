//! Inicialización de logs.
//!
//! El código emite con el facade `log`; el backend es `tracing-subscriber`
//! (capa `fmt` compacta a stderr + `EnvFilter`). `try_init` instala además el
//! puente `log -> tracing` (`tracing-log`), por eso los `debug!`/`warn!` de
//! `artiflow-core` y `artiflow-store` pasan por el mismo filtro.
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Directivas usadas cuando `ARTIFLOW_LOG` no está definido o es inválido.
pub const DEFAULT_FILTER: &str = "info";

/// `EnvFilter` a partir de directivas (`info`, `artiflow_core=debug,warn`, ...).
pub fn filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Instala el subscriber global. Falla si ya había uno instalado.
pub fn init(directives: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry().with(filter(directives))
                                  .with(tracing_subscriber::fmt::layer().compact()
                                                                        .with_writer(std::io::stderr))
                                  .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_are_kept() {
        assert!(filter("artiflow_core=debug,warn").to_string()
                                                  .contains("artiflow_core=debug"));
    }

    #[test]
    fn invalid_directives_fall_back_to_default() {
        assert_eq!(filter("artiflow_core=loud").to_string(),
                   EnvFilter::new(DEFAULT_FILTER).to_string());
    }

    #[test]
    fn subscriber_is_installed_once() {
        assert!(init("debug").is_ok());
        log::debug!("logging:init test=subscriber_is_installed_once");
        assert!(init("debug").is_err());
    }
}

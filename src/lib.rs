//! Artiflow Rust Library
//!
//! Capa de aplicación sobre `artiflow-core` y `artiflow-store`:
//! - `config`: configuración desde el entorno (`ARTIFLOW_*`) y conversión a
//!   `Options` del motor.
//! - `errors`: errores de la aplicación.
//! - `logging`: logger a stderr para el facade `log`.
//! - `demo`: escenario end-to-end usado por el binario `artiflow-demo`.

pub mod config;
pub mod demo;
pub mod errors;
pub mod logging;

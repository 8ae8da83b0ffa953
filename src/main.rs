use std::process::ExitCode;

use artiflow_rust::config::CONFIG;
use artiflow_rust::demo::run_scenario;
use artiflow_rust::errors::AppError;
use artiflow_rust::logging;
use log::{error, info, warn};

fn run() -> Result<(), AppError> {
    logging::init(&CONFIG.log_filter)?;
    for w in &CONFIG.warnings {
        warn!("{w}");
    }
    info!("starting artiflow demo (no_cross_namespace_refs={}, lookup_timeout={:?})",
          CONFIG.no_cross_namespace_refs,
          CONFIG.store.lookup_timeout);

    let report = run_scenario(&CONFIG)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("demo failed: {e}");
            eprintln!("artiflow-demo: {e}");
            ExitCode::FAILURE
        }
    }
}

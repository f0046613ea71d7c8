//! CLI command implementations

pub mod config;
pub mod exchange;
pub mod remove;
pub mod transactions;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_core::{CadenceContext, DomainError, ErrorResponse};

use crate::output;

/// Get the cadence directory from environment or default
pub fn get_cadence_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CADENCE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".cadence"))
        .context("Could not find home directory (set CADENCE_DIR)")
}

/// Build the cadence context from settings and environment
pub fn get_context() -> Result<CadenceContext> {
    let cadence_dir = get_cadence_dir()?;
    CadenceContext::new(&cadence_dir).context("Failed to initialize cadence context")
}

/// Report a provider failure and exit
///
/// With `--json` the error envelope goes to stdout so scripts can read the code.
pub fn fail(err: DomainError, json: bool) -> ! {
    if json {
        match serde_json::to_string_pretty(&ErrorResponse::from(err.clone())) {
            Ok(body) => println!("{}", body),
            Err(_) => output::error(&err.error_message),
        }
    } else {
        output::domain_error(&err);
    }
    std::process::exit(1);
}

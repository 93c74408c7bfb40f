//! Logging utilities for the key vault

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber writing to stdout.
///
/// `RUST_LOG` takes precedence; otherwise the vault crates log at `log_level`
/// (default INFO).
pub fn init_logging(log_level: Option<Level>) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.unwrap_or(Level::INFO);
        EnvFilter::new(format!(
            "keyvault_core={},keyvault_stores={}",
            level, level
        ))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set global default subscriber: {}", e))?;

    info!("Logging initialized to stdout");
    Ok(())
}

//! Tracing subscriber setup.

use crate::config::{LogFormat, LoggingConfig};
use crate::errors::{ExecutionError, ExecutionResult};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Builds the filter for `config`. `RUST_LOG` takes precedence over the
/// configured level.
pub fn env_filter(config: &LoggingConfig) -> ExecutionResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| ExecutionError::config(format!("invalid log level '{}': {e}", config.level)))
}

/// Installs the global tracing subscriber.
///
/// Returns `Ok(false)` if this crate already installed one or another global
/// subscriber is set; that is not an error.
pub fn init_tracing(config: &LoggingConfig) -> ExecutionResult<bool> {
    if LOGGER_INITIALIZED.get().is_some() {
        return Ok(false);
    }

    let filter = env_filter(config)?;
    let (json, pretty) = match config.format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_target(true).with_current_span(true)),
            None,
        ),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(true).with_thread_ids(true))),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .try_init()
        .is_ok();

    if installed {
        let _ = LOGGER_INITIALIZED.set(());
        tracing::debug!(level = %config.level, format = %config.format, "Tracing initialized");
    } else {
        tracing::debug!("Global tracing subscriber already initialized, keeping existing subscriber");
    }
    Ok(installed)
}

use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output format for the stdout log layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default directive (e.g. "info" or "warn,dev_memory_store=debug").
    /// Overridden by RUST_LOG env var.
    pub log_level: String,
    pub format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter {directive:?}: {detail}")]
    InvalidFilter { directive: String, detail: String },

    #[error("global subscriber already installed")]
    AlreadyInitialized,
}

/// Build the filter directive string from config.
pub fn filter_directive(config: &TelemetryConfig) -> String {
    let filter_str = config.log_level.trim().to_lowercase();
    if filter_str.is_empty() {
        return "info".to_owned();
    }
    filter_str
}

/// Initialize the global subscriber. Call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let directive = filter_directive(config);
    let (env_filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => {
            let filter =
                EnvFilter::try_new(&directive).map_err(|e| TelemetryError::InvalidFilter {
                    directive: directive.clone(),
                    detail: e.to_string(),
                })?;
            (filter, false)
        }
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_span_list(true)
            .with_filter(env_filter)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInitialized)?;
    tracing::debug!(%directive, from_env, format = ?config.format, "telemetry initialized");
    Ok(())
}

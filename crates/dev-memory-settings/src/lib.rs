//! Layered configuration for the dev-memory service.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. JSON config file (`--config <path>` or `DEV_MEMORY_CONFIG`)
//! 3. Legacy variables `DATABASE_URL` and `DEV_MEMORY_PORT`
//! 4. `DEV_MEMORY_*` variables, `__` separating sections
//!    (`DEV_MEMORY_DATABASE__POOL_SIZE` -> `database.pool_size`)

mod error;

pub use dev_memory_telemetry::LogFormat;
pub use error::SettingsError;

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Environment variable naming the JSON config file.
pub const CONFIG_FILE_ENV: &str = "DEV_MEMORY_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub migrations: MigrationSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// How long in-flight requests may drain after a shutdown signal.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3100,
            shutdown_timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite location: a path, `sqlite://<path>`, `sqlite:<path>` or `:memory:`.
    pub url: Option<String>,
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 10,
            busy_timeout_ms: 5_000,
            connection_timeout_secs: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Directory of `0*.sql` scripts. Unset means the embedded scripts.
    pub dir: Option<PathBuf>,
    pub run_on_startup: bool,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            dir: None,
            run_on_startup: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive. `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Text,
        }
    }
}

impl Settings {
    /// Load settings from every source.
    ///
    /// An explicit `config_file` must exist. Without one, the path named by
    /// `DEV_MEMORY_CONFIG` is used if set.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let from_env = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        let path = config_file.map(Path::to_path_buf).or(from_env);

        if let Some(path) = &path {
            if !path.exists() {
                return Err(SettingsError::MissingFile(path.clone()));
            }
        }

        let settings: Self = Self::figment(path.as_deref()).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Build the figment provider chain.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        figment
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "database.url".into()),
            )
            .merge(
                Env::raw()
                    .only(&["DEV_MEMORY_PORT"])
                    .map(|_| "server.port".into()),
            )
            .merge(Env::prefixed("DEV_MEMORY_").split("__"))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue {
                field: "database.pool_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.server.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "server.host",
                reason: "must not be empty".into(),
            });
        }
        if let Some(url) = &self.database.url {
            if url.trim().is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: "database.url",
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 3100);
        assert_eq!(settings.database.url, None);
        assert_eq!(settings.database.pool_size, 10);
        assert!(settings.migrations.run_on_startup);
        assert_eq!(settings.migrations.dir, None);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, LogFormat::Text);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let mut settings = Settings::default();
        settings.server.host = "127.0.0.1".into();
        settings.server.port = 8080;
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn zero_pool_size_rejected() {
        let mut settings = Settings::default();
        settings.database.pool_size = 0;
        assert_matches!(
            settings.validate(),
            Err(SettingsError::InvalidValue { field: "database.pool_size", .. })
        );
    }

    #[test]
    fn blank_database_url_rejected() {
        let mut settings = Settings::default();
        settings.database.url = Some("  ".into());
        assert_matches!(
            settings.validate(),
            Err(SettingsError::InvalidValue { field: "database.url", .. })
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/definitely/not/here/dev-memory.json")));
        assert_matches!(result, Err(SettingsError::MissingFile(_)));
    }
}

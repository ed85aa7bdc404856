//! # Store Configuration
//!
//! Loads the store settings and resolves the connection descriptor.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CART_DATABASE_URL=sqlite:///var/lib/carts/carts.db                 │
//! │     CART_DATA_DIR=/var/lib/carts                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/cart-store/cart-store.toml (Linux)                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no database → in-memory store                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Descriptor Resolution
//! ```text
//! database.url set?  ──yes──►  use it verbatim
//!        │ no
//!        ▼
//! database.data_dir set? ──yes──►  sqlite://{data_dir}/{instance}-{name}.db?mode=rwc
//!        │ no                      instance defaults to "onlineboutique"
//!        ▼                         name defaults to "carts"
//!   no descriptor
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! data_dir = "/var/lib/carts"
//! instance = "onlineboutique"
//! name = "carts"
//! create_schema = true
//!
//! [database.pool]
//! max_connections = 5
//!
//! [retry]
//! max_attempts = 20
//! initial_backoff_ms = 20
//! max_backoff_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::descriptor::ConnectionDescriptor;
use crate::pool::PoolSettings;
use crate::transaction::RetryPolicy;

/// Instance name used when only a data directory is configured.
pub const DEFAULT_INSTANCE: &str = "onlineboutique";

/// Database name used when only a data directory is configured.
pub const DEFAULT_DATABASE: &str = "carts";

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

/// Where the cart table lives and how to reach it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Full connection string. Wins over every other field.
    #[serde(default)]
    pub url: Option<String>,

    /// Directory holding the SQLite file.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Instance part of the file name. Default: [`DEFAULT_INSTANCE`]
    #[serde(default)]
    pub instance: Option<String>,

    /// Database part of the file name. Default: [`DEFAULT_DATABASE`]
    #[serde(default)]
    pub name: Option<String>,

    /// Create the cart table on startup if missing.
    #[serde(default)]
    pub create_schema: bool,

    /// Pool tuning.
    #[serde(default)]
    pub pool: PoolSettings,
}

impl DatabaseSettings {
    /// Resolves the connection descriptor, or `None` when no database is
    /// configured at all.
    pub fn resolve_descriptor(&self) -> Option<ConnectionDescriptor> {
        if let Some(url) = non_empty(self.url.as_deref()) {
            return Some(ConnectionDescriptor::new(url));
        }

        let data_dir = self.data_dir.as_deref()?;
        let instance = non_empty(self.instance.as_deref()).unwrap_or(DEFAULT_INSTANCE);
        let name = non_empty(self.name.as_deref()).unwrap_or(DEFAULT_DATABASE);

        Some(ConnectionDescriptor::sqlite_file(
            data_dir.join(format!("{instance}-{name}.db")),
        ))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Root Configuration
// =============================================================================

/// Complete cart store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database location and pool settings.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Retry policy for AddItem transactions.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart-store.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart store config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `CART_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("CART_DATABASE_URL") {
            debug!("Overriding database URL from environment");
            self.database.url = Some(url);
        }

        if let Some(dir) = get("CART_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.database.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(instance) = get("CART_DB_INSTANCE") {
            self.database.instance = Some(instance);
        }

        if let Some(name) = get("CART_DB_NAME") {
            self.database.name = Some(name);
        }

        if let Some(value) = get("CART_CREATE_SCHEMA") {
            self.database.create_schema = parse_value("CART_CREATE_SCHEMA", &value)?;
        }

        if let Some(value) = get("CART_DB_MAX_CONNECTIONS") {
            self.database.pool.max_connections = parse_value("CART_DB_MAX_CONNECTIONS", &value)?;
        }

        if let Some(value) = get("CART_RETRY_MAX_ATTEMPTS") {
            self.retry.max_attempts = parse_value("CART_RETRY_MAX_ATTEMPTS", &value)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.pool.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.pool.max_connections must be greater than 0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be greater than 0".into(),
            ));
        }

        if self.retry.multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "retry.multiplier must be at least 1.0".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retry.randomization_factor) {
            return Err(ConfigError::Invalid(
                "retry.randomization_factor must be between 0.0 and 1.0".into(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "retry.initial_backoff_ms must not exceed retry.max_backoff_ms".into(),
            ));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cartstore", "cart-store")
            .map(|dirs| dirs.config_dir().join("cart-store.toml"))
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_has_no_descriptor() {
        let config = StoreConfig::default();
        assert!(config.database.resolve_descriptor().is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.max_attempts, 20);
    }

    #[test]
    fn test_data_dir_uses_default_names() {
        let settings = DatabaseSettings {
            data_dir: Some(PathBuf::from("/var/lib/carts")),
            ..Default::default()
        };

        let descriptor = settings.resolve_descriptor().unwrap();
        assert_eq!(
            descriptor.as_str(),
            "sqlite:///var/lib/carts/onlineboutique-carts.db?mode=rwc"
        );
    }

    #[test]
    fn test_explicit_names_replace_defaults() {
        let settings = DatabaseSettings {
            data_dir: Some(PathBuf::from("/data")),
            instance: Some("shop".into()),
            name: Some("baskets".into()),
            ..Default::default()
        };

        assert_eq!(
            settings.resolve_descriptor().unwrap().as_str(),
            "sqlite:///data/shop-baskets.db?mode=rwc"
        );
    }

    #[test]
    fn test_url_takes_precedence() {
        let settings = DatabaseSettings {
            url: Some("sqlite:///elsewhere/carts.db".into()),
            data_dir: Some(PathBuf::from("/data")),
            instance: Some("shop".into()),
            ..Default::default()
        };

        assert_eq!(
            settings.resolve_descriptor().unwrap().as_str(),
            "sqlite:///elsewhere/carts.db"
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: StoreConfig = toml::from_str(
            r#"
            [database]
            data_dir = "/from/file"
            create_schema = false

            [retry]
            max_attempts = 3
            "#,
        )
        .unwrap();

        config
            .apply_overrides(lookup(&[
                ("CART_DATA_DIR", "/from/env"),
                ("CART_CREATE_SCHEMA", "true"),
                ("CART_RETRY_MAX_ATTEMPTS", "9"),
                ("CART_DB_INSTANCE", "   "),
            ]))
            .unwrap();

        assert_eq!(config.database.data_dir, Some(PathBuf::from("/from/env")));
        assert!(config.database.create_schema);
        assert_eq!(config.retry.max_attempts, 9);
        // Blank override ignored, default instance name applies.
        assert_eq!(
            config.database.resolve_descriptor().unwrap().as_str(),
            "sqlite:///from/env/onlineboutique-carts.db?mode=rwc"
        );
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let mut config = StoreConfig::default();
        let err = config
            .apply_overrides(lookup(&[("CART_DB_MAX_CONNECTIONS", "many")]))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "CART_DB_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = StoreConfig::default();
        assert!(config.validate().is_ok());

        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        config.retry.max_attempts = 5;
        config.retry.randomization_factor = 1.5;
        assert!(config.validate().is_err());

        config.retry.randomization_factor = 0.2;
        config.database.pool.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            [database.pool]
            max_connections = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.database.pool.max_connections, 2);
        assert_eq!(config.database.pool.busy_timeout_ms, 5_000);
        assert_eq!(config.retry.initial_backoff_ms, 20);
    }
}

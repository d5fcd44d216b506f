//! Process configuration resolved once at startup.
//!
//! # Responsibility
//! - Resolve store location, listen port, pool size and logging options.
//! - Report missing or malformed values as `ConfigError` to the caller.
//!
//! # Invariants
//! - The store URL is required; there is no default database.
//! - Resolution never exits the process.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable names.
pub mod env_vars {
    pub const STORE_URL: &str = "TAGWIKI_STORE_URL";
    pub const PORT: &str = "PORT";
    pub const POOL_SIZE: &str = "TAGWIKI_POOL_SIZE";
    pub const LOG_LEVEL: &str = "TAGWIKI_LOG_LEVEL";
    pub const LOG_DIR: &str = "TAGWIKI_LOG_DIR";
}

/// Default values.
pub mod defaults {
    pub const PORT: u16 = 4747;
    pub const POOL_SIZE: u32 = 8;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidPort(String),
    InvalidPoolSize(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "missing required environment variable `{name}`"),
            Self::InvalidPort(value) => write!(f, "invalid port `{value}`"),
            Self::InvalidPoolSize(value) => {
                write!(f, "invalid pool size `{value}`; expected an integer >= 1")
            }
        }
    }
}

impl Error for ConfigError {}

/// Connection settings for the page store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// SQLite database path.
    pub url: PathBuf,
    /// Upper bound on pooled connections.
    pub pool_size: u32,
}

impl StoreConfig {
    pub fn new(url: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            pool_size: defaults::POOL_SIZE,
        }
    }
}

/// Full process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiConfig {
    pub store: StoreConfig,
    pub port: u16,
    pub log_level: String,
    /// Absolute directory for rotating log files; stderr when `None`.
    pub log_dir: Option<PathBuf>,
}

impl WikiConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let url = read(env_vars::STORE_URL).ok_or(ConfigError::MissingVar(env_vars::STORE_URL))?;

        let port = match read(env_vars::PORT) {
            Some(value) => value
                .parse::<u16>()
                .ok()
                .filter(|port| *port > 0)
                .ok_or(ConfigError::InvalidPort(value))?,
            None => defaults::PORT,
        };

        let pool_size = match read(env_vars::POOL_SIZE) {
            Some(value) => value
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .ok_or(ConfigError::InvalidPoolSize(value))?,
            None => defaults::POOL_SIZE,
        };

        Ok(Self {
            store: StoreConfig {
                url: PathBuf::from(url),
                pool_size,
            },
            port,
            log_level: read(env_vars::LOG_LEVEL)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(env_vars::LOG_DIR).map(PathBuf::from),
        })
    }

    /// Socket address the HTTP front end binds to.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::{defaults, env_vars, ConfigError, WikiConfig};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(vars: &[(&str, &str)]) -> Result<WikiConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        WikiConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn missing_store_url_is_a_config_error() {
        assert_eq!(
            resolve(&[(env_vars::PORT, "8080")]).unwrap_err(),
            ConfigError::MissingVar(env_vars::STORE_URL)
        );
        assert_eq!(
            resolve(&[(env_vars::STORE_URL, "   ")]).unwrap_err(),
            ConfigError::MissingVar(env_vars::STORE_URL)
        );
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_unset() {
        let config = resolve(&[(env_vars::STORE_URL, "/tmp/wiki.db")]).unwrap();
        assert_eq!(config.store.url, PathBuf::from("/tmp/wiki.db"));
        assert_eq!(config.store.pool_size, defaults::POOL_SIZE);
        assert_eq!(config.port, defaults::PORT);
        assert_eq!(config.listen_addr(), "0.0.0.0:4747");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = resolve(&[
            (env_vars::STORE_URL, "wiki.db"),
            (env_vars::PORT, "9000"),
            (env_vars::POOL_SIZE, "2"),
            (env_vars::LOG_LEVEL, "warn"),
            (env_vars::LOG_DIR, "/var/log/tagwiki"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.store.pool_size, 2);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/tagwiki")));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert_eq!(
            resolve(&[(env_vars::STORE_URL, "wiki.db"), (env_vars::PORT, "http")]).unwrap_err(),
            ConfigError::InvalidPort("http".to_string())
        );
        assert_eq!(
            resolve(&[(env_vars::STORE_URL, "wiki.db"), (env_vars::PORT, "0")]).unwrap_err(),
            ConfigError::InvalidPort("0".to_string())
        );
        assert_eq!(
            resolve(&[(env_vars::STORE_URL, "wiki.db"), (env_vars::POOL_SIZE, "0")]).unwrap_err(),
            ConfigError::InvalidPoolSize("0".to_string())
        );
    }
}

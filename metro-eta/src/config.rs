//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Directory holding the four timetable files.
pub const DATA_DIR_VAR: &str = "METRO_ETA_DATA_DIR";

/// Address the HTTP server binds to.
pub const BIND_VAR: &str = "METRO_ETA_BIND";

const DEFAULT_DATA_DIR: &str = "Data";
const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Error from reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("METRO_ETA_BIND={value} is not a socket address: {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`; unset or blank values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = value(DATA_DIR_VAR).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let bind = value(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind.clone(),
                source,
            })?;

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            bind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("Data"));
        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/srv/gtfs"),
            (BIND_VAR, "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/gtfs"));
        assert_eq!(config.bind.port(), 8080);
    }

    #[test]
    fn blank_values_use_defaults() {
        let config =
            ServerConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "  "), (BIND_VAR, "")])).unwrap();
        assert_eq!(config, ServerConfig::from_lookup(lookup(&[])).unwrap());
    }

    #[test]
    fn invalid_bind() {
        let err = ServerConfig::from_lookup(lookup(&[(BIND_VAR, "localhost")])).unwrap_err();
        assert!(err.to_string().contains("METRO_ETA_BIND=localhost"));
    }
}

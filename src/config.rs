//! Runtime configuration
//!
//! Read once at startup from environment variables:
//!
//! | Variable       | Default              |
//! |----------------|----------------------|
//! | `ARTIFACT_DIR` | `models`             |
//! | `SCALER_FILE`  | `scaler.json`        |
//! | `MODEL_FILE`   | `xgboost_model.json` |
//! | `INPUT_MODE`   | `manual`             |
//! | `HOST`         | `0.0.0.0`            |
//! | `PORT`         | `5000`               |

use anyhow::{Context, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::features::InputMode;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub artifact_dir: PathBuf,
    pub scaler_file: String,
    pub model_file: String,
    pub input_mode: InputMode,
    pub host: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("models"),
            scaler_file: "scaler.json".to_string(),
            model_file: "xgboost_model.json".to_string(),
            input_mode: InputMode::Manual,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let input_mode = match lookup("INPUT_MODE") {
            Some(raw) => raw.parse::<InputMode>().context("Invalid INPUT_MODE")?,
            None => defaults.input_mode,
        };

        let host = match lookup("HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .with_context(|| format!("Invalid HOST '{}'", raw))?,
            None => defaults.host,
        };

        // Unparsable ports fall back to the default
        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        Ok(Self {
            artifact_dir: lookup("ARTIFACT_DIR").map(PathBuf::from).unwrap_or(defaults.artifact_dir),
            scaler_file: lookup("SCALER_FILE").unwrap_or(defaults.scaler_file),
            model_file: lookup("MODEL_FILE").unwrap_or(defaults.model_file),
            input_mode,
            host,
            port,
        })
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.scaler_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifact_dir.join(&self.model_file)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.scaler_path(), PathBuf::from("models/scaler.json"));
        assert_eq!(config.model_path(), PathBuf::from("models/xgboost_model.json"));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ARTIFACT_DIR", "/opt/crop/models"),
            ("MODEL_FILE", "linear.json"),
            ("INPUT_MODE", "assisted"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.input_mode, InputMode::Assisted);
        assert_eq!(config.model_path(), PathBuf::from("/opt/crop/models/linear.json"));
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_bad_port_falls_back() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_bad_mode_and_host_rejected() {
        assert!(ServerConfig::from_lookup(lookup_from(&[("INPUT_MODE", "wizard")])).is_err());
        assert!(ServerConfig::from_lookup(lookup_from(&[("HOST", "localhost:80")])).is_err());
    }
}

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Runtime configuration, loadable from TOML. Missing keys take defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// File holding the persisted block sequence.
    pub chain_path: PathBuf,
    /// Allow cross-origin requests from any origin.
    pub cors_permissive: bool,
    /// Keep a snapshot that fails validation on startup instead of
    /// overwriting it.
    pub quarantine_corrupt: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            chain_path: PathBuf::from("car_blockchain.json"),
            cors_permissive: true,
            quarantine_corrupt: true,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.chain_path, PathBuf::from("car_blockchain.json"));
        assert!(c.cors_permissive);
        assert!(c.quarantine_corrupt);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            chain_path = "/var/lib/carchain/chain.json"
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.chain_path, PathBuf::from("/var/lib/carchain/chain.json"));
        assert!(c.cors_permissive);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ServerConfig::from_toml_str("bind_addr = 12").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carchain.toml");
        std::fs::write(&path, "cors_permissive = false\n").unwrap();
        let c = ServerConfig::from_toml_file(&path).unwrap();
        assert!(!c.cors_permissive);
        assert!(ServerConfig::from_toml_file(&dir.path().join("missing.toml")).is_err());
    }
}

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub rpc_url: String,
    pub rpc_user: String,
    pub rpc_password: String,
    pub ipfs_url: String,
    pub request_timeout_secs: u64,
    /// When set, `/room/release` requires a matching `x-admin-token` header.
    pub admin_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            rpc_url: "http://127.0.0.1:8332".to_string(),
            rpc_user: String::new(),
            rpc_password: String::new(),
            ipfs_url: "http://localhost:5001".to_string(),
            request_timeout_secs: 20,
            admin_token: None,
        }
    }
}

impl ServerConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.is_empty() {
            return Err(ConfigError::invalid("RPC URL cannot be empty"));
        }

        if self.ipfs_url.is_empty() {
            return Err(ConfigError::invalid("IPFS URL cannot be empty"));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "Request timeout must be greater than 0",
            ));
        }

        if matches!(self.admin_token.as_deref(), Some("")) {
            return Err(ConfigError::invalid("Admin token cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.listen_addr.port(), 8080);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rpc_user": "hello", "rpc_password": "helloworld", "admin_token": "t0k"}}"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.rpc_user, "hello");
        assert_eq!(config.rpc_password, "helloworld");
        assert_eq!(config.admin_token.as_deref(), Some("t0k"));
        assert_eq!(config.rpc_url, "http://127.0.0.1:8332");
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServerConfig::default();
        config.ipfs_url.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = ServerConfig::default();
        config.admin_token = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ServerConfig::from_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}

//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use super::error::{ServerError, ServerResult};

/// Default cap on a single request read.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024;

/// Configuration for the key/value server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Path of the durable snapshot file.
    pub data_path: PathBuf,
    /// Size of the single read that receives a batch.
    pub max_request_bytes: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            data_path: PathBuf::from("data.json"),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }

    /// Sets the snapshot file path.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    /// Sets the request read size.
    pub fn with_max_request_bytes(mut self, size: usize) -> Self {
        self.max_request_bytes = size;
        self
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> ServerResult<()> {
        if self.max_request_bytes == 0 {
            return Err(ServerError::InvalidConfig(
                "max_request_bytes must be positive".into(),
            ));
        }
        if self.data_path.as_os_str().is_empty() {
            return Err(ServerError::InvalidConfig("data_path is empty".into()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_request_bytes, 1024);
        assert_eq!(config.data_path, PathBuf::from("data.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("0.0.0.0:9000".parse().unwrap())
            .with_data_path("/tmp/kv.json")
            .with_max_request_bytes(4096);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.max_request_bytes, 4096);
        assert_eq!(config.data_path, PathBuf::from("/tmp/kv.json"));
    }

    #[test]
    fn config_validation() {
        let config = ServerConfig::default().with_max_request_bytes(0);
        assert!(matches!(config.validate(), Err(ServerError::InvalidConfig(_))));

        let config = ServerConfig::default().with_data_path("");
        assert!(config.validate().is_err());
    }
}

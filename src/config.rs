//! Server configuration
//!
//! Loads settings from `config.toml` (optional) with PARLOR-prefixed
//! environment overrides, and validates them before the server starts.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::rooms::RoomId;

/// Runtime settings for the chat server.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// TCP port for client connections
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum concurrent registered clients
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Highest room number clients can occupy
    #[serde(default = "default_max_rooms")]
    pub max_rooms: RoomId,

    /// Display name cap in characters
    #[serde(default = "default_max_username_len")]
    pub max_username_len: usize,

    /// Chat line cap in characters
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7000
}

fn default_max_clients() -> usize {
    10
}

fn default_max_rooms() -> RoomId {
    5
}

fn default_max_username_len() -> usize {
    32
}

fn default_max_message_len() -> usize {
    512
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_clients: default_max_clients(),
            max_rooms: default_max_rooms(),
            max_username_len: default_max_username_len(),
            max_message_len: default_max_message_len(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// The file is optional; every field has a default, so a bare
    /// environment still yields a working configuration.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("PARLOR").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Bind address and port as a socket address string.
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("Port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_rooms == 0 {
            return Err(ConfigError::Message(
                "max_rooms must be greater than 0".into(),
            ));
        }

        if self.max_username_len == 0 {
            return Err(ConfigError::Message(
                "max_username_len must be greater than 0".into(),
            ));
        }

        if self.max_message_len == 0 {
            return Err(ConfigError::Message(
                "max_message_len must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_clients, 10);
        assert_eq!(config.max_rooms, 5);
        assert_eq!(config.max_username_len, 32);
        assert_eq!(config.max_message_len, 512);
    }

    #[test]
    fn test_validate_rejects_zero_bounds() {
        let mut config = ServerConfig::default();
        config.port = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.max_clients = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.max_rooms = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.max_message_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_listen_socket_formatting() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_socket(), "127.0.0.1:7000");
    }
}

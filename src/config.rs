//! Configuration types.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default HTTP/WebSocket port.
pub const DEFAULT_PORT: u16 = 8123;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP/WebSocket listener to.
    pub bind: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read `CONVERSATION_BIND` / `CONVERSATION_PORT`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(bind) = std::env::var("CONVERSATION_BIND") {
            config.bind = bind.parse().map_err(|e| ConfigError::InvalidValue {
                key: "CONVERSATION_BIND".to_string(),
                message: format!("{e}"),
            })?;
        }

        if let Ok(port) = std::env::var("CONVERSATION_PORT") {
            config.port = port.parse().map_err(|e| ConfigError::InvalidValue {
                key: "CONVERSATION_PORT".to_string(),
                message: format!("{e}"),
            })?;
        }

        config.cors_origins = std::env::var("CONVERSATION_CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Conversation configuration, handed opaquely to agent initialization.
///
/// The on-disk form is a JSON document:
///
/// ```json
/// {
///   "intents": { "HassTurnOn": ["turn on [the] {name}"] },
///   "responses": { "HassTurnOn": "Turned on {name}" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Sentence templates keyed by intent type.
    pub intents: BTreeMap<String, Vec<String>>,
    /// Speech templates keyed by intent type, answered by scripted handlers.
    pub responses: BTreeMap<String, String>,
}

impl ConversationConfig {
    /// Load from the file named by `CONVERSATION_INTENTS_FILE`, or an empty
    /// config when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("CONVERSATION_INTENTS_FILE") {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

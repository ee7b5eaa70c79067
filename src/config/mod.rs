//! Process configuration: an opaque key/value mapping supplied at startup
//! and echoed back verbatim by the `get configuration` command. The router
//! never interprets its contents.

use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors for configuration loading (I/O kept separate from parse failures)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Configuration root must be a JSON object")]
    NotAMapping,
}

/// Read-only mapping handed to the router at spawn time. There is no
/// mutation path after that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration(Map<String, Value>);

impl Configuration {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The mapping as a JSON value, suitable for use as a whole reply.
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Parse a configuration mapping from a JSON string.
    /// Pure function - no I/O.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        match serde_json::from_str(content)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ConfigError::NotAMapping),
        }
    }
}

/// Load the configuration mapping from disk.
/// This is the I/O boundary - it reads the file and delegates to pure parsing.
pub fn load_config_file(path: &Path) -> Result<Configuration, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Configuration::from_str(&content)
}

use crate::menu::MenuError;
use crate::order::OrderError;
use std::io;
use thiserror::Error;

/// Unified error type for the drive-thru application
#[derive(Error, Debug)]
pub enum DriveThruError {
    /// LLM API errors (OpenAI, OpenRouter, Anthropic)
    #[error("API error: {0}")]
    Api(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// Menu catalog errors
    #[error(transparent)]
    Menu(#[from] MenuError),

    /// Order state errors
    #[error(transparent)]
    Order(#[from] OrderError),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(String),

    /// Tool dispatch errors
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),
}

impl From<reqwest::Error> for DriveThruError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DriveThruError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            DriveThruError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            DriveThruError::Api(format!("API returned error status: {}", err))
        } else {
            DriveThruError::Network(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for DriveThruError {
    fn from(err: serde_json::Error) -> Self {
        DriveThruError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for DriveThruError {
    fn from(err: serde_yml::Error) -> Self {
        DriveThruError::Serialization(format!("YAML error: {}", err))
    }
}

//! Error types for aysa-core

use thiserror::Error;

/// Result type alias using aysa-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for AySA
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}. Run `aysa config init` to create one")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Unknown configuration key (`section.key`)
    #[error("Unknown configuration key: {key}")]
    UnknownKey { key: String },

    /// Unknown deployment stage
    #[error("Unknown stage: {stage}. Valid stages: development, quality")]
    InvalidStage { stage: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an unknown key error
    pub fn unknown_key(key: impl Into<String>) -> Self {
        Self::UnknownKey { key: key.into() }
    }

    /// Create an invalid stage error
    pub fn invalid_stage(stage: impl Into<String>) -> Self {
        Self::InvalidStage {
            stage: stage.into(),
        }
    }
}

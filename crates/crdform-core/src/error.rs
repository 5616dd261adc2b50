//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid import ID '{id}': expected {expected}")]
    InvalidImportId { id: String, expected: String },

    #[error("Attribute '{path}' must be {expected}")]
    TypeMismatch { path: String, expected: String },

    #[error("Invalid JSONPath '{expression}': {message}")]
    InvalidJsonPath { expression: String, message: String },

    #[error("Invalid provider configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;

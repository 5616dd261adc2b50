//! CLI error types with exit code handling
//!
//! Provider failures arrive as diagnostics; this module turns them into
//! miette reports and maps each class to an exit code.

use crdform_core::{CoreError, Diagnostics};
use crdform_provider::ProviderError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Configuration failed schema validation
    #[error("Validation failed with {errors} error(s)")]
    #[diagnostic(code(crdform::cli::validation))]
    Validation {
        errors: usize,
        #[help]
        help: Option<String>,
    },

    /// Provider or API failure, rendered from its diagnostic
    #[error("{summary}")]
    #[diagnostic(code(crdform::cli::provider))]
    Provider {
        summary: String,
        #[help]
        detail: Option<String>,
        exit_code: i32,
    },

    /// Provider configuration could not be loaded
    #[error("Configuration error: {message}")]
    #[diagnostic(code(crdform::cli::config))]
    Config { message: String },

    /// Invalid user input (bad file content, unknown type, ...)
    #[error("{message}")]
    #[diagnostic(code(crdform::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(crdform::cli::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Provider { exit_code, .. } => *exit_code,
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Input { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Error for a configuration that failed validation
    pub fn validation(diags: &Diagnostics) -> Self {
        Self::Validation {
            errors: diags.errors().count(),
            help: Some("Fix the attributes listed above and retry.".to_string()),
        }
    }
}

impl From<ProviderError> for CliError {
    fn from(err: ProviderError) -> Self {
        let exit_code = match &err {
            ProviderError::InvalidConfig(diags) => return CliError::validation(diags),
            ProviderError::NotFound { .. } => exit_codes::NOT_FOUND,
            ProviderError::Api { .. } => exit_codes::API_ERROR,
            ProviderError::Offline | ProviderError::Client(_) => exit_codes::CONFIG_ERROR,
            ProviderError::UnknownType(_) | ProviderError::RequiresReplace { .. } => {
                exit_codes::USAGE_ERROR
            }
            ProviderError::Core(CoreError::InvalidImportId { .. }) => exit_codes::USAGE_ERROR,
            _ => exit_codes::ERROR,
        };

        let diags = err.to_diagnostics();
        match diags.errors().next() {
            Some(diag) => CliError::Provider {
                summary: diag.summary.clone(),
                detail: (!diag.detail.is_empty()).then(|| diag.detail.clone()),
                exit_code,
            },
            None => CliError::Provider {
                summary: err.to_string(),
                detail: None,
                exit_code,
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => CliError::from(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

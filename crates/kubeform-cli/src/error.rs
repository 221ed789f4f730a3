//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use miette::Diagnostic;
use thiserror::Error;

use kubeform_core::CoreError;
use kubeform_engine::EngineError;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// The resource configuration was rejected
    #[error("Validation failed: {message}")]
    #[diagnostic(code(kubeform::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No kind is registered under the requested name
    #[error("{message}")]
    #[diagnostic(code(kubeform::cli::unknown_kind))]
    UnknownKind {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A kind catalog could not be loaded
    #[error("Catalog error: {message}")]
    #[diagnostic(code(kubeform::cli::catalog))]
    Catalog { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kubeform::cli::io))]
    Io { message: String },

    /// Internal error (bound model and schema disagree)
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(kubeform::cli::internal),
        help("this is a bug, please report it with the configuration used")
    )]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::UnknownKind { .. } => exit_codes::UNKNOWN_KIND,
            CliError::Catalog { .. } => exit_codes::ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::RENDER_ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error (user provided invalid input)
    pub fn input(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some("check the files passed with -f and the --set overrides".to_string()),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
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

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => e.into(),
            other => CliError::input(other.to_string()),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownKind { name, suggestion } => CliError::UnknownKind {
                message: format!("unknown resource kind '{}'", name),
                help: Some(suggestion.unwrap_or_else(|| {
                    "run `kubeform kinds` to list registered kinds".to_string()
                })),
            },
            EngineError::Binding(errors) => CliError::validation(errors.summary()),
            EngineError::InternalInconsistency { path, detail } => CliError::Internal {
                message: format!("inconsistent model at `{}`: {}", path, detail),
            },
            EngineError::Io(e) => e.into(),
            other => CliError::catalog(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

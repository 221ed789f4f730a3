//! Engine error types

use miette::Diagnostic;
use thiserror::Error;

use kubeform_core::{BindingErrors, CoreError};

/// Errors raised while loading kinds or processing a resource
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum EngineError {
    #[error("unknown resource kind '{name}'")]
    #[diagnostic(code(kubeform::engine::unknown_kind))]
    UnknownKind {
        name: String,
        #[help]
        suggestion: Option<String>,
    },

    #[error("resource kind '{name}' is already registered")]
    #[diagnostic(
        code(kubeform::engine::duplicate_kind),
        help("each catalog entry must use a distinct `resource` name")
    )]
    DuplicateKind { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Binding(#[from] BindingErrors),

    /// The bound model does not match its schema; a bug, never user error
    #[error("internal inconsistency at `{path}`: {detail}")]
    #[diagnostic(code(kubeform::engine::internal))]
    InternalInconsistency { path: String, detail: String },

    #[error("invalid kind catalog: {0}")]
    #[diagnostic(code(kubeform::engine::catalog))]
    Catalog(#[from] CoreError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn inconsistency(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InternalInconsistency {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Binding errors carried by this error, if any
    pub fn binding_errors(&self) -> Option<&BindingErrors> {
        match self {
            Self::Binding(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

//! Core error types

use miette::Diagnostic;
use thiserror::Error;

use crate::schema::AttributeKind;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid schema: {message}")]
    InvalidSchema { message: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// A raw value whose shape does not fit the declared attribute kind
///
/// Carries no path; the binder attaches one when turning it into a
/// [`BindingError::TypeMismatch`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}, found {actual}")]
pub struct ShapeMismatch {
    pub expected: AttributeKind,
    pub actual: String,
}

impl ShapeMismatch {
    pub fn new(expected: AttributeKind, actual: impl Into<String>) -> Self {
        Self {
            expected,
            actual: actual.into(),
        }
    }
}

/// A single problem found while binding configuration against a schema
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("missing required field `{path}`")]
    #[diagnostic(
        code(kubeform::binding::missing_field),
        help("set the field in the resource configuration")
    )]
    MissingRequiredField { path: String },

    #[error("type mismatch at `{path}`: expected {expected}, found {actual}")]
    #[diagnostic(code(kubeform::binding::type_mismatch))]
    TypeMismatch {
        path: String,
        expected: AttributeKind,
        actual: String,
    },

    #[error("invalid value at `{path}` ({validator}): {detail}")]
    #[diagnostic(code(kubeform::binding::validation))]
    ValidationFailed {
        path: String,
        validator: String,
        detail: String,
    },
}

impl BindingError {
    /// Path of the offending field, e.g. `spec.tags[2].key`
    pub fn path(&self) -> &str {
        match self {
            Self::MissingRequiredField { path }
            | Self::TypeMismatch { path, .. }
            | Self::ValidationFailed { path, .. } => path,
        }
    }

    /// Short code used in JSON output
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::ValidationFailed { .. } => "validation_failed",
        }
    }
}

/// Every binding problem from a single pass, reported together
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("invalid configuration: {}", summarize(.errors))]
#[diagnostic(code(kubeform::binding))]
pub struct BindingErrors {
    #[related]
    errors: Vec<BindingError>,
}

impl BindingErrors {
    pub fn new(errors: Vec<BindingError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[BindingError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<BindingError> {
        self.errors
    }

    /// Number of distinct field paths with at least one error
    pub fn fields_with_errors(&self) -> usize {
        distinct_paths(&self.errors)
    }

    /// Generate summary message: "3 errors in 2 fields"
    pub fn summary(&self) -> String {
        summarize(&self.errors)
    }
}

fn distinct_paths(errors: &[BindingError]) -> usize {
    let mut paths: Vec<&str> = errors.iter().map(BindingError::path).collect();
    paths.sort_unstable();
    paths.dedup();
    paths.len()
}

fn summarize(errors: &[BindingError]) -> String {
    let error_word = if errors.len() == 1 { "error" } else { "errors" };
    let fields = distinct_paths(errors);
    let field_word = if fields == 1 { "field" } else { "fields" };
    format!("{} {} in {} {}", errors.len(), error_word, fields, field_word)
}

impl IntoIterator for BindingErrors {
    type Item = BindingError;
    type IntoIter = std::vec::IntoIter<BindingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_error_display() {
        let err = BindingError::TypeMismatch {
            path: "spec.replicas".to_string(),
            expected: AttributeKind::Int,
            actual: "string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type mismatch at `spec.replicas`: expected int, found string"
        );
        assert_eq!(err.path(), "spec.replicas");
        assert_eq!(err.code(), "type_mismatch");
    }

    #[test]
    fn test_summary_counts_fields() {
        let errors = BindingErrors::new(vec![
            BindingError::MissingRequiredField {
                path: "metadata.name".to_string(),
            },
            BindingError::ValidationFailed {
                path: "spec.mode".to_string(),
                validator: "one_of".to_string(),
                detail: "unsupported value".to_string(),
            },
            BindingError::ValidationFailed {
                path: "spec.mode".to_string(),
                validator: "length".to_string(),
                detail: "too long".to_string(),
            },
        ]);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.summary(), "3 errors in 2 fields");
        assert_eq!(
            errors.to_string(),
            "invalid configuration: 3 errors in 2 fields"
        );
    }
}

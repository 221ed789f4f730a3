//! Display formatting for CLI output
//!
//! Provides structured display for:
//! - Binding errors grouped by top-level field
//! - Attribute schema trees

use console::style;
use serde::Serialize;
use std::collections::BTreeMap;

use kubeform_core::{AttributeNode, BindingError, Cardinality};

/// A binding problem ready for display
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub code: &'static str,
    pub path: String,
    pub message: String,
}

impl From<&BindingError> for ValidationIssue {
    fn from(error: &BindingError) -> Self {
        Self {
            code: error.code(),
            path: error.path().to_string(),
            message: error.to_string(),
        }
    }
}

/// Binding results for one resource
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub resource: String,
    pub valid: bool,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new<'a>(resource: &str, errors: impl IntoIterator<Item = &'a BindingError>) -> Self {
        let errors: Vec<ValidationIssue> = errors.into_iter().map(ValidationIssue::from).collect();
        Self {
            resource: resource.to_string(),
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Display errors grouped by the top-level field they belong to
    pub fn display(&self) {
        let mut by_section: BTreeMap<&str, Vec<&ValidationIssue>> = BTreeMap::new();
        for issue in &self.errors {
            by_section.entry(section(&issue.path)).or_default().push(issue);
        }

        for (section, issues) in by_section {
            println!();
            println!("{}", style(section).cyan().bold());

            for issue in issues {
                println!("  {} {}", style("✗").red(), issue.message);
            }
        }
    }

    /// Number of distinct fields with at least one error
    pub fn fields_with_errors(&self) -> usize {
        let mut paths: Vec<&str> = self.errors.iter().map(|e| e.path.as_str()).collect();
        paths.sort_unstable();
        paths.dedup();
        paths.len()
    }

    /// Print summary line
    pub fn print_summary(&self) {
        if self.valid {
            println!("{} Validation passed!", style("✓").green().bold());
        } else {
            println!(
                "{} Validation failed: {} error(s) in {} field(s)",
                style("✗").red().bold(),
                self.errors.len(),
                self.fields_with_errors()
            );
        }
    }
}

/// First segment of an error path (`spec.tags[1].key` -> `spec`)
fn section(path: &str) -> &str {
    let end = path.find(['.', '[']).unwrap_or(path.len());
    &path[..end]
}

/// Print an attribute and its descendants as an indented tree
pub fn print_attribute_tree(nodes: &[AttributeNode], depth: usize) {
    for node in nodes {
        print_attribute(node, depth);
        print_attribute_tree(&node.children, depth + 1);
    }
}

/// Print a single attribute line with kind, cardinality and validators
pub fn print_attribute(node: &AttributeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let cardinality = match node.cardinality {
        Cardinality::Required => style("required").red().to_string(),
        Cardinality::Optional => style("optional").dim().to_string(),
        Cardinality::Computed => style("computed").magenta().to_string(),
    };

    let mut line = format!(
        "{}{} ({}) {} {}",
        indent,
        style(&node.name).bold(),
        node.wire_name,
        style(node.kind).cyan(),
        cardinality
    );
    if !node.validators.is_empty() {
        let validators: Vec<String> = node.validators.iter().map(ToString::to_string).collect();
        line.push_str(&format!(" [{}]", validators.join(", ")));
    }
    println!("{}", line);

    if let Some(description) = &node.description {
        println!("{}  {}", indent, style(description).dim());
    }
}

//! Describe command - show the schema of a resource kind

use console::style;

use kubeform_engine::KindRegistry;

use crate::display::{print_attribute, print_attribute_tree};
use crate::error::{CliError, Result};

pub fn run(registry: &KindRegistry, resource: &str, path: Option<&str>) -> Result<()> {
    let kind = registry.get(resource)?;

    match path {
        Some(path) => {
            let node = kind.schema().describe(path).ok_or_else(|| CliError::Validation {
                message: format!("no attribute at `{}` in {}", path, resource),
                help: Some(format!("run `kubeform describe {}` to see all fields", resource)),
            })?;
            print_attribute(node, 0);
            print_attribute_tree(&node.children, 1);
        }
        None => {
            println!(
                "{} {}/{}",
                style(&kind.resource).bold(),
                kind.api_version,
                style(&kind.kind).cyan()
            );
            if let Some(description) = &kind.description {
                println!("{}", style(description).dim());
            }
            println!();
            print_attribute_tree(kind.schema().attributes(), 0);
        }
    }
    Ok(())
}

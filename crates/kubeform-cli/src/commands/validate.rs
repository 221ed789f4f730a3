//! Validate command - bind configuration against a kind and report every error

use std::path::PathBuf;

use console::style;

use kubeform_core::bind;
use kubeform_engine::KindRegistry;

use crate::display::ValidationReport;
use crate::error::{CliError, Result};
use crate::util::load_config;

pub fn run(
    registry: &KindRegistry,
    resource: &str,
    files: &[PathBuf],
    set_values: &[String],
    json_output: bool,
) -> Result<()> {
    let kind = registry.get(resource)?;
    let config = load_config(files, set_values)?;

    if !json_output {
        println!(
            "{} Validating {} ({}/{})",
            style("→").blue(),
            resource,
            kind.api_version,
            kind.kind
        );
    }

    let (_, errors) = bind(kind.schema(), &config);
    let report = ValidationReport::new(resource, &errors);

    if json_output {
        let output = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Internal { message: e.to_string() })?;
        println!("{}", output);
    } else {
        report.display();
        println!();
        report.print_summary();
    }

    if report.valid {
        Ok(())
    } else {
        Err(CliError::validation(format!(
            "{} error(s) in {} field(s)",
            report.errors.len(),
            report.fields_with_errors()
        )))
    }
}

//! Render command - print the manifest for a resource configuration

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use kubeform_engine::{EngineError, KindRegistry, ResourceAdapter};

use crate::display::ValidationReport;
use crate::error::Result;
use crate::util::load_config;

pub fn run(
    registry: Arc<KindRegistry>,
    resource: &str,
    files: &[PathBuf],
    set_values: &[String],
    stamp: bool,
) -> Result<()> {
    let config = load_config(files, set_values)?;
    let adapter = ResourceAdapter::new(registry);

    let result = if stamp {
        adapter.create(resource, &config).map(|state| {
            eprintln!("{} id: {}", style("→").blue(), state.id);
            state.manifest
        })
    } else {
        adapter.plan(resource, &config).map(|rendered| rendered.manifest)
    };

    match result {
        Ok(manifest) => {
            print!("{}", manifest);
            Ok(())
        }
        Err(EngineError::Binding(errors)) => {
            // keep stdout free of partial output; errors go to stderr
            let report = ValidationReport::new(resource, errors.iter());
            for issue in &report.errors {
                eprintln!("  {} {}", style("✗").red(), issue.message);
            }
            Err(EngineError::Binding(errors).into())
        }
        Err(other) => Err(other.into()),
    }
}

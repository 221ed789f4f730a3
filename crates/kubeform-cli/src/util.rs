//! Shared helpers for CLI commands

use std::path::{Path, PathBuf};

use kubeform_core::{ConfigValue, parse_set_values};
use kubeform_engine::KindRegistry;

use crate::error::{CliError, Result};

/// Built-in kinds plus every catalog file or directory given on the command line
pub fn load_registry(catalogs: &[PathBuf]) -> Result<KindRegistry> {
    let mut registry = KindRegistry::builtin()?;
    for path in catalogs {
        let count = registry.load_path(path).map_err(|e| {
            CliError::catalog(format!("failed to load {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), count, "loaded catalog");
    }
    Ok(registry)
}

/// Merge configuration files in order, then apply `--set` overrides
pub fn load_config(files: &[PathBuf], set_values: &[String]) -> Result<ConfigValue> {
    let mut config = ConfigValue::map();
    for file in files {
        config.merge(&read_config_file(file)?);
        tracing::debug!(file = %file.display(), "merged configuration file");
    }

    if !set_values.is_empty() {
        let overrides = parse_set_values(set_values)
            .map_err(|e| CliError::input(format!("invalid --set value: {}", e)))?;
        config.merge(&overrides);
    }
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<ConfigValue> {
    if !path.exists() {
        return Err(CliError::Io {
            message: format!("configuration file not found: {}", path.display()),
        });
    }
    ConfigValue::from_file(path).map_err(|e| match e {
        kubeform_core::CoreError::Io(io) => io.into(),
        other => CliError::input(format!("{}: {}", path.display(), other)),
    })
}

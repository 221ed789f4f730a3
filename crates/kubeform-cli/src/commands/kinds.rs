//! Kinds command - list registered resource kinds

use console::style;

use kubeform_engine::KindRegistry;

use crate::error::Result;

pub fn run(registry: &KindRegistry, json_output: bool) -> Result<()> {
    if json_output {
        let kinds: Vec<serde_json::Value> = registry
            .kinds()
            .map(|kind| {
                serde_json::json!({
                    "resource": kind.resource,
                    "apiVersion": kind.api_version,
                    "kind": kind.kind,
                    "bodyField": kind.body_field,
                    "namespaced": kind.namespaced,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(kinds));
        return Ok(());
    }

    let width = registry
        .kinds()
        .map(|kind| kind.resource.len())
        .max()
        .unwrap_or(0);

    for kind in registry.kinds() {
        let scope = if kind.namespaced { "" } else { " (cluster)" };
        println!(
            "{:width$}  {}/{}{}",
            style(&kind.resource).bold(),
            kind.api_version,
            style(&kind.kind).cyan(),
            style(scope).dim(),
            width = width
        );
    }
    println!();
    println!("{} {} kind(s) registered", style("✓").green(), registry.len());
    Ok(())
}

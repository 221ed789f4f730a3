//! Integration tests for CLI commands

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper to run kubeform command
fn kubeform(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_kubeform"))
        .args(args)
        .env_remove("KUBEFORM_CATALOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kubeform")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture");
    path.to_string_lossy().into_owned()
}

mod kinds_command {
    use super::*;

    #[test]
    fn test_lists_builtin_kinds() {
        let output = kubeform(&["kinds"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("redis_database"));
        assert!(stdout.contains("scheduling_pod_group"));
        assert!(stdout.contains("package_bundle"));
    }

    #[test]
    fn test_json_output() {
        let output = kubeform(&["kinds", "--json"]);
        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        let bundle = json
            .as_array()
            .unwrap()
            .iter()
            .find(|k| k["resource"] == "package_bundle")
            .expect("package_bundle listed");
        assert_eq!(bundle["bodyField"], "packages");
    }

    #[test]
    fn test_extra_catalog() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "widget.yaml",
            "resource: example_widget\napiVersion: example.com/v1\nkind: Widget\nattributes:\n  - { name: size, type: int }\n",
        );
        let output = kubeform(&["kinds", "--catalog", dir.path().to_str().unwrap()]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("example_widget"));
    }
}

mod describe_command {
    use super::*;

    #[test]
    fn test_describe_kind() {
        let output = kubeform(&["describe", "redis_database"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("subscriptionID"));
        assert!(stdout.contains("engine"));
    }

    #[test]
    fn test_describe_indexed_path() {
        let output = kubeform(&["describe", "redis_database", "spec.tags[2].key"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("key"));
        assert!(stdout.contains("required"));
    }

    #[test]
    fn test_describe_unknown_path() {
        let output = kubeform(&["describe", "redis_database", "spec.nope"]);
        assert_eq!(output.status.code(), Some(2));
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let output = kubeform(&[
            "validate",
            "redis_database",
            "--set",
            "metadata.name=g1",
            "--set",
            "spec.engine=Redis",
        ]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("Validation passed"));
    }

    #[test]
    fn test_validate_reports_all_errors_as_json() {
        let dir = TempDir::new().unwrap();
        let file = write(
            dir.path(),
            "db.yaml",
            "metadata: {}\nspec:\n  subscription_id: not-a-uuid\n",
        );
        let output = kubeform(&["validate", "redis_database", "-f", &file, "--json"]);
        assert_eq!(output.status.code(), Some(2));

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
        assert_eq!(json["valid"], false);
        let paths: Vec<&str> = json["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap())
            .collect();
        assert_eq!(
            paths,
            vec!["metadata.name", "spec.engine", "spec.subscription_id"]
        );
    }

    #[test]
    fn test_unknown_kind_exit_code() {
        let output = kubeform(&["validate", "redis_databse"]);
        assert_eq!(output.status.code(), Some(4));
        assert!(String::from_utf8_lossy(&output.stderr).contains("redis_database"));
    }

    #[test]
    fn test_missing_values_file() {
        let output = kubeform(&["validate", "redis_database", "-f", "/nonexistent/db.yaml"]);
        assert_eq!(output.status.code(), Some(5));
    }
}

mod render_command {
    use super::*;

    #[test]
    fn test_render_minimal() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "db.yaml", "metadata: {name: g1}\nspec: {engine: Redis}\n");
        let output = kubeform(&["render", "redis_database", "-f", &file]);
        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout),
            "apiVersion: redis.azure.kubeform.com/v1alpha1\nkind: Database\nmetadata:\n  name: g1\nspec:\n  engine: Redis\n"
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let file = write(
            dir.path(),
            "svc.yaml",
            "metadata: {name: web}\nspec:\n  ports:\n    - {port: 80, target_port: http}\n",
        );
        let first = kubeform(&["render", "core_service", "-f", &file]);
        let second = kubeform(&["render", "core_service", "-f", &file]);
        assert!(first.status.success());
        assert_eq!(first.stdout, second.stdout);
    }

    #[test]
    fn test_render_stamp_goes_to_stderr() {
        let output = kubeform(&[
            "render",
            "core_namespace",
            "--set",
            "metadata.name=team-a",
            "--stamp",
        ]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("id: "));
        assert!(!String::from_utf8_lossy(&output.stdout).contains("id:"));
    }

    #[test]
    fn test_render_invalid_config_prints_no_manifest() {
        let output = kubeform(&[
            "render",
            "redis_database",
            "--set",
            "metadata.name=g1",
            "--set",
            "spec.port=6379",
        ]);
        assert_eq!(output.status.code(), Some(2));
        assert!(output.stdout.is_empty());
        assert!(String::from_utf8_lossy(&output.stderr).contains("spec.engine"));
    }
}

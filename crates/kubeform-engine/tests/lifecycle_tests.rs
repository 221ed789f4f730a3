//! End-to-end scenarios over the built-in catalog

use std::sync::Arc;

use kubeform_core::{BindingError, ConfigValue};
use kubeform_engine::{EngineError, KindRegistry, ResourceAdapter, SteppingClock};

fn adapter() -> ResourceAdapter<SteppingClock> {
    let registry = Arc::new(KindRegistry::builtin().expect("built-in catalog loads"));
    ResourceAdapter::with_clock(registry, SteppingClock::new(1_700_000_000_000_000_000, 1_000))
}

fn config(yaml: &str) -> ConfigValue {
    ConfigValue::from_yaml(yaml).expect("valid YAML")
}

fn binding_errors(err: EngineError) -> Vec<BindingError> {
    match err {
        EngineError::Binding(errors) => errors.into_errors(),
        other => panic!("expected binding errors, got {:?}", other),
    }
}

mod redis_database {
    use super::*;

    #[test]
    fn test_minimal_valid_kind() {
        let state = adapter()
            .create(
                "redis_database",
                &config("metadata: {name: g1}\nspec: {engine: Redis}"),
            )
            .unwrap();

        assert_eq!(state.api_version, "redis.azure.kubeform.com/v1alpha1");
        assert_eq!(state.kind, "Database");
        insta::assert_snapshot!(state.manifest, @r"
        apiVersion: redis.azure.kubeform.com/v1alpha1
        kind: Database
        metadata:
          name: g1
        spec:
          engine: Redis
        ");
    }

    #[test]
    fn test_omitted_optional_with_validator() {
        let state = adapter()
            .create(
                "redis_database",
                &config("metadata: {name: g1}\nspec: {engine: Redis, port: 10000}"),
            )
            .unwrap();
        assert!(!state.manifest.contains("subscriptionID"));
        assert!(state.manifest.contains("  port: 10000\n"));
    }

    #[test]
    fn test_supplied_optional_uses_wire_name() {
        let state = adapter()
            .create(
                "redis_database",
                &config(
                    r#"
metadata: {name: g1}
spec:
  engine: Redis
  subscription_id: 00000000-1111-2222-3333-444444444444
"#,
                ),
            )
            .unwrap();
        assert!(
            state
                .manifest
                .contains("  subscriptionID: 00000000-1111-2222-3333-444444444444\n"),
            "{}",
            state.manifest
        );
    }

    #[test]
    fn test_tags_round_trip() {
        let state = adapter()
            .create(
                "redis_database",
                &config(
                    r#"
metadata: {name: g1}
spec:
  engine: Redis
  tags:
    - {key: a, value: "1"}
    - {key: b}
"#,
                ),
            )
            .unwrap();
        insta::assert_snapshot!(state.manifest, @r"
        apiVersion: redis.azure.kubeform.com/v1alpha1
        kind: Database
        metadata:
          name: g1
        spec:
          engine: Redis
          tags:
          - key: a
            value: '1'
          - key: b
        ");
    }

    #[test]
    fn test_error_accumulation() {
        // metadata.name and spec.engine missing, subscription_id malformed
        let err = adapter()
            .create(
                "redis_database",
                &config("metadata: {}\nspec: {subscription_id: not-a-uuid}"),
            )
            .unwrap_err();
        let errors = binding_errors(err);
        let paths: Vec<&str> = errors.iter().map(BindingError::path).collect();
        assert_eq!(
            paths,
            vec!["metadata.name", "spec.engine", "spec.subscription_id"]
        );
    }

    #[test]
    fn test_list_element_path() {
        let err = adapter()
            .create(
                "redis_database",
                &config("metadata: {name: g1}\nspec: {engine: Redis, tags: [{key: a}, {value: x}]}"),
            )
            .unwrap_err();
        let errors = binding_errors(err);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), "spec.tags[1].key");
    }

    #[test]
    fn test_computed_fields_are_rejected() {
        let err = adapter()
            .create(
                "redis_database",
                &config("api_version: v9\nmetadata: {name: g1}\nspec: {engine: Redis}"),
            )
            .unwrap_err();
        let errors = binding_errors(err);
        assert!(matches!(
            errors.as_slice(),
            [BindingError::ValidationFailed { path, validator, .. }]
                if path == "api_version" && validator == "computed"
        ));
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_repeated_update_changes_identifier() {
        let adapter = adapter();
        let raw = config("metadata: {name: g1}\nspec: {engine: Redis}");

        let created = adapter.create("redis_database", &raw).unwrap();
        let first = adapter.update("redis_database", &created, &raw).unwrap();
        let second = adapter.update("redis_database", &first, &raw).unwrap();

        assert_ne!(created.id, first.id);
        assert_ne!(first.id, second.id);
        assert_eq!(first.api_version, second.api_version);
        assert_eq!(first.kind, second.kind);
        assert_eq!(first.manifest, second.manifest);
    }

    #[test]
    fn test_update_reflects_new_input() {
        let adapter = adapter();
        let created = adapter
            .create(
                "redis_database",
                &config("metadata: {name: g1}\nspec: {engine: Redis}"),
            )
            .unwrap();
        let updated = adapter
            .update(
                "redis_database",
                &created,
                &config("metadata: {name: g1}\nspec: {engine: Redis, port: 10000}"),
            )
            .unwrap();

        assert_ne!(created.manifest, updated.manifest);
        assert!(updated.manifest.contains("port: 10000"));
    }

    #[test]
    fn test_failed_update_keeps_nothing() {
        let adapter = adapter();
        let created = adapter
            .create(
                "redis_database",
                &config("metadata: {name: g1}\nspec: {engine: Redis}"),
            )
            .unwrap();
        let result = adapter.update(
            "redis_database",
            &created,
            &config("metadata: {name: g1}\nspec: {engine: Memcached}"),
        );
        assert!(matches!(result, Err(EngineError::Binding(_))));
    }

    #[test]
    fn test_system_clock_identifiers() {
        let registry = Arc::new(KindRegistry::builtin().unwrap());
        let adapter = ResourceAdapter::new(registry);
        let state = adapter
            .create(
                "core_namespace",
                &config("metadata: {name: team-a}"),
            )
            .unwrap();
        assert!(state.id > 0);
        adapter.delete("core_namespace", &state).unwrap();
    }

    #[test]
    fn test_unknown_kind() {
        let adapter = adapter();
        assert!(matches!(
            adapter.plan("redis_db", &ConfigValue::Null),
            Err(EngineError::UnknownKind { .. })
        ));
    }
}

mod other_kinds {
    use super::*;

    #[test]
    fn test_package_bundle_body_field() {
        let rendered = adapter()
            .plan(
                "package_bundle",
                &config(
                    r#"
metadata: {name: monitoring, namespace: tools}
packages:
  chart: {name: prometheus, version: 25.8.0}
  values_file: values.yaml
  features: []
"#,
                ),
            )
            .unwrap();
        insta::assert_snapshot!(rendered.manifest, @r"
        apiVersion: packages.kubeform.com/v1alpha1
        kind: Bundle
        metadata:
          name: monitoring
          namespace: tools
        packages:
          chart:
            name: prometheus
            version: 25.8.0
          valuesFile: values.yaml
          features: []
        ");
    }

    #[test]
    fn test_service_target_ports() {
        let rendered = adapter()
            .plan(
                "core_service",
                &config(
                    r#"
metadata: {name: web, labels: {app: web}}
spec:
  type: ClusterIP
  cluster_ip: 10.0.0.10
  selector: {app: web}
  ports:
    - {name: http, port: 80, target_port: http}
    - {name: metrics, port: 9090, target_port: 9090}
    - {name: admin, port: 8080, target_port: "8080"}
"#,
                ),
            )
            .unwrap();
        let manifest = rendered.manifest;
        assert!(manifest.contains("  clusterIP: 10.0.0.10\n"), "{}", manifest);
        assert!(manifest.contains("    targetPort: http\n"));
        assert!(manifest.contains("    targetPort: 9090\n"));
        assert!(manifest.contains("    targetPort: '8080'\n"));
    }

    #[test]
    fn test_pod_group_quantities() {
        let err = adapter()
            .plan(
                "scheduling_pod_group",
                &config(
                    r#"
metadata: {name: job-a}
spec:
  min_member: 3
  min_resources: {cpu: 500m, memory: lots}
"#,
                ),
            )
            .unwrap_err();
        let errors = binding_errors(err);
        assert!(matches!(
            errors.as_slice(),
            [BindingError::ValidationFailed { path, validator, detail }]
                if path == "spec.min_resources"
                    && validator == "quantity"
                    && detail.contains("'lots'")
        ));
    }

    #[test]
    fn test_constraint_template_is_cluster_scoped() {
        let err = adapter()
            .plan(
                "gatekeeper_constraint_template",
                &config(
                    r#"
metadata: {name: k8srequiredlabels, namespace: default}
spec:
  crd: {spec: {names: {kind: K8sRequiredLabels}}}
  targets: [{target: admission.k8s.gatekeeper.sh, rego: "package k8s"}]
"#,
                ),
            )
            .unwrap_err();
        let errors = binding_errors(err);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path(), "metadata.namespace");
        assert_eq!(errors[0].code(), "validation_failed");
    }

    #[test]
    fn test_constraint_template_deep_nesting() {
        let rendered = adapter()
            .plan(
                "gatekeeper_constraint_template",
                &config(
                    r#"
metadata: {name: k8srequiredlabels}
spec:
  crd:
    spec:
      names: {kind: K8sRequiredLabels}
      validation:
        open_apiv3_schema:
          type: object
          x_kubernetes_preserve_unknown_fields: true
  targets: [{target: admission.k8s.gatekeeper.sh, rego: "package k8s"}]
"#,
                ),
            )
            .unwrap();
        insta::assert_snapshot!(rendered.manifest, @r"
        apiVersion: templates.gatekeeper.sh/v1beta1
        kind: ConstraintTemplate
        metadata:
          name: k8srequiredlabels
        spec:
          crd:
            spec:
              names:
                kind: K8sRequiredLabels
              validation:
                openAPIV3Schema:
                  type: object
                  x-kubernetes-preserve-unknown-fields: true
          targets:
          - target: admission.k8s.gatekeeper.sh
            rego: package k8s
        ");
    }
}

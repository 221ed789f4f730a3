//! Registry of resource kinds
//!
//! Built once at startup and then shared read-only, usually behind an `Arc`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;

use crate::catalog::{self, KindDefinition, ResourceKind};
use crate::error::{EngineError, Result};

/// Maximum Levenshtein distance to consider for kind name suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, Arc<ResourceKind>>,
}

impl KindRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the kinds compiled into the engine
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for (file, source) in catalog::builtin_sources() {
            let count = registry.load_str(source)?;
            tracing::debug!(file, count, "loaded built-in kinds");
        }
        Ok(registry)
    }

    /// Register one declaration, rejecting resource names already in use
    pub fn register(&mut self, definition: KindDefinition) -> Result<()> {
        self.insert(ResourceKind::from_definition(definition)?)
    }

    pub fn insert(&mut self, kind: ResourceKind) -> Result<()> {
        if self.kinds.contains_key(&kind.resource) {
            return Err(EngineError::DuplicateKind {
                name: kind.resource,
            });
        }
        self.kinds.insert(kind.resource.clone(), Arc::new(kind));
        Ok(())
    }

    /// Register every kind declared in a YAML source, returning how many
    pub fn load_str(&mut self, source: &str) -> Result<usize> {
        let definitions = catalog::parse_catalog(source)?;
        let count = definitions.len();
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(count)
    }

    /// Register the kinds declared in one catalog file
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let source = std::fs::read_to_string(path)?;
        let count = self.load_str(&source)?;
        tracing::debug!(path = %path.display(), count, "loaded catalog file");
        Ok(count)
    }

    /// Register every `.yaml`/`.yml` file below a directory, in path order
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut total = 0;
        let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("filesystem loop in catalog directory")
                })
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if is_catalog_file(path) {
                total += self.load_file(path)?;
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "ignoring non-YAML file in catalog directory"
                );
            }
        }
        Ok(total)
    }

    /// Load a catalog file or directory
    pub fn load_path(&mut self, path: &Path) -> Result<usize> {
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path)
        }
    }

    /// Look up a kind by resource name
    pub fn get(&self, resource: &str) -> Result<Arc<ResourceKind>> {
        self.kinds
            .get(resource)
            .cloned()
            .ok_or_else(|| EngineError::UnknownKind {
                name: resource.to_string(),
                suggestion: self.suggest(resource).map(|s| format!("did you mean '{}'?", s)),
            })
    }

    pub fn contains(&self, resource: &str) -> bool {
        self.kinds.contains_key(resource)
    }

    /// Registered kinds ordered by resource name
    pub fn kinds(&self) -> impl Iterator<Item = &Arc<ResourceKind>> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Closest resource name, also matching on the Kubernetes kind
    /// (`PodGroup` suggests `scheduling_pod_group`)
    fn suggest(&self, name: &str) -> Option<&str> {
        if let Some(kind) = self
            .kinds
            .values()
            .find(|k| k.kind.eq_ignore_ascii_case(name))
        {
            return Some(kind.resource.as_str());
        }

        self.kinds
            .keys()
            .map(|key| (strsim::levenshtein(name, key), key.as_str()))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, key)| key)
    }
}

fn is_catalog_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const WIDGET: &str = r#"
resource: example_widget
apiVersion: example.com/v1
kind: Widget
attributes:
  - { name: size, type: int, required: true }
"#;

    #[test]
    fn test_builtin_kinds() {
        let registry = KindRegistry::builtin().unwrap();
        let names: Vec<&str> = registry.kinds().map(|k| k.resource.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "core_namespace",
                "core_service",
                "gatekeeper_constraint_template",
                "package_bundle",
                "redis_database",
                "scheduling_pod_group",
            ]
        );

        let bundle = registry.get("package_bundle").unwrap();
        assert_eq!(bundle.body_field, "packages");
        assert!(!registry.get("core_namespace").unwrap().namespaced);
    }

    #[test]
    fn test_constraint_template_nesting() {
        let registry = KindRegistry::builtin().unwrap();
        let template = registry.get("gatekeeper_constraint_template").unwrap();
        let node = template
            .schema()
            .describe("spec.crd.spec.validation.open_apiv3_schema")
            .unwrap();
        assert_eq!(node.wire_name, "openAPIV3Schema");
    }

    #[test]
    fn test_unknown_kind_suggestion() {
        let registry = KindRegistry::builtin().unwrap();

        match registry.get("redis_databse") {
            Err(EngineError::UnknownKind { suggestion, .. }) => {
                assert_eq!(suggestion.as_deref(), Some("did you mean 'redis_database'?"));
            }
            other => panic!("unexpected {:?}", other),
        }

        match registry.get("PodGroup") {
            Err(EngineError::UnknownKind { suggestion, .. }) => {
                assert_eq!(
                    suggestion.as_deref(),
                    Some("did you mean 'scheduling_pod_group'?")
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            registry.get("nothing_like_it"),
            Err(EngineError::UnknownKind { suggestion: None, .. })
        ));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut registry = KindRegistry::new();
        registry.load_str(WIDGET).unwrap();
        let err = registry.load_str(WIDGET).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateKind { ref name } if name == "example_widget"));
    }

    #[test]
    fn test_load_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("widget.yaml"), WIDGET).unwrap();
        std::fs::write(
            dir.path().join("nested/gadget.yml"),
            WIDGET
                .replace("example_widget", "example_gadget")
                .replace("Widget", "Gadget"),
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "# kinds").unwrap();

        let mut registry = KindRegistry::new();
        assert_eq!(registry.load_path(dir.path()).unwrap(), 2);
        assert!(registry.contains("example_widget"));
        assert!(registry.contains("example_gadget"));
    }

    #[test]
    fn test_invalid_catalog_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "resource: x\nkind: [not, a, string]\n").unwrap();

        let mut registry = KindRegistry::new();
        assert!(matches!(
            registry.load_file(&path),
            Err(EngineError::Yaml(_))
        ));
    }
}

//! Resource kind declarations
//!
//! Kinds are data: each YAML document in a catalog file describes one
//! resource type, its Kubernetes `apiVersion`/`kind` and the attributes of
//! its body. The `metadata` block is the same for every kind and is added
//! when the declaration is turned into a [`ResourceKind`].

use serde::{Deserialize, Serialize};

use kubeform_core::{
    AttributeDecl, AttributeKind, AttributeNode, AttributeSchema, CoreError, Validator,
};

use crate::error::Result;

/// Catalog files compiled into the binary
const BUILTIN_CATALOG: &[(&str, &str)] = &[
    ("redis.yaml", include_str!("../catalog/redis.yaml")),
    ("scheduling.yaml", include_str!("../catalog/scheduling.yaml")),
    ("core.yaml", include_str!("../catalog/core.yaml")),
    ("packages.yaml", include_str!("../catalog/packages.yaml")),
    ("gatekeeper.yaml", include_str!("../catalog/gatekeeper.yaml")),
];

pub const DEFAULT_BODY_FIELD: &str = "spec";

fn default_body_field() -> String {
    DEFAULT_BODY_FIELD.to_string()
}

fn default_true() -> bool {
    true
}

/// One resource kind as written in a catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KindDefinition {
    /// Type name used by the surrounding tool, e.g. `redis_database`
    pub resource: String,

    pub api_version: String,

    pub kind: String,

    /// Top-level field holding the body, usually `spec`
    #[serde(default = "default_body_field")]
    pub body_field: String,

    #[serde(default = "default_true")]
    pub namespaced: bool,

    /// Require the body even when none of its attributes are required
    #[serde(default)]
    pub body_required: bool,

    #[serde(default)]
    pub description: Option<String>,

    pub attributes: Vec<AttributeDecl>,
}

/// Parse every kind declared in a (possibly multi-document) YAML source
pub fn parse_catalog(source: &str) -> Result<Vec<KindDefinition>> {
    let mut definitions = Vec::new();
    for document in serde_yaml::Deserializer::from_str(source) {
        definitions.push(KindDefinition::deserialize(document)?);
    }
    Ok(definitions)
}

/// Kind declarations shipped with the engine, tagged with their file name
pub fn builtin_sources() -> impl Iterator<Item = (&'static str, &'static str)> {
    BUILTIN_CATALOG.iter().copied()
}

/// A registered resource kind with its fully assembled schema
#[derive(Debug, Clone)]
pub struct ResourceKind {
    pub resource: String,
    pub api_version: String,
    pub kind: String,
    pub body_field: String,
    pub namespaced: bool,
    pub description: Option<String>,
    schema: AttributeSchema,
}

impl ResourceKind {
    /// Assemble the kind's schema: computed `apiVersion` and `kind`, the
    /// standard `metadata` block, then the body
    pub fn from_definition(definition: KindDefinition) -> Result<Self> {
        let KindDefinition {
            resource,
            api_version,
            kind,
            body_field,
            namespaced,
            body_required,
            description,
            attributes,
        } = definition;

        if resource.is_empty() || api_version.is_empty() || kind.is_empty() {
            return Err(CoreError::invalid_schema(format!(
                "kind '{}' needs non-empty resource, apiVersion and kind",
                resource
            ))
            .into());
        }

        let body = attributes
            .into_iter()
            .map(AttributeDecl::into_node)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| in_resource(&resource, e))?;

        let mut body_node = AttributeNode::new(body_field.as_str(), AttributeKind::Object)
            .with_children(body);
        if body_required || body_node.children.iter().any(AttributeNode::is_required) {
            body_node = body_node.required();
        }

        let schema = AttributeSchema::new(vec![
            AttributeNode::new("api_version", AttributeKind::String)
                .computed()
                .with_description("API group and version, fixed per kind"),
            AttributeNode::new("kind", AttributeKind::String)
                .computed()
                .with_description("Kubernetes kind, fixed per kind"),
            metadata_node(namespaced),
            body_node,
        ])
        .map_err(|e| in_resource(&resource, e))?;

        Ok(Self {
            resource,
            api_version,
            kind,
            body_field,
            namespaced,
            description,
            schema,
        })
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Attributes of the body field
    pub fn body(&self) -> &[AttributeNode] {
        self.schema
            .attribute(&self.body_field)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }
}

fn in_resource(resource: &str, err: CoreError) -> crate::error::EngineError {
    let message = match err {
        CoreError::InvalidSchema { message } => message,
        other => other.to_string(),
    };
    CoreError::invalid_schema(format!("kind '{}': {}", resource, message)).into()
}

fn metadata_node(namespaced: bool) -> AttributeNode {
    let mut children = vec![
        AttributeNode::new("name", AttributeKind::String)
            .required()
            .with_validator(Validator::Name)
            .with_description("Object name, unique per namespace"),
    ];
    if namespaced {
        children.push(
            AttributeNode::new("namespace", AttributeKind::String)
                .with_validator(Validator::DnsLabel)
                .with_description("Namespace the object lives in"),
        );
    }
    children.push(
        AttributeNode::new("labels", AttributeKind::StringMap)
            .with_validator(Validator::Labels)
            .with_description("Key/value labels used for selection"),
    );
    children.push(
        AttributeNode::new("annotations", AttributeKind::StringMap)
            .with_validator(Validator::Annotations)
            .with_description("Arbitrary non-identifying metadata"),
    );

    AttributeNode::new("metadata", AttributeKind::Object)
        .required()
        .with_description("Standard object metadata")
        .with_children(children)
}

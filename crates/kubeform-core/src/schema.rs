//! Attribute schemas describing a resource kind's configuration surface
//!
//! A schema is a tree of [`AttributeNode`]s, built once when a kind is
//! registered and shared read-only afterwards. Nodes can be declared in code
//! with the builder methods or loaded from YAML declarations
//! ([`AttributeDecl`]).
//!
//! ```yaml
//! - name: engine
//!   type: string
//!   required: true
//!   validators: [{ oneOf: [Redis, Memcached] }]
//! - name: tags
//!   type: object-list
//!   attributes:
//!     - { name: key, type: string, required: true }
//!     - { name: value, type: string }
//! ```

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{CoreError, Result};
use crate::validators::{Validator, ValidatorDecl};

/// Word segments rendered fully upper-case in wire names
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ARN", "CA", "CIDR", "CPU", "CRD", "DNS", "FQDN", "GPU", "HTTP", "HTTPS", "ID",
    "IP", "JSON", "JWT", "OS", "QPS", "SQL", "SSH", "TCP", "TLS", "TTL", "UDP", "UID", "URI",
    "URL", "UUID", "VM", "XML",
];

/// Semantic type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKind {
    String,
    Int,
    Bool,
    IntOrString,
    StringMap,
    StringList,
    Object,
    ObjectList,
}

impl AttributeKind {
    /// Whether nodes of this kind carry child attributes
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Object | Self::ObjectList)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::IntOrString => "int-or-string",
            Self::StringMap => "string-map",
            Self::StringList => "string-list",
            Self::Object => "object",
            Self::ObjectList => "object-list",
        };
        f.write_str(s)
    }
}

/// Whether an attribute must, may, or cannot be supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Required,
    #[default]
    Optional,
    /// Filled in by the adapter, never by the caller
    Computed,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Optional => write!(f, "optional"),
            Self::Computed => write!(f, "computed"),
        }
    }
}

/// One attribute of a schema
#[derive(Debug, Clone)]
pub struct AttributeNode {
    pub name: String,
    pub wire_name: String,
    pub kind: AttributeKind,
    pub cardinality: Cardinality,
    pub description: Option<String>,
    pub validators: Vec<Validator>,
    pub children: Vec<AttributeNode>,
}

impl AttributeNode {
    /// Create an optional attribute; the wire name is derived from `name`
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        let name = name.into();
        Self {
            wire_name: wire_name_for(&name),
            name,
            kind,
            cardinality: Cardinality::Optional,
            description: None,
            validators: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.cardinality = Cardinality::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.cardinality = Cardinality::Computed;
        self
    }

    pub fn with_wire_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_children(mut self, children: Vec<AttributeNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_required(&self) -> bool {
        self.cardinality == Cardinality::Required
    }

    pub fn is_computed(&self) -> bool {
        self.cardinality == Cardinality::Computed
    }

    pub fn is_leaf(&self) -> bool {
        !self.kind.is_nested()
    }

    pub fn child(&self, name: &str) -> Option<&AttributeNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Derive the camelCase wire name for a snake_case attribute name
///
/// `subscription_id` becomes `subscriptionID`, `api_version` becomes
/// `apiVersion`.
pub fn wire_name_for(name: &str) -> String {
    let mut wire = String::with_capacity(name.len());
    for (i, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
        let upper = word.to_ascii_uppercase();
        if i == 0 {
            wire.push_str(&word.to_lower_camel_case());
        } else if INITIALISMS.contains(&upper.as_str()) {
            wire.push_str(&upper);
        } else {
            wire.push_str(&word.to_upper_camel_case());
        }
    }
    wire
}

/// An attribute as written in a YAML kind declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttributeDecl {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: AttributeKind,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub computed: bool,

    /// Overrides the derived camelCase key
    #[serde(default)]
    pub wire_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub validators: Vec<ValidatorDecl>,

    /// Children of object and object-list attributes
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
}

impl AttributeDecl {
    /// Convert into a node, compiling validators along the way
    pub fn into_node(self) -> Result<AttributeNode> {
        if self.required && self.computed {
            return Err(CoreError::invalid_schema(format!(
                "attribute '{}' cannot be both required and computed",
                self.name
            )));
        }

        let validators = self
            .validators
            .iter()
            .map(ValidatorDecl::compile)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| {
                let message = match e {
                    CoreError::InvalidSchema { message } => message,
                    other => other.to_string(),
                };
                CoreError::invalid_schema(format!("attribute '{}': {}", self.name, message))
            })?;

        let children = self
            .attributes
            .into_iter()
            .map(AttributeDecl::into_node)
            .collect::<Result<Vec<_>>>()?;

        let mut node = AttributeNode::new(self.name, self.kind).with_children(children);
        node.validators = validators;
        node.description = self.description;
        if let Some(wire_name) = self.wire_name {
            node.wire_name = wire_name;
        }
        if self.required {
            node = node.required();
        } else if self.computed {
            node = node.computed();
        }
        Ok(node)
    }
}

/// The validated attribute tree of one resource kind
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    attributes: Vec<AttributeNode>,
}

impl AttributeSchema {
    /// Build a schema, checking the structural invariants of every node
    pub fn new(attributes: Vec<AttributeNode>) -> Result<Self> {
        check_siblings(&attributes, "")?;
        Ok(Self { attributes })
    }

    /// Build a schema from YAML declarations
    pub fn from_decls(decls: Vec<AttributeDecl>) -> Result<Self> {
        let attributes = decls
            .into_iter()
            .map(AttributeDecl::into_node)
            .collect::<Result<Vec<_>>>()?;
        Self::new(attributes)
    }

    /// Parse a YAML list of attribute declarations
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let decls: Vec<AttributeDecl> = serde_yaml::from_str(yaml)?;
        Self::from_decls(decls)
    }

    /// Top-level attributes in declaration order
    pub fn attributes(&self) -> &[AttributeNode] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Resolve a dotted field path to its attribute node
    ///
    /// Paths may index into lists either with brackets or plain segments:
    /// `spec.tags[2].key` and `spec.tags.2.key` resolve to the same node.
    pub fn describe(&self, path: &str) -> Option<&AttributeNode> {
        let mut siblings = self.attributes.as_slice();
        let mut current: Option<&AttributeNode> = None;

        for segment in parse_path(path)? {
            match segment {
                PathSegment::Name(name) => {
                    let node = siblings.iter().find(|n| n.name == name)?;
                    siblings = &node.children;
                    current = Some(node);
                }
                PathSegment::Index(_) => {
                    let node = current?;
                    if !matches!(node.kind, AttributeKind::ObjectList | AttributeKind::StringList) {
                        return None;
                    }
                }
            }
        }

        current
    }
}

#[derive(Debug, PartialEq)]
enum PathSegment<'a> {
    Name(&'a str),
    Index(usize),
}

fn parse_path(path: &str) -> Option<Vec<PathSegment<'_>>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Ok(index) = part.parse::<usize>() {
            segments.push(PathSegment::Index(index));
            continue;
        }

        let (name, mut rest) = match part.find('[') {
            Some(pos) => part.split_at(pos),
            None => (part, ""),
        };
        if name.is_empty() {
            return None;
        }
        segments.push(PathSegment::Name(name));

        while !rest.is_empty() {
            let close = rest.find(']')?;
            let index = rest[1..close].parse::<usize>().ok()?;
            segments.push(PathSegment::Index(index));
            rest = &rest[close + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return None;
            }
        }
    }
    Some(segments)
}

fn check_siblings(nodes: &[AttributeNode], parent: &str) -> Result<()> {
    let mut names = HashSet::new();
    let mut wire_names = HashSet::new();

    for node in nodes {
        let path = if parent.is_empty() {
            node.name.clone()
        } else {
            format!("{}.{}", parent, node.name)
        };

        if node.name.is_empty() || node.name.contains(['.', '[', ']']) {
            return Err(CoreError::invalid_schema(format!(
                "invalid attribute name '{}'",
                path
            )));
        }
        if !names.insert(node.name.as_str()) {
            return Err(CoreError::invalid_schema(format!(
                "duplicate attribute '{}'",
                path
            )));
        }
        if node.wire_name.is_empty() || !wire_names.insert(node.wire_name.as_str()) {
            return Err(CoreError::invalid_schema(format!(
                "attribute '{}' has an empty or duplicate wire name '{}'",
                path, node.wire_name
            )));
        }

        match (node.kind.is_nested(), node.children.is_empty()) {
            (true, true) => {
                return Err(CoreError::invalid_schema(format!(
                    "{} attribute '{}' must declare child attributes",
                    node.kind, path
                )));
            }
            (false, false) => {
                return Err(CoreError::invalid_schema(format!(
                    "{} attribute '{}' cannot declare child attributes",
                    node.kind, path
                )));
            }
            _ => {}
        }

        check_siblings(&node.children, &path)?;
    }
    Ok(())
}

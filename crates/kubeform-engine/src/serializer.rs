//! Canonical YAML rendering of bound models
//!
//! Keys are emitted in schema-declaration order using each attribute's wire
//! name. Absent fields are left out entirely, while present-but-empty maps and
//! lists render as `{}` and `[]`. The same model always renders to the same
//! bytes.

use serde_yaml::{Mapping, Value as YamlValue};

use kubeform_core::{
    AttributeKind, AttributeNode, AttributeSchema, BoundObject, BoundValue, Field, IntOrString,
};

use crate::error::{EngineError, Result};

pub const API_VERSION_KEY: &str = "apiVersion";
pub const KIND_KEY: &str = "kind";

/// Render a bound model as a manifest document
///
/// `apiVersion` and `kind` always lead the document. Root attributes using
/// those wire names are filled from the arguments rather than the model.
pub fn render(
    model: &BoundObject,
    schema: &AttributeSchema,
    api_version: &str,
    kind: &str,
) -> Result<String> {
    let mut document = Mapping::new();
    document.insert(API_VERSION_KEY.into(), api_version.into());
    document.insert(KIND_KEY.into(), kind.into());

    let body: Vec<&AttributeNode> = schema
        .attributes()
        .iter()
        .filter(|node| node.wire_name != API_VERSION_KEY && node.wire_name != KIND_KEY)
        .collect();
    check_known_fields(model, schema.attributes(), "")?;
    write_fields(&mut document, model, &body, "")?;

    Ok(serde_yaml::to_string(&YamlValue::Mapping(document))?)
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn object_to_mapping(object: &BoundObject, nodes: &[AttributeNode], path: &str) -> Result<Mapping> {
    check_known_fields(object, nodes, path)?;
    let nodes: Vec<&AttributeNode> = nodes.iter().collect();
    let mut mapping = Mapping::new();
    write_fields(&mut mapping, object, &nodes, path)?;
    Ok(mapping)
}

/// Every field in the model must belong to the schema
fn check_known_fields(object: &BoundObject, nodes: &[AttributeNode], path: &str) -> Result<()> {
    for (name, _) in object.iter() {
        if nodes.iter().all(|node| node.name != name) {
            return Err(EngineError::inconsistency(
                join(path, name),
                "field is not declared in the schema",
            ));
        }
    }
    Ok(())
}

fn write_fields(
    mapping: &mut Mapping,
    object: &BoundObject,
    nodes: &[&AttributeNode],
    path: &str,
) -> Result<()> {
    for node in nodes {
        let field_path = join(path, &node.name);
        match object.field(&node.name).unwrap_or(&Field::Absent) {
            Field::Present(value) => {
                let rendered = value_to_yaml(value, node, &field_path)?;
                mapping.insert(node.wire_name.as_str().into(), rendered);
            }
            Field::Absent if node.is_required() => {
                return Err(EngineError::inconsistency(
                    field_path,
                    "required field is absent from the bound model",
                ));
            }
            Field::Absent => {}
        }
    }
    Ok(())
}

fn value_to_yaml(value: &BoundValue, node: &AttributeNode, path: &str) -> Result<YamlValue> {
    let rendered = match (node.kind, value) {
        (AttributeKind::String, BoundValue::String(s)) => YamlValue::String(s.clone()),
        (AttributeKind::Int, BoundValue::Int(i)) => YamlValue::Number((*i).into()),
        (AttributeKind::Bool, BoundValue::Bool(b)) => YamlValue::Bool(*b),
        (AttributeKind::IntOrString, BoundValue::IntOrString(v)) => match v {
            IntOrString::Int(i) => YamlValue::Number((*i).into()),
            IntOrString::Str(s) => YamlValue::String(s.clone()),
        },
        (AttributeKind::StringMap, BoundValue::StringMap(map)) => YamlValue::Mapping(
            map.iter()
                .map(|(k, v)| (YamlValue::from(k.as_str()), YamlValue::from(v.as_str())))
                .collect(),
        ),
        (AttributeKind::StringList, BoundValue::StringList(items)) => {
            YamlValue::Sequence(items.iter().map(|s| YamlValue::from(s.as_str())).collect())
        }
        (AttributeKind::Object, BoundValue::Object(object)) => {
            YamlValue::Mapping(object_to_mapping(object, &node.children, path)?)
        }
        (AttributeKind::ObjectList, BoundValue::ObjectList(items)) => YamlValue::Sequence(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    object_to_mapping(item, &node.children, &format!("{}[{}]", path, i))
                        .map(YamlValue::Mapping)
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        (expected, other) => {
            return Err(EngineError::inconsistency(
                path,
                format!("expected {}, found {}", expected, other.kind()),
            ));
        }
    };
    Ok(rendered)
}

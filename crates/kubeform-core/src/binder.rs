//! Binding of configuration value trees against attribute schemas
//!
//! The binder walks the schema in declaration order (pre-order) and never
//! stops at the first problem: every missing field, type mismatch and
//! validator failure across the whole tree is collected so the caller can
//! report them in one pass.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::bound::{BoundObject, BoundValue, Field};
use crate::error::{BindingError, BindingErrors, ShapeMismatch};
use crate::quantity::{IntOrString, exact_i64};
use crate::schema::{AttributeKind, AttributeNode, AttributeSchema, Cardinality};
use crate::values::ConfigValue;

/// Maximum Levenshtein distance to consider for field name suggestions
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Bind `raw` against `schema`, returning the model and every error found
///
/// The model is only meaningful when the error list is empty.
pub fn bind(schema: &AttributeSchema, raw: &ConfigValue) -> (BoundObject, Vec<BindingError>) {
    let mut binder = Binder::default();
    let root = FieldPath::root();

    let model = match raw {
        ConfigValue::Map(entries) => binder.bind_entries(schema.attributes(), entries, &root),
        ConfigValue::Null => binder.bind_entries(schema.attributes(), &[], &root),
        other => {
            binder.type_mismatch(&root, AttributeKind::Object, other.shape());
            absent_object(schema.attributes())
        }
    };

    (model, binder.errors)
}

/// Bind `raw` against `schema`, failing with all errors if any were found
pub fn bind_checked(
    schema: &AttributeSchema,
    raw: &ConfigValue,
) -> Result<BoundObject, BindingErrors> {
    let (model, errors) = bind(schema, raw);
    if errors.is_empty() {
        Ok(model)
    } else {
        Err(BindingErrors::new(errors))
    }
}

fn absent_object(nodes: &[AttributeNode]) -> BoundObject {
    let mut object = BoundObject::new();
    for node in nodes {
        object.insert(node.name.clone(), Field::Absent);
    }
    object
}

/// Dotted path of the field being bound, e.g. `spec.tags[2].key`
#[derive(Debug, Clone, Default)]
struct FieldPath(String);

impl FieldPath {
    fn root() -> Self {
        Self::default()
    }

    fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    fn key(&self, key: &str) -> Self {
        Self(format!("{}[{:?}]", self.0, key))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.0)
        }
    }
}

#[derive(Default)]
struct Binder {
    errors: Vec<BindingError>,
}

impl Binder {
    fn type_mismatch(&mut self, path: &FieldPath, expected: AttributeKind, actual: &str) {
        self.errors.push(BindingError::TypeMismatch {
            path: path.to_string(),
            expected,
            actual: actual.to_string(),
        });
    }

    fn shape_mismatch(&mut self, path: &FieldPath, mismatch: ShapeMismatch) {
        self.errors.push(BindingError::TypeMismatch {
            path: path.to_string(),
            expected: mismatch.expected,
            actual: mismatch.actual,
        });
    }

    fn validation_failed(&mut self, path: &FieldPath, validator: &str, detail: String) {
        self.errors.push(BindingError::ValidationFailed {
            path: path.to_string(),
            validator: validator.to_string(),
            detail,
        });
    }

    /// Bind the entries of a map against sibling attributes
    fn bind_entries(
        &mut self,
        nodes: &[AttributeNode],
        entries: &[(String, ConfigValue)],
        path: &FieldPath,
    ) -> BoundObject {
        self.check_keys(nodes, entries, path);

        let mut object = BoundObject::new();
        for node in nodes {
            let raw = entries
                .iter()
                .find(|(key, _)| *key == node.name)
                .map(|(_, value)| value)
                .filter(|value| !value.is_null());
            let field = self.bind_node(node, raw, &path.child(&node.name));
            object.insert(node.name.clone(), field);
        }
        object
    }

    /// Report duplicate and unknown keys of an object
    fn check_keys(
        &mut self,
        nodes: &[AttributeNode],
        entries: &[(String, ConfigValue)],
        path: &FieldPath,
    ) {
        let mut seen = HashSet::new();
        for (key, _) in entries {
            if !seen.insert(key.as_str()) {
                self.type_mismatch(
                    path,
                    AttributeKind::Object,
                    &format!("map with duplicate key '{}'", key),
                );
                continue;
            }
            if nodes.iter().all(|n| n.name != *key) {
                let detail = match suggest_attribute(key, nodes) {
                    Some(name) => format!("unknown field `{}`, did you mean `{}`?", key, name),
                    None => format!("unknown field `{}`", key),
                };
                self.validation_failed(&path.child(key), "unknown_field", detail);
            }
        }
    }

    fn bind_node(
        &mut self,
        node: &AttributeNode,
        raw: Option<&ConfigValue>,
        path: &FieldPath,
    ) -> Field<BoundValue> {
        match (node.cardinality, raw) {
            (Cardinality::Computed, Some(_)) => {
                self.validation_failed(
                    path,
                    "computed",
                    "value is computed by the provider and cannot be set".to_string(),
                );
                Field::Absent
            }
            (Cardinality::Required, None) => {
                self.errors.push(BindingError::MissingRequiredField {
                    path: path.to_string(),
                });
                Field::Absent
            }
            (_, None) => Field::Absent,
            (_, Some(raw)) => {
                let mark = self.errors.len();
                match self.coerce(node, raw, path) {
                    Some(value) => {
                        self.run_validators(node, &value, path, mark);
                        Field::Present(value)
                    }
                    None => Field::Absent,
                }
            }
        }
    }

    /// Run validators, placing their errors ahead of any nested errors
    /// recorded since `mark` so reports stay in pre-order
    fn run_validators(
        &mut self,
        node: &AttributeNode,
        value: &BoundValue,
        path: &FieldPath,
        mark: usize,
    ) {
        let failures: Vec<BindingError> = node
            .validators
            .iter()
            .filter_map(|validator| {
                let violations = validator.check(value);
                (!violations.is_empty()).then(|| BindingError::ValidationFailed {
                    path: path.to_string(),
                    validator: validator.name().to_string(),
                    detail: violations.join("; "),
                })
            })
            .collect();

        self.errors.splice(mark..mark, failures);
    }

    fn coerce(
        &mut self,
        node: &AttributeNode,
        raw: &ConfigValue,
        path: &FieldPath,
    ) -> Option<BoundValue> {
        match (node.kind, raw) {
            (AttributeKind::String, ConfigValue::String(s)) => Some(BoundValue::String(s.clone())),
            (AttributeKind::Int, ConfigValue::Int(i)) => Some(BoundValue::Int(*i)),
            (AttributeKind::Int, ConfigValue::Float(f)) if exact_i64(*f).is_some() => {
                exact_i64(*f).map(BoundValue::Int)
            }
            (AttributeKind::Bool, ConfigValue::Bool(b)) => Some(BoundValue::Bool(*b)),
            (AttributeKind::IntOrString, raw) => match IntOrString::try_from(raw) {
                Ok(value) => Some(BoundValue::IntOrString(value)),
                Err(mismatch) => {
                    self.shape_mismatch(path, mismatch);
                    None
                }
            },
            (AttributeKind::StringMap, ConfigValue::Map(entries)) => {
                self.coerce_string_map(entries, path).map(BoundValue::StringMap)
            }
            (AttributeKind::StringList, ConfigValue::List(items)) => {
                self.coerce_string_list(items, path).map(BoundValue::StringList)
            }
            (AttributeKind::Object, ConfigValue::Map(entries)) => Some(BoundValue::Object(
                self.bind_entries(&node.children, entries, path),
            )),
            (AttributeKind::ObjectList, ConfigValue::List(items)) => {
                let mut objects = Vec::with_capacity(items.len());
                let mut complete = true;
                for (i, item) in items.iter().enumerate() {
                    let item_path = path.index(i);
                    match item {
                        ConfigValue::Map(entries) => {
                            objects.push(self.bind_entries(&node.children, entries, &item_path))
                        }
                        other => {
                            self.type_mismatch(&item_path, AttributeKind::Object, other.shape());
                            complete = false;
                        }
                    }
                }
                complete.then_some(BoundValue::ObjectList(objects))
            }
            (expected, other) => {
                self.type_mismatch(path, expected, other.shape());
                None
            }
        }
    }

    fn coerce_string_map(
        &mut self,
        entries: &[(String, ConfigValue)],
        path: &FieldPath,
    ) -> Option<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        let mut complete = true;
        for (key, value) in entries {
            if map.contains_key(key) {
                self.type_mismatch(
                    path,
                    AttributeKind::StringMap,
                    &format!("map with duplicate key '{}'", key),
                );
                complete = false;
                continue;
            }
            match value {
                ConfigValue::String(s) => {
                    map.insert(key.clone(), s.clone());
                }
                other => {
                    self.type_mismatch(&path.key(key), AttributeKind::String, other.shape());
                    complete = false;
                }
            }
        }
        complete.then_some(map)
    }

    fn coerce_string_list(
        &mut self,
        items: &[ConfigValue],
        path: &FieldPath,
    ) -> Option<Vec<String>> {
        let mut list = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            match item {
                ConfigValue::String(s) => list.push(s.clone()),
                other => {
                    self.type_mismatch(&path.index(i), AttributeKind::String, other.shape());
                    complete = false;
                }
            }
        }
        complete.then_some(list)
    }
}

/// Closest attribute name for an unknown key
///
/// A key equal to an attribute's wire name (`subscriptionID`) points at the
/// attribute it belongs to.
fn suggest_attribute<'a>(key: &str, nodes: &'a [AttributeNode]) -> Option<&'a str> {
    if let Some(node) = nodes.iter().find(|n| n.wire_name == key) {
        return Some(node.name.as_str());
    }

    nodes
        .iter()
        .map(|n| (strsim::levenshtein(key, &n.name), n.name.as_str()))
        .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}

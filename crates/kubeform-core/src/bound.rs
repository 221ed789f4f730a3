//! Strongly-typed model produced by binding configuration against a schema

use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::quantity::IntOrString;
use crate::schema::AttributeKind;

/// Presence of an attribute value
///
/// Distinguishes "not set" from a present-but-empty value such as `""`,
/// `0` or `[]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Field<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Absent => None,
            Self::Present(v) => Some(v),
        }
    }
}

/// A concrete value for one attribute
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    String(String),
    Int(i64),
    Bool(bool),
    IntOrString(IntOrString),
    StringMap(BTreeMap<String, String>),
    StringList(Vec<String>),
    Object(BoundObject),
    ObjectList(Vec<BoundObject>),
}

impl BoundValue {
    /// The attribute kind this value satisfies
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::String(_) => AttributeKind::String,
            Self::Int(_) => AttributeKind::Int,
            Self::Bool(_) => AttributeKind::Bool,
            Self::IntOrString(_) => AttributeKind::IntOrString,
            Self::StringMap(_) => AttributeKind::StringMap,
            Self::StringList(_) => AttributeKind::StringList,
            Self::Object(_) => AttributeKind::Object,
            Self::ObjectList(_) => AttributeKind::ObjectList,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BoundObject> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<&str> for BoundValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Attribute values of one object, in schema-declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundObject {
    fields: IndexMap<String, Field<BoundValue>>,
}

impl BoundObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the field for an attribute, replacing any previous entry
    pub fn insert(&mut self, name: impl Into<String>, field: Field<BoundValue>) {
        self.fields.insert(name.into(), field);
    }

    /// Mark an attribute as present with the given value
    pub fn set(&mut self, name: impl Into<String>, value: BoundValue) {
        self.insert(name, Field::Present(value));
    }

    pub fn field(&self, name: &str) -> Option<&Field<BoundValue>> {
        self.fields.get(name)
    }

    /// Present value of an attribute, if any
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.fields.get(name).and_then(Field::present)
    }

    /// Follow a dotted path through nested objects (`metadata.name`)
    pub fn lookup(&self, path: &str) -> Option<&BoundValue> {
        let mut parts = path.split('.');
        let mut current = self.value(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.value(part)?;
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field<BoundValue>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

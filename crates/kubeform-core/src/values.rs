//! Configuration value tree with deep merge support
//!
//! `ConfigValue` is the already-decoded input handed to the binder. Maps keep
//! their entries as an ordered list of pairs so that a duplicated key in the
//! source stays visible to the binder instead of being silently collapsed.

use serde::de::{
    self, Deserialize, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor,
};
use std::fmt;
use std::path::Path;

use crate::error::{CoreError, Result};

/// A dynamically-typed configuration value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    /// Unset; treated the same as an omitted key
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(Vec<(String, ConfigValue)>),
}

impl ConfigValue {
    /// Create an empty map
    pub fn map() -> Self {
        Self::Map(Vec::new())
    }

    /// Build a map from key/value pairs, keeping their order
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        Self::Map(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Load a value tree from a YAML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse a value tree from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::Null);
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a value tree from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Short name of this value's shape, used in type mismatch reports
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, ConfigValue)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key in a map (first occurrence wins)
    pub fn get_key(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Get a value by dotted path (e.g., "spec.engine")
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(self, &parts)
    }

    /// Set a value by dotted path, creating intermediate maps
    pub fn set(&mut self, path: &str, value: ConfigValue) {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(self, &parts, value);
    }

    /// Deep merge another value into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Maps: recursive merge
    /// - Lists: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &ConfigValue) {
        deep_merge(self, overlay);
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        Self::List(items)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

/// Builds the tree straight from the parser so repeated map keys survive
struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Self::Value, D::Error> {
        ConfigValue::deserialize(d)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        Ok(i64::try_from(v)
            .map(ConfigValue::Int)
            .unwrap_or(ConfigValue::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Self::Value, E> {
        Ok(ConfigValue::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<ConfigValue, ConfigValue>()? {
            entries.push((map_key(key).map_err(de::Error::custom)?, value));
        }
        Ok(ConfigValue::Map(entries))
    }

    /// YAML tags (`!Ref value`) are dropped in favour of the tagged value
    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> std::result::Result<Self::Value, A::Error> {
        let (_tag, variant) = data.variant::<String>()?;
        variant.newtype_variant()
    }
}

/// Map keys must be scalars; numbers and booleans are used by their text
fn map_key(key: ConfigValue) -> std::result::Result<String, String> {
    match key {
        ConfigValue::String(s) => Ok(s),
        ConfigValue::Int(i) => Ok(i.to_string()),
        ConfigValue::Float(f) => Ok(f.to_string()),
        ConfigValue::Bool(b) => Ok(b.to_string()),
        other => Err(format!("map keys must be scalars, found {}", other.shape())),
    }
}

/// Deep merge two values
fn deep_merge(base: &mut ConfigValue, overlay: &ConfigValue) {
    match (base, overlay) {
        (ConfigValue::Map(base_entries), ConfigValue::Map(overlay_entries)) => {
            for (key, overlay_value) in overlay_entries {
                match base_entries.iter_mut().find(|(k, _)| k == key) {
                    Some((_, base_value)) => deep_merge(base_value, overlay_value),
                    None => base_entries.push((key.clone(), overlay_value.clone())),
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Set a nested value by path
fn set_nested(value: &mut ConfigValue, path: &[&str], new_value: ConfigValue) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !matches!(value, ConfigValue::Map(_)) {
        *value = ConfigValue::map();
    }
    let ConfigValue::Map(entries) = value else {
        return;
    };

    let index = match entries.iter().position(|(k, _)| k == key) {
        Some(index) => index,
        None => {
            entries.push((key.to_string(), ConfigValue::Null));
            entries.len() - 1
        }
    };
    set_nested(&mut entries[index].1, remaining, new_value);
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a ConfigValue, path: &[&str]) -> Option<&'a ConfigValue> {
    match path.split_first() {
        None => Some(value),
        Some((key, remaining)) => value.get_key(key).and_then(|v| get_nested(v, remaining)),
    }
}

/// Parse --set arguments (key=value format)
pub fn parse_set_values(set_args: &[String]) -> Result<ConfigValue> {
    let mut values = ConfigValue::map();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| {
            CoreError::invalid_config(format!(
                "Invalid --set format: '{}'. Expected key=value",
                arg
            ))
        })?;

        // Try to parse as JSON, fallback to string
        let value = if val == "true" {
            ConfigValue::Bool(true)
        } else if val == "false" {
            ConfigValue::Bool(false)
        } else if val == "null" {
            ConfigValue::Null
        } else if let Ok(num) = val.parse::<i64>() {
            ConfigValue::Int(num)
        } else if let Ok(num) = val.parse::<f64>() {
            ConfigValue::Float(num)
        } else if val.starts_with('[') || val.starts_with('{') {
            serde_json::from_str::<ConfigValue>(val)
                .unwrap_or_else(|_| ConfigValue::String(val.to_string()))
        } else {
            ConfigValue::String(val.to_string())
        };

        values.set(key, value);
    }

    Ok(values)
}

//! Named validators attached to schema attributes
//!
//! Each validator looks at a bound value and returns zero or more violation
//! messages. Validators ignore value kinds they do not apply to, so a
//! `length` bound can sit on strings, lists and maps alike.

use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::bound::BoundValue;
use crate::error::{CoreError, Result};

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;
const TOTAL_ANNOTATION_SIZE_LIMIT: usize = 256 * 1024;

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
        .expect("subdomain pattern is valid")
});

static DNS1123_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("label pattern is valid")
});

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").expect("name pattern is valid")
});

/// A validator as written in a kind declaration
///
/// Simple validators are plain strings (`name`, `dnsLabel`, `labels`,
/// `annotations`, `base64`, `quantity`); parameterised ones are single-key
/// maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidatorDecl {
    Simple(String),
    Regex {
        regex: String,
    },
    OneOf {
        #[serde(rename = "oneOf")]
        one_of: Vec<String>,
    },
    Length {
        length: LengthBounds,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LengthBounds {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

impl ValidatorDecl {
    /// Resolve the declaration into a ready-to-run validator
    pub fn compile(&self) -> Result<Validator> {
        match self {
            Self::Simple(name) => match name.as_str() {
                "name" => Ok(Validator::Name),
                "dnsLabel" => Ok(Validator::DnsLabel),
                "labels" => Ok(Validator::Labels),
                "annotations" => Ok(Validator::Annotations),
                "base64" => Ok(Validator::Base64),
                "quantity" => Ok(Validator::Quantity),
                other => Err(CoreError::invalid_schema(format!(
                    "unknown validator '{}'",
                    other
                ))),
            },
            Self::Regex { regex } => Validator::regex(regex),
            Self::OneOf { one_of } => {
                if one_of.is_empty() {
                    return Err(CoreError::invalid_schema(
                        "oneOf validator needs at least one value",
                    ));
                }
                Ok(Validator::OneOf(one_of.clone()))
            }
            Self::Length { length } => match (length.min, length.max) {
                (None, None) => Err(CoreError::invalid_schema(
                    "length validator needs min or max",
                )),
                (Some(min), Some(max)) if min > max => Err(CoreError::invalid_schema(format!(
                    "length validator has min {} greater than max {}",
                    min, max
                ))),
                (min, max) => Ok(Validator::Length { min, max }),
            },
        }
    }
}

/// A compiled validator
#[derive(Debug, Clone)]
pub enum Validator {
    /// DNS-1123 subdomain (object names)
    Name,
    /// DNS-1123 label (namespaces)
    DnsLabel,
    /// Label keys and values
    Labels,
    /// Annotation keys and total size
    Annotations,
    /// Standard base64 alphabet with padding
    Base64,
    /// Full match against a regular expression
    Regex { pattern: String, anchored: Regex },
    /// Kubernetes resource quantity
    Quantity,
    /// Enumeration membership
    OneOf(Vec<String>),
    /// Bounds on string length or collection size
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl Validator {
    pub fn regex(pattern: &str) -> Result<Self> {
        let anchored = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
            CoreError::invalid_schema(format!("invalid regex '{}': {}", pattern, e))
        })?;
        Ok(Self::Regex {
            pattern: pattern.to_string(),
            anchored,
        })
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length { min, max }
    }

    /// Name reported in `ValidationFailed` errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DnsLabel => "dns_label",
            Self::Labels => "labels",
            Self::Annotations => "annotations",
            Self::Base64 => "base64",
            Self::Regex { .. } => "regex",
            Self::Quantity => "quantity",
            Self::OneOf(_) => "one_of",
            Self::Length { .. } => "length",
        }
    }

    /// Check a bound value, returning every violation found
    pub fn check(&self, value: &BoundValue) -> Vec<String> {
        match self {
            Self::Name => for_each_text(value, validate_subdomain),
            Self::DnsLabel => for_each_text(value, validate_dns_label),
            Self::Labels => match value {
                BoundValue::StringMap(map) => validate_labels(map),
                _ => Vec::new(),
            },
            Self::Annotations => match value {
                BoundValue::StringMap(map) => validate_annotations(map),
                _ => Vec::new(),
            },
            Self::Base64 => for_each_text(value, |text| {
                match base64::engine::general_purpose::STANDARD.decode(text) {
                    Ok(_) => Vec::new(),
                    Err(e) => vec![format!("'{}' is not valid base64: {}", text, e)],
                }
            }),
            Self::Regex { pattern, anchored } => for_each_text(value, |text| {
                if anchored.is_match(text) {
                    Vec::new()
                } else {
                    vec![format!("'{}' does not match pattern '{}'", text, pattern)]
                }
            }),
            Self::Quantity => match value {
                BoundValue::IntOrString(v) if v.is_int() => Vec::new(),
                // resource lists such as `{cpu: 500m, memory: 1Gi}`
                BoundValue::StringMap(map) => {
                    map.values().flat_map(|v| check_quantity(v)).collect()
                }
                _ => for_each_text(value, check_quantity),
            },
            Self::OneOf(allowed) => for_each_text(value, |text| {
                if allowed.iter().any(|a| a == text) {
                    Vec::new()
                } else {
                    vec![format!(
                        "unsupported value '{}', expected one of: {}",
                        text,
                        allowed.join(", ")
                    )]
                }
            }),
            Self::Length { min, max } => {
                let (len, unit) = match value {
                    BoundValue::String(s) => (s.chars().count(), "characters"),
                    BoundValue::StringList(items) => (items.len(), "items"),
                    BoundValue::ObjectList(items) => (items.len(), "items"),
                    BoundValue::StringMap(map) => (map.len(), "entries"),
                    _ => return Vec::new(),
                };
                check_length(len, *min, *max, unit)
            }
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regex { pattern, .. } => write!(f, "regex({})", pattern),
            Self::OneOf(values) => write!(f, "one_of({})", values.join("|")),
            Self::Length { min, max } => {
                let bound = |b: &Option<usize>| b.map(|v| v.to_string()).unwrap_or_default();
                write!(f, "length({}..{})", bound(min), bound(max))
            }
            other => f.write_str(other.name()),
        }
    }
}

/// Apply a text check to strings, int-or-string text and list elements
fn for_each_text<F>(value: &BoundValue, check: F) -> Vec<String>
where
    F: Fn(&str) -> Vec<String>,
{
    match value {
        BoundValue::String(s) => check(s),
        BoundValue::IntOrString(v) => check(&v.canonical()),
        BoundValue::StringList(items) => items.iter().flat_map(|s| check(s)).collect(),
        _ => Vec::new(),
    }
}

fn check_quantity(text: &str) -> Vec<String> {
    if crate::quantity::is_quantity(text) {
        Vec::new()
    } else {
        vec![format!(
            "'{}' is not a valid quantity (expected e.g. 500m, 2Gi, 1e3)",
            text
        )]
    }
}

fn check_length(len: usize, min: Option<usize>, max: Option<usize>, unit: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if let Some(min) = min {
        if len < min {
            violations.push(format!("must have at least {} {}, has {}", min, unit, len));
        }
    }
    if let Some(max) = max {
        if len > max {
            violations.push(format!("must have at most {} {}, has {}", max, unit, len));
        }
    }
    violations
}

fn validate_subdomain(value: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        violations.push(format!(
            "'{}' must be no more than {} characters",
            value, DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        violations.push(format!(
            "'{}' must consist of lower case alphanumeric characters, '-' or '.', \
             and must start and end with an alphanumeric character",
            value
        ));
    }
    violations
}

fn validate_dns_label(value: &str) -> Vec<String> {
    let mut violations = Vec::new();
    if value.len() > DNS1123_LABEL_MAX_LENGTH {
        violations.push(format!(
            "'{}' must be no more than {} characters",
            value, DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !DNS1123_LABEL.is_match(value) {
        violations.push(format!(
            "'{}' must consist of lower case alphanumeric characters or '-', \
             and must start and end with an alphanumeric character",
            value
        ));
    }
    violations
}

/// Keys of the form `[prefix/]name`, where prefix is a DNS subdomain
fn validate_qualified_name(key: &str) -> Vec<String> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    let mut violations = Vec::new();
    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            violations.push(format!("key '{}': prefix part must be non-empty", key));
        } else if prefix.len() > DNS1123_SUBDOMAIN_MAX_LENGTH
            || !DNS1123_SUBDOMAIN.is_match(prefix)
        {
            violations.push(format!(
                "key '{}': prefix part must be a lowercase DNS subdomain",
                key
            ));
        }
    }

    if name.is_empty() {
        violations.push(format!("key '{}': name part must be non-empty", key));
    } else {
        if name.len() > QUALIFIED_NAME_MAX_LENGTH {
            violations.push(format!(
                "key '{}': name part must be no more than {} characters",
                key, QUALIFIED_NAME_MAX_LENGTH
            ));
        }
        if name.contains('/') || !QUALIFIED_NAME.is_match(name) {
            violations.push(format!(
                "key '{}': name part must consist of alphanumeric characters, '-', '_' or '.', \
                 and must start and end with an alphanumeric character",
                key
            ));
        }
    }
    violations
}

fn validate_labels(labels: &BTreeMap<String, String>) -> Vec<String> {
    let mut violations = Vec::new();
    for (key, value) in labels {
        violations.extend(validate_qualified_name(key));
        if value.len() > LABEL_VALUE_MAX_LENGTH {
            violations.push(format!(
                "label '{}': value must be no more than {} characters",
                key, LABEL_VALUE_MAX_LENGTH
            ));
        }
        if !value.is_empty() && !QUALIFIED_NAME.is_match(value) {
            violations.push(format!(
                "label '{}': value '{}' must consist of alphanumeric characters, '-', '_' or '.', \
                 and must start and end with an alphanumeric character",
                key, value
            ));
        }
    }
    violations
}

fn validate_annotations(annotations: &BTreeMap<String, String>) -> Vec<String> {
    let mut violations = Vec::new();
    let mut total = 0;
    for (key, value) in annotations {
        violations.extend(validate_qualified_name(&key.to_lowercase()));
        total += key.len() + value.len();
    }
    if total > TOTAL_ANNOTATION_SIZE_LIMIT {
        violations.push(format!(
            "annotations size {} must have at most {} bytes",
            total, TOTAL_ANNOTATION_SIZE_LIMIT
        ));
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::IntOrString;

    fn string_map(pairs: &[(&str, &str)]) -> BoundValue {
        BoundValue::StringMap(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_name_validator() {
        let v = Validator::Name;
        assert!(v.check(&BoundValue::String("my-app.v1".into())).is_empty());
        assert_eq!(v.check(&BoundValue::String("My_App".into())).len(), 1);
        assert_eq!(v.check(&BoundValue::String("a".repeat(254))).len(), 1);
    }

    #[test]
    fn test_dns_label_validator() {
        let v = Validator::DnsLabel;
        assert!(v.check(&BoundValue::String("team-a".into())).is_empty());
        assert!(v.check(&BoundValue::String("a".repeat(63))).is_empty());
        assert_eq!(v.check(&BoundValue::String("team.a".into())).len(), 1);
        assert_eq!(v.check(&BoundValue::String("a".repeat(64))).len(), 1);
        assert_eq!(v.name(), "dns_label");
    }

    #[test]
    fn test_labels_validator() {
        let v = Validator::Labels;
        assert!(v
            .check(&string_map(&[
                ("app.kubernetes.io/name", "redis"),
                ("tier", ""),
            ]))
            .is_empty());

        let violations = v.check(&string_map(&[("bad key", "ok"), ("app", "-bad")]));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_annotations_validator_allows_free_values() {
        let v = Validator::Annotations;
        assert!(v
            .check(&string_map(&[("example.com/config", "{\"a\": 1} with spaces")]))
            .is_empty());
        assert_eq!(v.check(&string_map(&[("/nope", "x")])).len(), 1);
    }

    #[test]
    fn test_base64_validator() {
        let v = Validator::Base64;
        assert!(v.check(&BoundValue::String("aGVsbG8=".into())).is_empty());
        assert_eq!(v.check(&BoundValue::String("not base64!".into())).len(), 1);
    }

    #[test]
    fn test_regex_validator_requires_full_match() {
        let v = Validator::regex("[a-z]+").unwrap();
        assert!(v.check(&BoundValue::String("abc".into())).is_empty());
        assert_eq!(v.check(&BoundValue::String("abc1".into())).len(), 1);
        assert!(Validator::regex("(").is_err());
    }

    #[test]
    fn test_quantity_validator() {
        let v = Validator::Quantity;
        assert!(v
            .check(&BoundValue::IntOrString(IntOrString::from(3)))
            .is_empty());
        assert!(v
            .check(&BoundValue::IntOrString(IntOrString::from("250m")))
            .is_empty());
        assert_eq!(
            v.check(&BoundValue::IntOrString(IntOrString::from("lots")))
                .len(),
            1
        );
    }

    #[test]
    fn test_one_of_and_length() {
        let v = Validator::one_of(["Redis", "Memcached"]);
        assert!(v.check(&BoundValue::String("Redis".into())).is_empty());
        assert_eq!(v.check(&BoundValue::String("redis".into())).len(), 1);

        let len = Validator::length(Some(1), Some(2));
        assert!(len
            .check(&BoundValue::StringList(vec!["a".into()]))
            .is_empty());
        assert_eq!(len.check(&BoundValue::StringList(vec![])).len(), 1);
        assert_eq!(len.check(&BoundValue::String("abc".into())).len(), 1);
    }

    #[test]
    fn test_decl_compile() {
        let decls: Vec<ValidatorDecl> = serde_yaml::from_str(
            r#"
- name
- dnsLabel
- quantity
- regex: "^[a-z]+$"
- oneOf: [a, b]
- length: { max: 10 }
"#,
        )
        .unwrap();

        let names: Vec<&str> = decls
            .iter()
            .map(|d| d.compile().unwrap().name())
            .collect();
        assert_eq!(names, vec!["name", "dns_label", "quantity", "regex", "one_of", "length"]);

        assert!(ValidatorDecl::Simple("nope".into()).compile().is_err());
        assert!(ValidatorDecl::Length {
            length: LengthBounds {
                min: Some(3),
                max: Some(1)
            }
        }
        .compile()
        .is_err());
    }
}

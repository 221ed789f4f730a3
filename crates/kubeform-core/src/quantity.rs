//! The int-or-string scalar used by Kubernetes quantity-like fields
//!
//! Ports, resource quantities and percentages can be written either as a
//! number (`8080`) or as text (`"http"`, `"100Mi"`, `"25%"`). The value keeps
//! track of which form it was given so it renders back exactly as supplied.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ShapeMismatch;
use crate::schema::AttributeKind;
use crate::values::ConfigValue;

/// Kubernetes resource quantity grammar: a signed decimal number followed by
/// an optional binary suffix, decimal suffix or exponent
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+|Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E)?$",
    )
    .expect("quantity pattern is valid")
});

/// Check whether `text` is a valid Kubernetes resource quantity
pub fn is_quantity(text: &str) -> bool {
    QUANTITY.is_match(text)
}

/// A value supplied either as an integer or as a string
///
/// Equality and hashing use the canonical string form, so `8080` and
/// `"8080"` compare equal while still rendering differently.
#[derive(Debug, Clone)]
pub enum IntOrString {
    Int(i64),
    Str(String),
}

impl IntOrString {
    /// Canonical textual form
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Str(s) => Cow::Borrowed(s),
        }
    }

    /// Integer form, when the canonical text is a plain integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(s) => s.parse().ok(),
        }
    }

    /// Whether the value was supplied in integer form
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Whether the canonical text is a valid resource quantity
    pub fn is_quantity(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Str(s) => is_quantity(s),
        }
    }
}

impl TryFrom<&ConfigValue> for IntOrString {
    type Error = ShapeMismatch;

    fn try_from(value: &ConfigValue) -> Result<Self, Self::Error> {
        match value {
            ConfigValue::Int(i) => Ok(Self::Int(*i)),
            ConfigValue::String(s) => Ok(Self::Str(s.clone())),
            ConfigValue::Float(f) if f.is_finite() => match exact_i64(*f) {
                Some(i) => Ok(Self::Int(i)),
                None => Ok(Self::Str(f.to_string())),
            },
            other => Err(ShapeMismatch::new(AttributeKind::IntOrString, other.shape())),
        }
    }
}

/// The integer a float holds exactly, if it is whole and within `i64` range
///
/// `i64::MAX as f64` rounds up to 2^63, which itself is out of range, so the
/// upper bound is exclusive.
pub(crate) fn exact_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

impl From<i64> for IntOrString {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for IntOrString {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for IntOrString {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for IntOrString {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl PartialEq for IntOrString {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for IntOrString {}

impl Hash for IntOrString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for IntOrString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for IntOrString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IntOrStringVisitor;

        impl Visitor<'_> for IntOrStringVisitor {
            type Value = IntOrString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(IntOrString::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                i64::try_from(v)
                    .map(IntOrString::Int)
                    .map_err(|_| E::custom(format!("integer {} out of range", v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(IntOrString::Str(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(IntOrString::Str(v))
            }
        }

        deserializer.deserialize_any(IntOrStringVisitor)
    }
}

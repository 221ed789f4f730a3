//! Kubeform Core - schema-driven model binding for Kubernetes custom resources
//!
//! This crate provides the foundational types used throughout Kubeform:
//! - `ConfigValue`: Raw configuration trees with deep merge support
//! - `AttributeSchema`: Declarative description of a resource kind's fields
//! - `bind`: Checking a configuration tree against a schema, collecting every error
//! - `BoundObject`: The typed model produced by a successful bind
//! - `IntOrString`: The int-or-string scalar used by ports and quantities

pub mod binder;
pub mod bound;
pub mod error;
pub mod quantity;
pub mod schema;
pub mod validators;
pub mod values;

pub use binder::{bind, bind_checked};
pub use bound::{BoundObject, BoundValue, Field};
pub use error::{BindingError, BindingErrors, CoreError, ShapeMismatch};
pub use quantity::{IntOrString, is_quantity};
pub use schema::{
    AttributeDecl, AttributeKind, AttributeNode, AttributeSchema, Cardinality, wire_name_for,
};
pub use validators::{LengthBounds, Validator, ValidatorDecl};
pub use values::{ConfigValue, parse_set_values};

//! Kubeform Engine - manifests and identifiers for Kubernetes custom resources
//!
//! This crate turns bound models into deployable output:
//! - A data-driven catalog of resource kinds, assembled into full schemas
//! - An explicit registry of kinds, built at startup
//! - Canonical YAML rendering in schema order, omitting absent fields
//! - Synthetic identifiers stamped from the wall clock
//! - A create/update/delete adapter tying the steps together

pub mod adapter;
pub mod catalog;
pub mod error;
pub mod identity;
pub mod registry;
pub mod serializer;

pub use adapter::{RenderedManifest, ResourceAdapter, ResourceState};
pub use catalog::{KindDefinition, ResourceKind, parse_catalog};
pub use error::{EngineError, Result};
pub use identity::{Clock, SteppingClock, SystemClock, stamp};
pub use registry::KindRegistry;
pub use serializer::render;

//! Create/update/delete lifecycle for resource instances
//!
//! Each call is an independent pipeline: bind the configuration against the
//! kind's schema, render the manifest with the kind's constant `apiVersion`
//! and `kind`, then stamp a fresh identifier. Binding errors abort the
//! pipeline before anything is rendered or stamped.

use serde::Serialize;
use std::sync::Arc;

use kubeform_core::{ConfigValue, bind_checked};

use crate::catalog::ResourceKind;
use crate::error::Result;
use crate::identity::{Clock, SystemClock};
use crate::registry::KindRegistry;
use crate::serializer;

/// What the surrounding tool stores for a resource instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    pub id: i64,
    pub api_version: String,
    pub kind: String,
    pub manifest: String,
}

/// A rendered manifest that has not been assigned an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedManifest {
    pub api_version: String,
    pub kind: String,
    pub manifest: String,
}

impl RenderedManifest {
    fn stamped(self, id: i64) -> ResourceState {
        ResourceState {
            id,
            api_version: self.api_version,
            kind: self.kind,
            manifest: self.manifest,
        }
    }
}

pub struct ResourceAdapter<C: Clock = SystemClock> {
    registry: Arc<KindRegistry>,
    clock: C,
}

impl ResourceAdapter<SystemClock> {
    pub fn new(registry: Arc<KindRegistry>) -> Self {
        Self::with_clock(registry, SystemClock)
    }
}

impl<C: Clock> ResourceAdapter<C> {
    pub fn with_clock(registry: Arc<KindRegistry>, clock: C) -> Self {
        Self { registry, clock }
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Bind and render without assigning an identifier
    pub fn plan(&self, resource: &str, raw: &ConfigValue) -> Result<RenderedManifest> {
        let kind = self.registry.get(resource)?;
        render_kind(&kind, raw)
    }

    pub fn create(&self, resource: &str, raw: &ConfigValue) -> Result<ResourceState> {
        let rendered = self.plan(resource, raw)?;
        let state = rendered.stamped(self.clock.now_nanos());
        tracing::info!(resource, id = state.id, "created resource");
        Ok(state)
    }

    /// Re-render an existing instance; the identifier always changes
    pub fn update(
        &self,
        resource: &str,
        prior: &ResourceState,
        raw: &ConfigValue,
    ) -> Result<ResourceState> {
        let rendered = self.plan(resource, raw)?;
        if rendered.api_version != prior.api_version || rendered.kind != prior.kind {
            tracing::warn!(
                resource,
                prior_api_version = %prior.api_version,
                prior_kind = %prior.kind,
                api_version = %rendered.api_version,
                kind = %rendered.kind,
                "kind constants changed since the prior state was recorded"
            );
        }
        let state = rendered.stamped(self.clock.now_nanos());
        tracing::info!(
            resource,
            prior_id = prior.id,
            id = state.id,
            changed = state.manifest != prior.manifest,
            "updated resource"
        );
        Ok(state)
    }

    /// Nothing is held per instance, so deleting only checks the kind exists
    pub fn delete(&self, resource: &str, state: &ResourceState) -> Result<()> {
        self.registry.get(resource)?;
        tracing::info!(resource, id = state.id, "deleted resource");
        Ok(())
    }
}

fn render_kind(kind: &ResourceKind, raw: &ConfigValue) -> Result<RenderedManifest> {
    tracing::debug!(resource = %kind.resource, "binding configuration");
    let model = bind_checked(kind.schema(), raw).inspect_err(|errors| {
        tracing::debug!(
            resource = %kind.resource,
            errors = errors.len(),
            "configuration rejected"
        );
    })?;

    tracing::debug!(resource = %kind.resource, "rendering manifest");
    let manifest = serializer::render(&model, kind.schema(), &kind.api_version, &kind.kind)?;

    Ok(RenderedManifest {
        api_version: kind.api_version.clone(),
        kind: kind.kind.clone(),
        manifest,
    })
}

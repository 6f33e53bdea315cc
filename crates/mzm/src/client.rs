//! 🔌 The pipeline API: where components actually get created, read, updated and deleted.
//!
//! 🎭 Two faces, one trait. [`HttpPipelineApi`] talks to Mezmo over reqwest. [`InMemoryPipelineApi`]
//! keeps components in a map and pretends to be the server, for tests and `--dry-run`.
//! [`ApiBackend`] dispatches between them so the resource layer never has to know which one
//! it is holding.
//!
//! # Contract
//! - Every method is scoped to `(pipeline_id, kind)`. The component's `type` rides inside the body.
//! - `get_component` returns `Ok(None)` when the component is gone. That is not an error: the
//!   caller drops it from state.
//! - Errors are `anyhow` all the way; the resource layer turns them into diagnostics.

use anyhow::Result;
use async_trait::async_trait;

use crate::components::{Component, ComponentKind};

pub mod http_api;
pub mod in_mem;

pub use http_api::HttpPipelineApi;
pub use in_mem::InMemoryPipelineApi;

/// 📡 The four calls a component resource needs.
#[async_trait]
pub trait PipelineApi: std::fmt::Debug + Send + Sync {
    /// 🚀 Create the component and return it as the server sees it, id and all.
    async fn create_component(&self, kind: ComponentKind, component: &Component) -> Result<Component>;

    /// 🔍 Fetch a component. `Ok(None)` if it no longer exists.
    async fn get_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<Option<Component>>;

    /// 🔄 Replace the component's configuration. `component.id` must be set.
    async fn update_component(&self, kind: ComponentKind, component: &Component) -> Result<Component>;

    /// 🗑️ Delete a component. Deleting something already gone is fine.
    async fn delete_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<()>;
}

/// 🎭 The concrete API the resource layer holds.
#[derive(Debug)]
pub enum ApiBackend {
    Http(HttpPipelineApi),
    InMemory(InMemoryPipelineApi),
}

#[async_trait]
impl PipelineApi for ApiBackend {
    async fn create_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        match self {
            ApiBackend::Http(api) => api.create_component(kind, component).await,
            ApiBackend::InMemory(api) => api.create_component(kind, component).await,
        }
    }

    async fn get_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<Option<Component>> {
        match self {
            ApiBackend::Http(api) => api.get_component(kind, pipeline_id, id).await,
            ApiBackend::InMemory(api) => api.get_component(kind, pipeline_id, id).await,
        }
    }

    async fn update_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        match self {
            ApiBackend::Http(api) => api.update_component(kind, component).await,
            ApiBackend::InMemory(api) => api.update_component(kind, component).await,
        }
    }

    async fn delete_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<()> {
        match self {
            ApiBackend::Http(api) => api.delete_component(kind, pipeline_id, id).await,
            ApiBackend::InMemory(api) => api.delete_component(kind, pipeline_id, id).await,
        }
    }
}

/// 🧩 The id of a component that is about to be updated. Updating an id-less component is a bug.
pub(crate) fn require_id(component: &Component) -> Result<&str> {
    component
        .id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("💀 Cannot update a {} component that has no id", component.component_type))
}

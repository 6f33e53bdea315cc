//! 🧪 A pipeline API that lives entirely in RAM.
//!
//! It behaves like the server where it matters to the resource layer: create assigns an id
//! and starts `generation_id` at 0, every update bumps it, reads of unknown ids come back
//! `None`. It does not validate `user_config`, so anything the converters produce is accepted.
//!
//! ⚠️ Tests and `--dry-run` only. Nothing survives the process.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PipelineApi, require_id};
use crate::components::{Component, ComponentKind};

type Key = (String, ComponentKind, String);

/// 📦 Clone-able so tests can keep a handle and peek after giving one to a resource.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPipelineApi {
    components: Arc<Mutex<BTreeMap<Key, Component>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryPipelineApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 🔍 Everything stored for one pipeline, in id order.
    pub async fn components(&self, pipeline_id: &str) -> Vec<Component> {
        self.components
            .lock()
            .await
            .iter()
            .filter(|((pipeline, _, _), _)| pipeline == pipeline_id)
            .map(|(_, component)| component.clone())
            .collect()
    }
}

fn key(pipeline_id: &str, kind: ComponentKind, id: &str) -> Key {
    (pipeline_id.to_string(), kind, id.to_string())
}

#[async_trait]
impl PipelineApi for InMemoryPipelineApi {
    async fn create_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut created = component.clone();
        created.id = Some(format!("{kind}-{n}"));
        created.generation_id = Some(0);
        let id = require_id(&created)?.to_string();
        self.components
            .lock()
            .await
            .insert(key(&created.pipeline_id, kind, &id), created.clone());
        Ok(created)
    }

    async fn get_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<Option<Component>> {
        Ok(self.components.lock().await.get(&key(pipeline_id, kind, id)).cloned())
    }

    async fn update_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        let id = require_id(component)?;
        let mut components = self.components.lock().await;
        let Some(stored) = components.get_mut(&key(&component.pipeline_id, kind, id)) else {
            anyhow::bail!("💀 {kind} {id} does not exist in pipeline {}", component.pipeline_id);
        };
        let generation_id = stored.generation_id.unwrap_or(0) + 1;
        *stored = component.clone();
        stored.generation_id = Some(generation_id);
        Ok(stored.clone())
    }

    async fn delete_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<()> {
        self.components.lock().await.remove(&key(pipeline_id, kind, id));
        Ok(())
    }
}

//! 📡 The real pipeline API, over HTTP.
//!
//! Routes are `{endpoint}/v3/pipeline/{pipeline_id}/{kind}` for create and
//! `{endpoint}/v3/pipeline/{pipeline_id}/{kind}/{id}` for everything else. Every request
//! carries `Authorization: Token <auth_key>`. Response bodies wrap the component in
//! `{"data": {...}}`.
//!
//! 🔄 No retries. A failed call fails the operation, and the next plan/apply tries again.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, trace};

use super::{PipelineApi, require_id};
use crate::app_config::ApiConfig;
use crate::components::{Component, ComponentKind};

/// 📦 The `{"data": ...}` envelope every response comes in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug)]
pub struct HttpPipelineApi {
    client: reqwest::Client,
    endpoint: String,
    auth_key: String,
}

impl HttpPipelineApi {
    /// 🚀 Build the client with the configured timeouts. Nothing is sent until the first call.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("💀 Could not build the HTTP client. Usually a TLS setup problem on this machine.")?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            auth_key: config.auth_key.clone(),
        })
    }

    fn collection_url(&self, kind: ComponentKind, pipeline_id: &str) -> String {
        format!("{}/v3/pipeline/{}/{}", self.endpoint, pipeline_id, kind.path_segment())
    }

    fn item_url(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(kind, pipeline_id), id)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Token {}", self.auth_key))
    }

    /// 📥 Unwrap a component response, or bail with the status and whatever the server said.
    async fn read_component(response: Response, pipeline_id: &str, action: &str) -> Result<Component> {
        let response = Self::ensure_success(response, action).await?;
        let envelope: Envelope<Component> = response
            .json()
            .await
            .with_context(|| format!("💀 The API answered the {action} request with a body we could not parse"))?;
        let mut component = envelope.data;
        component.pipeline_id = pipeline_id.to_string();
        Ok(component)
    }

    async fn ensure_success(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
            anyhow::bail!("💀 The {action} request failed with {status}: {body}");
        }
        Ok(response)
    }
}

#[async_trait]
impl PipelineApi for HttpPipelineApi {
    async fn create_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        let url = self.collection_url(kind, &component.pipeline_id);
        debug!("📡 POST {url} ({} {kind})", component.component_type);
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(component)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach the API at {url}"))?;
        Self::read_component(response, &component.pipeline_id, "create").await
    }

    async fn get_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<Option<Component>> {
        let url = self.item_url(kind, pipeline_id, id);
        debug!("📡 GET {url}");
        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach the API at {url}"))?;
        if response.status() == StatusCode::NOT_FOUND {
            trace!("🕳️ {kind} {id} is gone");
            return Ok(None);
        }
        Self::read_component(response, pipeline_id, "read").await.map(Some)
    }

    async fn update_component(&self, kind: ComponentKind, component: &Component) -> Result<Component> {
        let id = require_id(component)?;
        let url = self.item_url(kind, &component.pipeline_id, id);
        debug!("📡 PUT {url}");
        let response = self
            .request(reqwest::Method::PUT, &url)
            .json(component)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach the API at {url}"))?;
        Self::read_component(response, &component.pipeline_id, "update").await
    }

    async fn delete_component(&self, kind: ComponentKind, pipeline_id: &str, id: &str) -> Result<()> {
        let url = self.item_url(kind, pipeline_id, id);
        debug!("📡 DELETE {url}");
        let response = self
            .request(reqwest::Method::DELETE, &url)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach the API at {url}"))?;
        if response.status() == StatusCode::NOT_FOUND {
            trace!("🕳️ {kind} {id} was already gone");
            return Ok(());
        }
        Self::ensure_success(response, "delete").await?;
        Ok(())
    }
}

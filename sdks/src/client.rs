// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use gotag_core::domain::agent::{AgentId, AgentRecord};
use gotag_core::domain::bailiff::{BailiffError, BailiffInterface};
use gotag_core::domain::entry::ArgValue;
use gotag_core::domain::host::HostIdentity;
use gotag_core::presentation::api::{MigrationRequest, PropertyValue, SetPropertyRequest};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default bound on every remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid bailiff url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Client for a Bailiff served over HTTP.
///
/// Transport failures, timeouts and unexpected responses all surface as
/// [`BailiffError::RemoteUnavailable`]. Typed errors returned by the remote
/// Bailiff are passed through unchanged.
#[derive(Debug, Clone)]
pub struct HttpBailiffClient {
    base_url: Url,
    client: Client,
}

impl HttpBailiffClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", base_url.scheme()),
            });
        }
        // Keep any path prefix when joining route paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Route URL under the base, one percent-encoded path segment per part.
    fn url(&self, segments: &[&str]) -> Result<Url, BailiffError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BailiffError::unavailable(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, BailiffError> {
        let response = request.send().await.map_err(|e| {
            debug!(endpoint = %self.base_url, error = %e, "request failed");
            BailiffError::unavailable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        match serde_json::from_slice::<BailiffError>(&body) {
            Ok(remote) => Err(remote),
            Err(_) => Err(BailiffError::unavailable(format!(
                "{} answered {}",
                self.base_url, status
            ))),
        }
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BailiffError> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| BailiffError::unavailable(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl BailiffInterface for HttpBailiffClient {
    fn endpoint(&self) -> String {
        self.base_url.to_string()
    }

    async fn ping(&self) -> Result<HostIdentity, BailiffError> {
        self.json(self.client.get(self.url(&["ping"])?)).await
    }

    async fn get_property(&self, key: &str) -> Result<Option<String>, BailiffError> {
        let url = self.url(&["properties", key])?;
        let property: PropertyValue = self.json(self.client.get(url)).await?;
        Ok(property.value)
    }

    async fn set_property(&self, key: &str, value: &str) -> Result<(), BailiffError> {
        let url = self.url(&["properties", key])?;
        let body = SetPropertyRequest {
            value: value.to_string(),
        };
        self.send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn migrate(
        &self,
        agent: AgentRecord,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<(), BailiffError> {
        let body = MigrationRequest {
            agent,
            entry: entry.to_string(),
            args,
        };
        let response = self.send(self.client.post(self.url(&["migrate"])?).json(&body)).await?;
        if response.status() != StatusCode::ACCEPTED {
            debug!(status = %response.status(), "migration answered without 202");
        }
        Ok(())
    }

    async fn list_agents(&self) -> Result<Vec<AgentId>, BailiffError> {
        self.json(self.client.get(self.url(&["agents"])?)).await
    }

    async fn is_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        let url = self.url(&["agents", &agent_id.to_string(), "it"])?;
        self.json(self.client.get(url)).await
    }

    async fn agent_has_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        let url = self.url(&["agents", &agent_id.to_string(), "it"])?;
        self.json(self.client.post(url)).await
    }
}

//! proxy::upstream
//!
//! Raw JSON forwarding to the backend service.
//!
//! # Design
//!
//! The proxy relays bodies without interpreting them, so this client works
//! with `serde_json::Value` instead of the typed [`crate::api`] surface. It
//! classifies failures into the three kinds the proxy cares about:
//!
//! - [`UpstreamError::Transport`] - the backend could not be reached
//! - [`UpstreamError::Status`] - the backend answered with a non-success status
//! - [`UpstreamError::Parse`] - the backend body was not JSON
//!
//! All three are collapsed into the same generic response by the routes.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde_json::Value;
use thiserror::Error;

use crate::api::http::{build_client, endpoint, parse_base};

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend returned invalid JSON: {0}")]
    Parse(String),

    #[error("invalid backend configuration: {0}")]
    Config(String),
}

/// Forwarding client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    base_url: Url,
}

impl Upstream {
    /// Create a forwarding client.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Config` if the base URL is invalid.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, UpstreamError> {
        let client = build_client(timeout).map_err(|e| UpstreamError::Config(e.to_string()))?;
        let base_url = parse_base(base_url).map_err(|e| UpstreamError::Config(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the backend URL for a path, attaching the raw query unchanged.
    pub fn url(&self, segments: &[&str], raw_query: Option<&str>) -> Url {
        let mut url = endpoint(&self.base_url, segments);
        url.set_query(raw_query.filter(|q| !q.is_empty()));
        url
    }

    /// `GET` a JSON resource.
    pub async fn get_json(
        &self,
        segments: &[&str],
        raw_query: Option<&str>,
    ) -> Result<Value, UpstreamError> {
        let url = self.url(segments, raw_query);
        tracing::debug!(%url, "forwarding GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Self::read_json(response).await
    }

    /// `POST` a JSON body.
    pub async fn post_json(&self, segments: &[&str], body: &Value) -> Result<Value, UpstreamError> {
        let url = self.url(segments, None);
        tracing::debug!(%url, "forwarding POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn read_json(response: Response) -> Result<Value, UpstreamError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Parse(e.to_string()))
    }
}

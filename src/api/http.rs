//! api::http
//!
//! HTTP implementation of [`ChangelogApi`] using reqwest.
//!
//! # Design
//!
//! `HttpApi` targets any server exposing the `/api/...` surface: the
//! backend service directly, or this crate's proxy. Paths are built from
//! segments so the job id is percent-encoded as a single segment and a base
//! URL with a path prefix keeps its prefix.
//!
//! No retries and, unless configured, no timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::traits::{ApiError, ChangelogApi};
use crate::core::types::{
    ChangelogPage, ChangelogQuery, ChangelogRequest, CommitPage, CommitQuery, JobAccepted, JobId,
    JobStatus,
};

/// User-Agent header value for outbound requests.
pub const USER_AGENT_VALUE: &str = concat!("changelog-portal/", env!("CARGO_PKG_VERSION"));

/// Error body shape used by the proxy and, usually, the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the changelog API.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
}

impl HttpApi {
    /// Create a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the URL does not parse or the
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_client(timeout)?, parse_base(base_url)?))
    }

    /// Create a client sharing an existing reqwest `Client`.
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Handle a response, decoding the body on success.
    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ApiError::Decode(e.to_string()))
        } else {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = endpoint(&self.base_url, segments);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::handle_response(response).await
    }
}

/// Build a reqwest client with the crate's User-Agent and optional timeout.
pub fn build_client(timeout: Option<Duration>) -> Result<Client, ApiError> {
    let mut builder = Client::builder().user_agent(USER_AGENT_VALUE);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

/// Parse a base URL.
pub fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::InvalidRequest(format!("invalid base URL '{}': {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidRequest(format!(
            "'{}' cannot be used as a base URL",
            base_url
        )));
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one.
///
/// Query and fragment of the base are dropped.
pub fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

#[async_trait]
impl ChangelogApi for HttpApi {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn list_commits(&self, query: &CommitQuery) -> Result<CommitPage, ApiError> {
        self.get(&["api", "commits"], &query.to_params()).await
    }

    async fn list_changelogs(&self, query: &ChangelogQuery) -> Result<ChangelogPage, ApiError> {
        self.get(&["api", "changelogs"], &query.to_params()).await
    }

    async fn submit_changelog(&self, request: &ChangelogRequest) -> Result<JobId, ApiError> {
        let url = endpoint(&self.base_url, &["api", "changelogs"]);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let accepted: JobAccepted = Self::handle_response(response).await?;
        Ok(accepted.id)
    }

    async fn changelog_status(&self, id: &JobId) -> Result<JobStatus, ApiError> {
        self.get(&["api", "changelogs", "status", id.as_str()], &[])
            .await
    }
}

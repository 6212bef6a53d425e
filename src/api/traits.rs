//! api::traits
//!
//! The `ChangelogApi` trait and its error type.
//!
//! # Design
//!
//! The trait is async because every operation is a network round trip. The
//! same four operations are exposed by the backend service and, unchanged,
//! by this crate's proxy routes, so one trait serves both targets.
//!
//! # Example
//!
//! ```ignore
//! use changelog_portal::api::{ChangelogApi, ApiError};
//! use changelog_portal::core::types::{ChangelogRequest, DateRange};
//!
//! async fn start(api: &dyn ChangelogApi, range: DateRange) -> Result<(), ApiError> {
//!     let job = api.submit_changelog(&ChangelogRequest::new(range, "", "")).await?;
//!     let status = api.changelog_status(&job).await?;
//!     println!("completed: {}", status.completed);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::{
    ChangelogPage, ChangelogQuery, ChangelogRequest, CommitPage, CommitQuery, JobId, JobStatus,
};

/// Errors from API operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the response body, if any
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request could not be built (bad base URL, etc).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Check if this error might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Decode(_) | ApiError::InvalidRequest(_) => false,
        }
    }
}

/// Client interface to the changelog service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ApiError>`. Callers decide how to surface
/// failures; the workflows record them as component-local error state.
#[async_trait]
pub trait ChangelogApi: Send + Sync {
    /// Implementation name, for logging.
    fn name(&self) -> &'static str;

    /// Fetch one page of commits in a date range.
    ///
    /// `GET /api/commits?page&pageSize&startDate&endDate`
    async fn list_commits(&self, query: &CommitQuery) -> Result<CommitPage, ApiError>;

    /// Fetch one page of persisted changelogs, newest first.
    ///
    /// `GET /api/changelogs?pageSize[&lastTimestamp]`
    async fn list_changelogs(&self, query: &ChangelogQuery) -> Result<ChangelogPage, ApiError>;

    /// Start generating a changelog.
    ///
    /// `POST /api/changelogs`
    ///
    /// # Returns
    ///
    /// The job identifier to poll with [`ChangelogApi::changelog_status`].
    async fn submit_changelog(&self, request: &ChangelogRequest) -> Result<JobId, ApiError>;

    /// Check the status of a generation job.
    ///
    /// `GET /api/changelogs/status/{id}`
    async fn changelog_status(&self, id: &JobId) -> Result<JobStatus, ApiError>;
}

//! api
//!
//! Client access to the changelog service.
//!
//! # Architecture
//!
//! The [`ChangelogApi`] trait defines the four operations the workflows
//! need. Workflows take `&dyn ChangelogApi` and never name a concrete
//! implementation.
//!
//! # Modules
//!
//! - `traits`: `ChangelogApi` trait and `ApiError`
//! - [`http`]: reqwest implementation, usable against the backend or the proxy
//! - [`mock`]: in-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use changelog_portal::api::{ChangelogApi, HttpApi};
//!
//! let api = HttpApi::new("http://localhost:3000", None)?;
//! let status = api.changelog_status(&job_id).await?;
//! ```

pub mod http;
pub mod mock;
mod traits;

pub use http::HttpApi;
pub use traits::*;

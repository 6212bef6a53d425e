//! Changelog portal - proxy server and client workflows for changelog
//! generation
//!
//! The portal sits between a changelog backend service and its two
//! audiences: developers who pick a commit range and ask for a changelog,
//! and readers who browse published changelogs.
//!
//! # Architecture
//!
//! - [`core`] - Domain types and configuration
//! - [`api`] - Async client trait for the backend API, with HTTP and mock implementations
//! - [`proxy`] - axum server forwarding `/api/...` routes to the backend
//! - [`workflow`] - Commit browser, generate-and-poll state machine, changelog viewer
//! - [`ui`] - Terminal rendering and banners
//! - [`cli`] - Command-line interface (`clp`)
//!
//! # Invariants
//!
//! 1. The backend URL is resolved once at startup and never read per request
//! 2. Proxy failures surface as `500` with a fixed message per route
//! 3. Status polling is serialized, bounded and cancellable
//! 4. Changing the commit date range resets the page to the first one

pub mod api;
pub mod cli;
pub mod core;
pub mod proxy;
pub mod ui;
pub mod workflow;

//! core
//!
//! Domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Commits, changelog entries, requests and page envelopes
//! - [`config`] - Configuration schema, loading and resolution

pub mod config;
pub mod types;

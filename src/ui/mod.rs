//! ui
//!
//! Terminal presentation.
//!
//! # Modules
//!
//! - [`output`] - Output helpers and verbosity
//! - [`banner`] - Developer and public header lines
//! - [`render`] - Text rendering of commits, generation progress and changelogs
//!
//! # Design
//!
//! Rendering is pure: functions take workflow state and return text. The
//! CLI layer decides when to print it.

pub mod banner;
pub mod output;
pub mod render;

//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Drives a workflow or the proxy server
//! 3. Formats and displays output
//!
//! # Async Commands
//!
//! Commands that touch the network are async. Each handler builds a tokio
//! runtime and blocks on its async implementation.

mod changelogs;
mod commits;
mod completion;
mod config_cmd;
mod generate;
mod serve;

// Re-export command functions for testing and direct invocation
pub use changelogs::changelogs;
pub use commits::commits;
pub use completion::completion;
pub use config_cmd::{init as config_init, path as config_path, show as config_show};
pub use generate::generate;
pub use serve::serve;

use anyhow::{Context as _, Result};
use chrono::Local;

use super::Context;
use crate::api::HttpApi;
use crate::cli::args::{Command, ConfigAction};
use crate::core::types::DateRange;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Serve { .. } => serve::serve(ctx),
        Command::Commits { start, end, page } => {
            commits::commits(ctx, start.as_deref(), end.as_deref(), page)
        }
        Command::Generate {
            start,
            end,
            version_label,
            title,
            open,
        } => generate::generate(
            ctx,
            start.as_deref(),
            end.as_deref(),
            &version_label,
            &title,
            open,
        ),
        Command::Changelogs { pages, all } => changelogs::changelogs(ctx, pages, all),
        Command::Config { action } => match action {
            ConfigAction::Show => config_cmd::show(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
            ConfigAction::Init { force } => config_cmd::init(ctx, force),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Client for the configured API base URL.
pub(crate) fn api_client(ctx: &Context) -> Result<HttpApi> {
    HttpApi::new(&ctx.settings.api_url, ctx.settings.request_timeout)
        .with_context(|| format!("Invalid API URL '{}'", ctx.settings.api_url))
}

/// Date range from optional `--start`/`--end` flags.
///
/// Missing ends default to the last seven days ending today.
pub(crate) fn date_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let default = DateRange::last_week(Local::now().date_naive());
    let start = start.map_or_else(|| default.start_param(), String::from);
    let end = end.map_or_else(|| default.end_param(), String::from);
    DateRange::parse(&start, &end).context("Invalid date range")
}

//! config command - Show or initialize configuration

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::core::config::{
    Config, PaginationConfig, PollingConfig, PortalConfig, ServerConfig, DEFAULT_API_URL,
    DEFAULT_BACKEND_URL, DEFAULT_BIND, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_PAGE_SIZE,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_VIEWER_URL,
};
use crate::ui::output;

/// Print the effective configuration as TOML.
pub fn show(ctx: &Context) -> Result<()> {
    match &ctx.config_file {
        Some(path) => output::print(format!("# Loaded from {}", path.display()), ctx.verbosity),
        None => output::print("# No config file found; using defaults", ctx.verbosity),
    }
    let rendered =
        toml::to_string_pretty(&ctx.settings).context("Failed to render configuration")?;
    output::data(rendered.trim_end());
    Ok(())
}

/// Print the config file path.
pub fn path(ctx: &Context) -> Result<()> {
    output::data(target_path(ctx)?.display());
    Ok(())
}

/// Write a config file holding the default values.
pub fn init(ctx: &Context, force: bool) -> Result<()> {
    let path = target_path(ctx)?;
    if path.exists() && !force {
        bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::write_atomic(&path, &defaults()).context("Failed to write config")?;
    output::print(format!("Wrote {}", path.display()), ctx.verbosity);
    Ok(())
}

/// Where the config lives: `--config`, else the loaded file, else the
/// home-directory default.
fn target_path(ctx: &Context) -> Result<PathBuf> {
    if let Some(path) = ctx.config_flag.as_ref().or(ctx.config_file.as_ref()) {
        return Ok(path.clone());
    }
    Config::config_path().context("Failed to locate config file")
}

fn defaults() -> PortalConfig {
    PortalConfig {
        backend_url: Some(DEFAULT_BACKEND_URL.to_string()),
        api_url: Some(DEFAULT_API_URL.to_string()),
        viewer_url: Some(DEFAULT_VIEWER_URL.to_string()),
        request_timeout_ms: None,
        server: Some(ServerConfig {
            bind: Some(DEFAULT_BIND.to_string()),
        }),
        pagination: Some(PaginationConfig {
            commits_page_size: Some(DEFAULT_PAGE_SIZE),
            changelogs_page_size: Some(DEFAULT_PAGE_SIZE),
        }),
        polling: Some(PollingConfig {
            interval_ms: Some(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: Some(DEFAULT_MAX_POLL_ATTEMPTS),
        }),
    }
}

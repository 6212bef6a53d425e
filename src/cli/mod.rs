//! cli
//!
//! Command-line interface layer for the changelog portal.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Load and resolve configuration once
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers build an API client or proxy state from
//! the resolved [`Settings`] and drive the [`crate::workflow`] types; all
//! rendering goes through [`crate::ui`].

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, ConfigOverrides, Settings, CONFIG_ENV};
use crate::ui::output::{self, Verbosity};

/// State shared by every command handler.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: Settings,
    pub verbosity: Verbosity,
    /// File the configuration was read from, if any
    pub config_file: Option<PathBuf>,
    /// Path `--config` pointed at, whether or not it exists
    pub config_flag: Option<PathBuf>,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    init_logging(verbosity);

    let flag_path = cli.config.clone();
    let loaded = Config::load_with(
        |key| match (&flag_path, key) {
            (Some(path), CONFIG_ENV) => Some(path.to_string_lossy().into_owned()),
            _ => std::env::var(key).ok(),
        },
        dirs::home_dir(),
    )
    .context("Failed to load configuration")?;

    for warning in &loaded.warnings {
        output::warn(&warning.message, verbosity);
    }

    let bind = match &cli.command {
        args::Command::Serve { bind } => bind.clone(),
        _ => None,
    };
    let overrides = ConfigOverrides {
        backend_url: cli.backend_url.clone(),
        api_url: cli.api_url.clone(),
        bind,
    };
    let settings = loaded
        .config
        .resolve(&overrides)
        .context("Invalid configuration")?;
    tracing::debug!(?settings, "resolved configuration");

    let ctx = Context {
        settings,
        verbosity,
        config_file: loaded.config.loaded_from().map(PathBuf::from),
        config_flag: cli.config,
    };

    // Dispatch to command handler
    commands::dispatch(cli.command, &ctx)
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// level picked from the flags.
fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_level()));

    // Fails only if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

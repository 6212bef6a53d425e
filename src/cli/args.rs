//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read configuration from this file
//! - `--backend-url <url>`: Backend service base URL
//! - `--api-url <url>`: Base URL the terminal workflows talk to
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Changelog portal - proxy server and terminal client for changelog generation
#[derive(Parser, Debug)]
#[command(name = "clp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend service base URL (overrides BACKEND_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Base URL for commit and changelog requests
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the API proxy server
    #[command(
        name = "serve",
        long_about = "Run the API proxy server.\n\n\
            Serves /api/commits, /api/changelogs and /api/changelogs/status/{id}, \
            forwarding each request to the backend service. Backend failures are \
            answered with 500 and a fixed message; details go to the log.",
        after_help = "\
EXAMPLES:
    # Serve on the configured address
    clp serve

    # Point at a different backend and port
    clp --backend-url http://backend:3001 serve --bind 0.0.0.0:8080

    # Verbose request logging
    RUST_LOG=changelog_portal=debug clp serve"
    )]
    Serve {
        /// Socket address to listen on
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// List commits in a date range
    #[command(
        name = "commits",
        long_about = "List commits in a date range, one page at a time.\n\n\
            Dates are YYYY-MM-DD. Without dates the last seven days are shown. \
            Pages are numbered from 1.",
        after_help = "\
EXAMPLES:
    # Last seven days
    clp commits

    # A specific week, second page
    clp commits --start 2024-03-01 --end 2024-03-08 --page 2"
    )]
    Commits {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end: Option<String>,

        /// Page to show, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },

    /// Generate a changelog for a date range
    #[command(
        name = "generate",
        long_about = "Generate a changelog for a date range.\n\n\
            Checks that the range has commits, submits a generation request and \
            polls the job until it completes, fails or runs out of attempts. \
            Ctrl-C stops polling.",
        after_help = "\
EXAMPLES:
    # Changelog for the last seven days
    clp generate

    # Versioned release notes
    clp generate --start 2024-03-01 --end 2024-03-08 --version-label v1.4.0 --title \"Spring release\"

    # Open the public viewer when done
    clp generate --open"
    )]
    Generate {
        /// First day of the range (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        end: Option<String>,

        /// Version label for the changelog
        #[arg(long, value_name = "VERSION", default_value = "")]
        version_label: String,

        /// Title for the changelog
        #[arg(long, default_value = "")]
        title: String,

        /// Open the public changelog in a browser when done
        #[arg(long)]
        open: bool,
    },

    /// Show published changelogs
    #[command(
        name = "changelogs",
        long_about = "Show published changelogs, newest first.\n\n\
            Loads the first page and then as many further pages as requested.",
        after_help = "\
EXAMPLES:
    # First page
    clp changelogs

    # First three pages
    clp changelogs --pages 3

    # Everything
    clp changelogs --all"
    )]
    Changelogs {
        /// Number of pages to load
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "all")]
        pages: u32,

        /// Load every page
        #[arg(long)]
        all: bool,
    },

    /// Show or initialize configuration
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    clp completion bash > ~/.local/share/bash-completion/completions/clp

    # Zsh
    clp completion zsh > ~/.zfunc/_clp

    # Fish
    clp completion fish > ~/.config/fish/completions/clp.fish

    # PowerShell
    clp completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # gotag
//!
//! The `gotag` binary runs a Bailiff execution host and launches Dexters,
//! the roaming agents that play tag between hosts.
//!
//! ## Commands
//!
//! - `gotag host` - Serve a Bailiff over HTTP until Ctrl+C
//! - `gotag launch` - Start Dexters roaming across the configured peers
//! - `gotag ping <URL>` - Probe a remote Bailiff
//! - `gotag agents <URL>` - List a remote Bailiff's residents and who is it
//! - `gotag config show|validate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use gotag::commands::{self, ConfigCommand, HostArgs, LaunchArgs};

/// gotag - mobile agents playing tag across Bailiff hosts
#[derive(Parser)]
#[command(name = "gotag")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "GOTAG_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "GOTAG_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a Bailiff
    #[command(name = "host")]
    Host(HostArgs),

    /// Create Dexters and start them roaming
    #[command(name = "launch")]
    Launch(LaunchArgs),

    /// Ping a remote Bailiff
    #[command(name = "ping")]
    Ping {
        /// Base URL of the Bailiff
        url: String,
    },

    /// List the agents resident on a remote Bailiff
    #[command(name = "agents")]
    Agents {
        /// Base URL of the Bailiff
        url: String,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Host(args)) => commands::host::handle_command(args, cli.config).await,
        Some(Commands::Launch(args)) => commands::launch::handle_command(args, cli.config).await,
        Some(Commands::Ping { url }) => commands::remote::ping(&url).await,
        Some(Commands::Agents { url }) => commands::remote::agents(&url).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

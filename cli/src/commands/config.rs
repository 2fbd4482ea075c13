// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use gotag_core::domain::node_config::HostConfigManifest;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = HostConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. GOTAG_CONFIG_PATH: {}",
            std::env::var("GOTAG_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./gotag.yaml");
        println!("  4. ~/.gotag/config.yaml");
        println!("  5. /etc/gotag/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Host:".bold());
    println!("  Name: {}", config.metadata.name);
    println!("  Room: {}", config.spec.host.room);
    println!("  User: {}", config.spec.host.user);
    println!("  Listen: {}:{}", config.spec.host.bind, config.spec.host.port);
    if let Some(address) = &config.spec.host.advertise_address {
        println!("  Advertised address: {}", address);
    }
    println!();

    println!("{}", "Peers:".bold());
    if config.spec.peers.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for peer in &config.spec.peers {
        println!("  - {}", peer);
    }
    println!();

    let roaming = &config.spec.roaming;
    println!("{}", "Roaming:".bold());
    println!("  Restraint sleep: {} ms", roaming.restraint_sleep_ms);
    println!("  Retry interval: {} ms", roaming.retry_interval_ms);
    println!("  Max matches: {}", roaming.max_matches);
    println!("  Request timeout: {} ms", roaming.request_timeout_ms);
    println!();

    if let Some(port) = config.spec.observability.as_ref().and_then(|o| o.metrics_port) {
        println!("{}", "Observability:".bold());
        println!("  Prometheus port: {}", port);
        println!();
    }

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = HostConfigManifest::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gotag.yaml");

        let mut config = HostConfigManifest::default();
        config.spec.peers = vec!["not a url".to_string()];
        config.to_yaml_file(&path).unwrap();
        assert!(validate(Some(path.clone())).await.is_err());

        config.spec.peers.clear();
        config.to_yaml_file(&path).unwrap();
        assert!(validate(Some(path)).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate(Some(dir.path().join("absent.yaml"))).await.is_err());
    }
}

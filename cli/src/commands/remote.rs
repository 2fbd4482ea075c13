// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! One-shot queries against a remote Bailiff.

use anyhow::{Context, Result};
use colored::Colorize;

use gotag_core::domain::bailiff::BailiffInterface;
use gotag_sdk::HttpBailiffClient;

pub async fn ping(url: &str) -> Result<()> {
    let client = HttpBailiffClient::new(url).context("Invalid Bailiff URL")?;
    let echo = client
        .ping()
        .await
        .with_context(|| format!("No answer from {}", url))?;
    println!("{}", echo);
    Ok(())
}

pub async fn agents(url: &str) -> Result<()> {
    let client = HttpBailiffClient::new(url).context("Invalid Bailiff URL")?;
    let residents = client
        .list_agents()
        .await
        .with_context(|| format!("No answer from {}", url))?;

    if residents.is_empty() {
        println!("{}", "No resident agents".dimmed());
        return Ok(());
    }

    println!("{}", format!("{} resident agent(s):", residents.len()).bold());
    for id in residents {
        // Residents may depart between the listing and the query.
        match client.is_it(id).await {
            Ok(true) => println!("  {} {}", id, "IT".red().bold()),
            Ok(false) => println!("  {}", id),
            Err(_) => println!("  {} {}", id, "(departed)".dimmed()),
        }
    }
    Ok(())
}

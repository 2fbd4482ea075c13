// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! gotag Rust SDK
//!
//! Talk to Bailiffs running in other processes. [`HttpBailiffClient`]
//! implements the same boundary interface as an in-process Bailiff, so a
//! roaming agent can be pointed at remote hosts without knowing it.

pub mod client;
pub mod discovery;

pub use client::{ClientError, HttpBailiffClient};
pub use discovery::discovery_from_urls;

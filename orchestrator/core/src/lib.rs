// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # gotag-core
//!
//! Execution host ("Bailiff") for mobile agents.
//!
//! A Bailiff admits an arriving agent at most once per identity, resolves the
//! requested entry operation against its [`AgentCatalog`](domain::entry::AgentCatalog),
//! and runs it on its own task. The boundary operations (`ping`, properties,
//! `migrate`, agent listing and the tag-game queries) are expressed by
//! [`BailiffInterface`](domain::bailiff::BailiffInterface) and served over HTTP by
//! [`presentation::api`].
//!
//! # Architecture
//!
//! - **domain**: agent, tag and dispatch types, boundary and discovery traits, host config
//! - **application**: `AgentRegistry` admission gate, `ExecutionEngine`, the `Bailiff` façade
//! - **infrastructure**: event bus, in-process lookup and static discovery
//! - **presentation**: axum router

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;

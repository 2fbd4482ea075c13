// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`gotag-core`)
//!
//! HTTP surface that translates remote boundary calls into [`Bailiff`]
//! operations. No business logic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP/JSON (Axum) | the boundary operations plus a health probe |
//!
//! [`Bailiff`]: crate::application::bailiff::Bailiff

pub mod api;

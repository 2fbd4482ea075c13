// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: agents, the tag state they carry, entry dispatch, and the
//! contracts a Bailiff and its discovery collaborators fulfil.

pub mod agent;
pub mod bailiff;
pub mod discovery;
pub mod entry;
pub mod events;
pub mod host;
pub mod node_config;
pub mod tag;

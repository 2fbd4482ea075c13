// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod dexter;
pub mod roaming;

pub use dexter::{new_dexter, register_dexter, roam, DEXTER_KIND, TOP_LEVEL};
pub use roaming::RoamingController;

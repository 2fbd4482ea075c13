// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the gotag CLI

pub mod config;
pub mod host;
pub mod launch;
pub mod remote;

pub use self::config::ConfigCommand;
pub use self::host::HostArgs;
pub use self::launch::LaunchArgs;

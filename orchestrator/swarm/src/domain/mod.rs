// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pure roaming types. No I/O.

pub mod roaming;

pub use roaming::*;

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod bailiff;
pub mod engine;
pub mod registry;

pub use bailiff::Bailiff;
pub use engine::{AdmissionHandle, ExecutionEngine};
pub use registry::{AgentRegistry, Residency, ResidentAgent};

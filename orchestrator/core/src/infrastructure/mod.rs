// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod discovery;
pub mod event_bus;

pub use discovery::{InMemoryLookup, RegistrationId, StaticDiscovery};
pub use event_bus::{EventBus, EventBusError};

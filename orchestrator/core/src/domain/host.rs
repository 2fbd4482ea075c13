// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Host identity and the case-insensitive property store of a Bailiff.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::ToSocketAddrs;

/// Who and where a Bailiff is. Returned by `ping`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub host_name: String,
    pub host_address: String,
    pub room: String,
    pub user: String,
}

impl HostIdentity {
    /// Identity for the local machine, resolving host name and address.
    pub fn local(room: impl Into<String>, user: impl Into<String>) -> Self {
        let host_name = hostname::get()
            .map(|h| h.to_string_lossy().to_lowercase())
            .unwrap_or_else(|_| "localhost".to_string());
        let host_address = (host_name.as_str(), 0)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.find(|a| a.is_ipv4()))
            .map(|a| a.ip().to_string())
            .unwrap_or_else(|| "127.0.0.1".to_string());

        Self {
            host_name,
            host_address,
            room: room.into(),
            user: user.into(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.host_address = address.into();
        self
    }
}

/// What `ping` answers with. Displays as the classic echo line.
pub type PingResponse = HostIdentity;

impl fmt::Display for HostIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ping echo from Bailiff on host={} [{}] room={} user={}.",
            self.host_name, self.host_address, self.room, self.user
        )
    }
}

/// String properties with case-insensitive keys; last write wins.
#[derive(Debug, Default)]
pub struct Properties {
    values: DashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded with `hostname`, `hostaddress`, `room` and `user`.
    pub fn for_host(identity: &HostIdentity) -> Self {
        let properties = Self::new();
        properties.set("hostname", &identity.host_name);
        properties.set("hostaddress", &identity.host_address);
        properties.set("room", &identity.room);
        properties.set("user", &identity.user);
        properties
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(&key.to_lowercase()).map(|v| v.value().clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.values.insert(key.to_lowercase(), value.to_string());
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> HostIdentity {
        HostIdentity {
            host_name: "bailiff-1".to_string(),
            host_address: "10.0.0.7".to_string(),
            room: "lab".to_string(),
            user: "fk".to_string(),
        }
    }

    #[test]
    fn test_properties_are_case_insensitive() {
        let properties = Properties::for_host(&identity());
        assert_eq!(properties.get("ROOM").as_deref(), Some("lab"));

        properties.set("Colour", "red");
        properties.set("COLOUR", "blue");
        assert_eq!(properties.get("colour").as_deref(), Some("blue"));
        assert_eq!(properties.get("missing"), None);
        assert!(properties.snapshot().contains_key("colour"));
    }

    #[test]
    fn test_ping_echo() {
        assert_eq!(
            identity().to_string(),
            "Ping echo from Bailiff on host=bailiff-1 [10.0.0.7] room=lab user=fk."
        );
    }
}

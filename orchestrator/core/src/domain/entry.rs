// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Entry Operations and the Agent Catalog
//!
//! An arriving agent names the operation it wants to be started in, plus the
//! arguments to pass. The Bailiff resolves that request against its
//! [`AgentCatalog`]: an explicit table keyed by agent kind, operation name and
//! argument-kind tuple. A miss is an [`BailiffError::EntryNotFound`] and is
//! reported before any task is spawned.
//!
//! ```text
//! (kind = "dexter", "top_level", [bool])  ──resolve──▶  EntryPoint
//! (kind = "dexter", "top_level", [int])   ──resolve──▶  EntryNotFound
//! ```

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::domain::agent::{Agent, AgentKind};
use crate::domain::bailiff::BailiffError;
use crate::domain::host::HostIdentity;

/// A single argument passed to an entry operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ArgValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            ArgValue::Bool(_) => ArgKind::Bool,
            ArgValue::Int(_) => ArgKind::Int,
            ArgValue::Float(_) => ArgKind::Float,
            ArgValue::Text(_) => ArgKind::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

/// Declared type of an entry-operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    Bool,
    Int,
    Float,
    Text,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::Bool => "bool",
            ArgKind::Int => "int",
            ArgKind::Float => "float",
            ArgKind::Text => "text",
        })
    }
}

/// Operation name plus parameter kinds, e.g. `top_level(bool)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntrySignature {
    pub operation: String,
    pub params: Vec<ArgKind>,
}

impl EntrySignature {
    pub fn new(operation: impl Into<String>, params: Vec<ArgKind>) -> Self {
        Self {
            operation: operation.into(),
            params,
        }
    }

    /// The signature a call with these arguments asks for.
    pub fn of_call(operation: &str, args: &[ArgValue]) -> Self {
        Self::new(operation, args.iter().map(ArgValue::kind).collect())
    }
}

impl fmt::Display for EntrySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operation)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// What an entry operation gets to work with on the Bailiff running it.
#[derive(Debug, Clone)]
pub struct EntryContext {
    pub agent: Arc<Agent>,
    pub host: HostIdentity,
}

pub type EntryFuture = BoxFuture<'static, anyhow::Result<()>>;

/// A resolved entry operation.
pub type EntryPoint = Arc<dyn Fn(EntryContext, Vec<ArgValue>) -> EntryFuture + Send + Sync>;

/// Per-kind registry of entry operations known to a Bailiff.
#[derive(Clone, Default)]
pub struct AgentCatalog {
    entries: HashMap<AgentKind, HashMap<EntrySignature, EntryPoint>>,
}

impl AgentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` as the operation `signature` of agents of `kind`.
    /// Re-registering a signature replaces the previous entry point.
    pub fn register<F, Fut>(
        &mut self,
        kind: AgentKind,
        signature: EntrySignature,
        entry: F,
    ) -> &mut Self
    where
        F: Fn(EntryContext, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let entry: EntryPoint = Arc::new(move |ctx, args| entry(ctx, args).boxed());
        self.entries.entry(kind).or_default().insert(signature, entry);
        self
    }

    /// Resolve an operation by name and argument shape.
    pub fn resolve(
        &self,
        kind: &AgentKind,
        operation: &str,
        args: &[ArgValue],
    ) -> Result<EntryPoint, BailiffError> {
        let signature = EntrySignature::of_call(operation, args);
        self.entries
            .get(kind)
            .and_then(|table| table.get(&signature))
            .cloned()
            .ok_or_else(|| BailiffError::EntryNotFound {
                agent_kind: kind.clone(),
                signature,
            })
    }

    pub fn kinds(&self) -> impl Iterator<Item = &AgentKind> {
        self.entries.keys()
    }

    pub fn signatures(&self, kind: &AgentKind) -> Vec<EntrySignature> {
        self.entries
            .get(kind)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for AgentCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, table) in &self.entries {
            let signatures: Vec<String> = table.keys().map(ToString::to_string).collect();
            map.entry(&kind.as_str(), &signatures);
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AgentCatalog {
        let mut catalog = AgentCatalog::new();
        catalog.register(
            AgentKind::new("dexter"),
            EntrySignature::new("top_level", vec![ArgKind::Bool]),
            |_ctx, _args| async { Ok(()) },
        );
        catalog
    }

    #[test]
    fn test_resolve_matching_signature() {
        let catalog = catalog();
        let resolved =
            catalog.resolve(&AgentKind::new("dexter"), "top_level", &[ArgValue::Bool(true)]);
        assert!(resolved.is_ok());
    }

    #[test]
    fn test_resolve_rejects_wrong_argument_shape() {
        let catalog = catalog();
        let err = catalog
            .resolve(&AgentKind::new("dexter"), "top_level", &[ArgValue::Int(1)])
            .err()
            .unwrap();
        match err {
            BailiffError::EntryNotFound { agent_kind, signature } => {
                assert_eq!(agent_kind.as_str(), "dexter");
                assert_eq!(signature.to_string(), "top_level(int)");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(catalog
            .resolve(&AgentKind::new("dexter"), "top_level", &[])
            .is_err());
    }

    #[test]
    fn test_resolve_rejects_unknown_operation_and_kind() {
        let catalog = catalog();
        assert!(catalog
            .resolve(&AgentKind::new("dexter"), "topLevel", &[ArgValue::Bool(true)])
            .is_err());
        assert!(catalog
            .resolve(&AgentKind::new("tagger"), "top_level", &[ArgValue::Bool(true)])
            .is_err());
    }

    #[test]
    fn test_signature_display() {
        let sig = EntrySignature::new("visit", vec![ArgKind::Text, ArgKind::Int, ArgKind::Float]);
        assert_eq!(sig.to_string(), "visit(text, int, float)");
        assert_eq!(EntrySignature::new("idle", vec![]).to_string(), "idle()");
    }

    #[test]
    fn test_arg_value_wire_shape() {
        let json = serde_json::to_value(ArgValue::Bool(false)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "bool", "value": false}));
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Scenario tests for the roaming controller and tag hand-off.

use async_trait::async_trait;
use gotag_core::application::bailiff::Bailiff;
use gotag_core::domain::agent::{Agent, AgentId, AgentKind, AgentRecord};
use gotag_core::domain::bailiff::{BailiffError, BailiffHandle, BailiffInterface};
use gotag_core::domain::entry::{AgentCatalog, ArgKind, ArgValue, EntrySignature};
use gotag_core::domain::events::AgentEvent;
use gotag_core::domain::host::HostIdentity;
use gotag_core::infrastructure::discovery::{InMemoryLookup, StaticDiscovery};
use gotag_core::infrastructure::event_bus::EventBus;
use gotag_swarm::application::dexter::{new_dexter, register_dexter, TOP_LEVEL};
use gotag_swarm::application::roaming::RoamingController;
use gotag_swarm::domain::roaming::{RoamState, RoamingConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Ping,
    ListAgents,
    AgentHasIt(AgentId),
    Migrate {
        record: AgentRecord,
        entry: String,
        args: Vec<ArgValue>,
    },
}

/// Scripted Bailiff that records every call made to it.
#[derive(Default)]
struct MockBailiff {
    name: String,
    ping_fails: bool,
    migrate_error: Option<BailiffError>,
    residents: Vec<AgentId>,
    has_it: HashMap<AgentId, Result<bool, BailiffError>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBailiff {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn tag_attempts(&self) -> Vec<AgentId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::AgentHasIt(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn migrations(&self) -> Vec<(AgentRecord, String, Vec<ArgValue>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Migrate { record, entry, args } => Some((record, entry, args)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl BailiffInterface for MockBailiff {
    fn endpoint(&self) -> String {
        self.name.clone()
    }

    async fn ping(&self) -> Result<HostIdentity, BailiffError> {
        self.calls.lock().push(Call::Ping);
        if self.ping_fails {
            return Err(BailiffError::unavailable("connection refused"));
        }
        Ok(HostIdentity {
            host_name: self.name.clone(),
            host_address: "127.0.0.1".into(),
            room: "mock".into(),
            user: "mock".into(),
        })
    }

    async fn get_property(&self, _key: &str) -> Result<Option<String>, BailiffError> {
        Ok(None)
    }

    async fn set_property(&self, _key: &str, _value: &str) -> Result<(), BailiffError> {
        Ok(())
    }

    async fn migrate(
        &self,
        agent: AgentRecord,
        entry: &str,
        args: Vec<ArgValue>,
    ) -> Result<(), BailiffError> {
        self.calls.lock().push(Call::Migrate {
            record: agent,
            entry: entry.to_string(),
            args,
        });
        match &self.migrate_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn list_agents(&self) -> Result<Vec<AgentId>, BailiffError> {
        self.calls.lock().push(Call::ListAgents);
        Ok(self.residents.clone())
    }

    async fn is_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        Err(BailiffError::AgentNotFound { agent_id })
    }

    async fn agent_has_it(&self, agent_id: AgentId) -> Result<bool, BailiffError> {
        self.calls.lock().push(Call::AgentHasIt(agent_id));
        self.has_it
            .get(&agent_id)
            .cloned()
            .unwrap_or(Err(BailiffError::AgentNotFound { agent_id }))
    }
}

fn quick_config() -> RoamingConfig {
    RoamingConfig {
        restraint_sleep: Duration::ZERO,
        retry_interval: Duration::from_millis(10),
        ..RoamingConfig::default()
    }
}

fn discovery_of(handles: Vec<Arc<MockBailiff>>) -> Arc<StaticDiscovery> {
    Arc::new(StaticDiscovery::new(
        handles.into_iter().map(|h| h as BailiffHandle).collect(),
    ))
}

#[tokio::test]
async fn test_discovery_round_is_capped_at_max_matches() {
    let handles = (0..5)
        .map(|i| Arc::new(MockBailiff::named(&format!("h{i}"))))
        .collect();
    let config = RoamingConfig {
        max_matches: 2,
        ..quick_config()
    };
    let mut controller =
        RoamingController::new(Arc::new(new_dexter(false)), discovery_of(handles), config);

    assert_eq!(controller.step().await, RoamState::Selecting);
    assert_eq!(controller.candidate_count(), 2);
}

#[tokio::test]
async fn test_it_agent_hands_off_once_and_ships_false() {
    let c1 = AgentId::new();
    let c2 = AgentId::new();
    let target = Arc::new(MockBailiff {
        residents: vec![c1, c2],
        has_it: HashMap::from([(c1, Ok(true)), (c2, Ok(true))]),
        ..MockBailiff::named("h2")
    });
    let b = Arc::new(new_dexter(true));

    let discovery = discovery_of(vec![Arc::clone(&target)]);
    let mut controller =
        RoamingController::new(Arc::clone(&b), discovery, quick_config()).with_seed(7);
    let destination = controller.run().await;

    assert_eq!(destination, "h2");
    assert_eq!(controller.state(), RoamState::Migrated);
    assert_eq!(target.tag_attempts().len(), 1);
    assert!(!b.is_it());

    let migrations = target.migrations();
    assert_eq!(migrations.len(), 1);
    let (record, entry, args) = &migrations[0];
    assert_eq!(entry, TOP_LEVEL);
    assert_eq!(args, &vec![ArgValue::Bool(false)]);
    assert!(!record.is_it);
    assert_eq!(record.id, b.id());
}

#[tokio::test]
async fn test_departed_residents_do_not_stop_migration() {
    let gone = vec![AgentId::new(), AgentId::new(), AgentId::new()];
    let target = Arc::new(MockBailiff {
        residents: gone.clone(),
        ..MockBailiff::named("h1")
    });
    let b = Arc::new(new_dexter(true));

    let discovery = discovery_of(vec![Arc::clone(&target)]);
    let mut controller =
        RoamingController::new(Arc::clone(&b), discovery, quick_config()).with_seed(1);
    controller.run().await;

    let attempts = target.tag_attempts();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|id| gone.contains(id)));
    assert!(b.is_it());

    let migrations = target.migrations();
    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].2, vec![ArgValue::Bool(true)]);
    assert!(migrations[0].0.is_it);
}

#[tokio::test]
async fn test_refusals_exhaust_attempts_and_self_is_never_targeted() {
    let b = Arc::new(new_dexter(true));
    let other = AgentId::new();
    let target = Arc::new(MockBailiff {
        residents: vec![b.id(), other],
        has_it: HashMap::from([(other, Ok(false))]),
        ..MockBailiff::named("h1")
    });

    let discovery = discovery_of(vec![Arc::clone(&target)]);
    let mut controller = RoamingController::new(Arc::clone(&b), discovery, quick_config());
    controller.run().await;

    assert!(target.tag_attempts().iter().all(|id| *id != b.id()));
    assert!(target.tag_attempts().len() <= 1);
    assert_eq!(target.migrations()[0].2, vec![ArgValue::Bool(true)]);
}

#[tokio::test]
async fn test_agent_that_is_not_it_skips_tag_resolution() {
    let target = Arc::new(MockBailiff {
        residents: vec![AgentId::new(), AgentId::new()],
        ..MockBailiff::named("h1")
    });
    let agent = Arc::new(new_dexter(false));

    let discovery = discovery_of(vec![Arc::clone(&target)]);
    let mut controller = RoamingController::new(Arc::clone(&agent), discovery, quick_config());
    controller.run().await;

    assert_eq!(
        target.calls().iter().filter(|c| matches!(c, Call::ListAgents)).count(),
        0
    );
    assert!(target.tag_attempts().is_empty());
    assert_eq!(target.migrations()[0].2, vec![ArgValue::Bool(false)]);
}

#[tokio::test]
async fn test_failover_past_dead_and_rejecting_bailiffs() {
    let dead = Arc::new(MockBailiff {
        ping_fails: true,
        ..MockBailiff::named("dead")
    });
    let rejecting = Arc::new(MockBailiff {
        migrate_error: Some(BailiffError::unavailable("bailiff is shutting down")),
        ..MockBailiff::named("rejecting")
    });
    let good = Arc::new(MockBailiff::named("good"));
    let agent = Arc::new(new_dexter(false));

    for seed in 0..8 {
        let mut controller = RoamingController::new(
            Arc::clone(&agent),
            discovery_of(vec![Arc::clone(&dead), Arc::clone(&rejecting), Arc::clone(&good)]),
            quick_config(),
        )
        .with_seed(seed);
        assert_eq!(controller.run().await, "good");
        // Leave the agent ready for the next round.
        agent.tag().abort_migration();
    }

    assert!(dead.migrations().is_empty());
    assert_eq!(good.migrations().len(), 8);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_migration_clears_guard_and_rediscovers() {
    let rejecting = Arc::new(MockBailiff {
        migrate_error: Some(BailiffError::unavailable("timeout")),
        ..MockBailiff::named("rejecting")
    });
    let agent = Arc::new(new_dexter(false));
    let mut controller = RoamingController::new(
        Arc::clone(&agent),
        discovery_of(vec![Arc::clone(&rejecting)]),
        RoamingConfig::default(),
    );

    assert_eq!(controller.step().await, RoamState::Selecting);
    assert_eq!(controller.step().await, RoamState::Probing);
    assert_eq!(controller.step().await, RoamState::Migrating);
    assert_eq!(controller.step().await, RoamState::Discovering);

    assert!(!agent.tag().is_migrating());
    assert_eq!(controller.candidate_count(), 0);
    assert_eq!(controller.empty_rounds(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_discovery_never_leaves_discovering() {
    let agent = Arc::new(new_dexter(false));
    let mut controller = RoamingController::new(
        Arc::clone(&agent),
        Arc::new(StaticDiscovery::default()),
        RoamingConfig::default(),
    );

    for round in 1..=25 {
        assert_eq!(controller.step().await, RoamState::Discovering);
        assert_eq!(controller.empty_rounds(), round);
    }

    let run = tokio::time::timeout(Duration::from_secs(24 * 3600), controller.run()).await;
    assert!(run.is_err(), "roaming must not give up on an empty network");
    assert_eq!(controller.state(), RoamState::Discovering);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_roaming() {
    let agent = Arc::new(new_dexter(false));
    let mut controller = RoamingController::new(
        agent,
        Arc::new(StaticDiscovery::default()),
        RoamingConfig::default(),
    );
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        canceller.cancel();
    });

    assert_eq!(controller.run_until_cancelled(token).await, None);
    assert_eq!(controller.destination(), None);
}

fn identity(name: &str) -> HostIdentity {
    HostIdentity {
        host_name: name.into(),
        host_address: "127.0.0.1".into(),
        room: "lab".into(),
        user: "tester".into(),
    }
}

#[tokio::test]
async fn test_migration_onto_real_bailiff_with_residents() {
    // Residents park until the test ends; arriving Dexters find nowhere to go.
    let park = CancellationToken::new();
    let mut catalog = AgentCatalog::new();
    {
        let park = park.clone();
        catalog.register(
            AgentKind::new("resident"),
            EntrySignature::new("park", vec![ArgKind::Bool]),
            move |_ctx, _args| {
                let park = park.clone();
                async move {
                    park.cancelled().await;
                    Ok(())
                }
            },
        );
    }
    register_dexter(
        &mut catalog,
        Arc::new(StaticDiscovery::default()),
        RoamingConfig::default(),
        park.clone(),
    );

    let h1 = Arc::new(Bailiff::new(identity("h1"), catalog, EventBus::new(256)));
    let lookup = Arc::new(InMemoryLookup::new());
    h1.join(&lookup);

    let mut events = h1.events().subscribe();
    let residents: Vec<Agent> = (0..3)
        .map(|i| Agent::new(AgentKind::new("resident")).with_tag(i == 0))
        .collect();
    let resident_ids: Vec<AgentId> = residents.iter().map(Agent::id).collect();
    for agent in residents {
        h1.admit(agent, "park", vec![ArgValue::Bool(false)]).unwrap();
    }
    let mut started = 0;
    while started < 3 {
        if let AgentEvent::EntryStarted { .. } = events.recv().await.unwrap() {
            started += 1;
        }
    }

    let a4 = Arc::new(new_dexter(false));
    let mut controller = RoamingController::new(Arc::clone(&a4), lookup.clone(), quick_config());
    let destination = controller.run().await;
    assert_eq!(destination, h1.endpoint());

    let mut a4_events = h1.events().subscribe_agent(a4.id());
    if !h1.registry().contains(a4.id()) {
        while !matches!(a4_events.recv().await.unwrap(), AgentEvent::EntryStarted { .. }) {}
    }

    let listed = h1.list_agents().await.unwrap();
    assert_eq!(listed.len(), 4);
    assert!(listed.contains(&a4.id()));
    assert!(resident_ids.iter().all(|id| listed.contains(id)));
    assert!(h1.is_it(resident_ids[0]).await.unwrap());
    assert!(!h1.is_it(a4.id()).await.unwrap());

    park.cancel();
}

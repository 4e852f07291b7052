use std::collections::HashMap;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use bevy::prelude::*;
use hub_runtime::ActorId;
use serde::Serialize;

use crate::engine::TickReport;
use crate::guards::{EventVerdict, HostEvent};

pub const COMMAND_BIND_ENV: &str = "HUB_COMMAND_BIND";
pub const PROPERTIES_PATH_ENV: &str = "HUB_PROPERTIES_PATH";
pub const TICK_MILLIS_ENV: &str = "HUB_TICK_MILLIS";

/// Process-level settings for the sandbox server.
#[derive(Resource, Debug, Clone)]
pub struct ServerConfig {
    pub command_bind: SocketAddr,
    pub properties_path: Option<PathBuf>,
    /// Wall-clock length of one game tick; 0 means ticks advance only on request.
    pub tick_millis: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            command_bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 41101),
            properties_path: None,
            tick_millis: 50,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var(COMMAND_BIND_ENV) {
            match raw.parse() {
                Ok(addr) => config.command_bind = addr,
                Err(err) => tracing::warn!(
                    target: "hub::config",
                    value = %raw,
                    error = %err,
                    "server_config.invalid_bind"
                ),
            }
        }
        if let Ok(path) = env::var(PROPERTIES_PATH_ENV) {
            config.properties_path = Some(PathBuf::from(path));
        }
        if let Ok(raw) = env::var(TICK_MILLIS_ENV) {
            match raw.parse() {
                Ok(millis) => config.tick_millis = millis,
                Err(err) => tracing::warn!(
                    target: "hub::config",
                    value = %raw,
                    error = %err,
                    "server_config.invalid_tick_millis"
                ),
            }
        }
        config
    }
}

/// Ticks elapsed since the app started.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubTick(pub u64);

/// Maps host ids to ECS entities and remembers player join order.
#[derive(Resource, Debug, Default)]
pub struct ActorIndex {
    next_id: u64,
    entities: HashMap<ActorId, Entity>,
    players: Vec<ActorId>,
}

impl ActorIndex {
    pub fn allocate(&mut self) -> ActorId {
        self.next_id += 1;
        ActorId(self.next_id)
    }

    pub fn insert(&mut self, id: ActorId, entity: Entity, is_player: bool) {
        self.entities.insert(id, entity);
        if is_player {
            self.players.push(id);
        }
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Entity> {
        self.players.retain(|player| *player != id);
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: ActorId) -> Option<Entity> {
        self.entities.get(&id).copied()
    }

    pub fn players(&self) -> &[ActorId] {
        &self.players
    }

    pub fn find_player(&self, id: ActorId) -> Option<Entity> {
        self.players
            .contains(&id)
            .then(|| self.entity(id))
            .flatten()
    }
}

const LOG_CAPACITY: usize = 512;

fn push_bounded<T>(log: &mut Vec<T>, value: T) {
    if log.len() >= LOG_CAPACITY {
        log.remove(0);
    }
    log.push(value);
}

/// Recent broadcast lines, oldest first.
#[derive(Resource, Debug, Default)]
pub struct BroadcastLog(pub Vec<String>);

impl BroadcastLog {
    pub fn record(&mut self, message: &str) {
        push_bounded(&mut self.0, message.to_string());
    }
}

/// Recent host events the engine answered, with their verdicts.
#[derive(Resource, Debug, Default)]
pub struct EventLog(pub Vec<(HostEvent, EventVerdict)>);

impl EventLog {
    pub fn record(&mut self, event: HostEvent, verdict: EventVerdict) {
        push_bounded(&mut self.0, (event, verdict));
    }

    pub fn last_verdict(&self) -> Option<EventVerdict> {
        self.0.last().map(|(_, verdict)| *verdict)
    }
}

/// Running totals across engine ticks.
#[derive(Resource, Debug, Default, Clone, Serialize)]
pub struct HubMetrics {
    pub last_tick: TickReport,
    pub enforcement_passes: u64,
    pub actors_enforced: u64,
    pub hostiles_removed: u64,
    pub players_healed: u64,
    pub teleports: u64,
    pub failures: u64,
}

impl HubMetrics {
    pub fn record(&mut self, report: &TickReport) {
        self.last_tick = *report;
        self.teleports += report.teleports as u64;
        if let Some(pass) = report.enforcement {
            self.enforcement_passes += 1;
            self.actors_enforced += pass.enforced as u64;
            self.failures += pass.failures as u64;
        }
        if let Some(purge) = report.purge {
            self.hostiles_removed += purge.removed as u64;
            self.failures += purge.failures as u64;
        }
        if let Some(regen) = report.regen {
            self.players_healed += regen.healed as u64;
            self.failures += regen.failures as u64;
        }
    }
}

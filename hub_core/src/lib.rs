//! Hub rules engine for a shared multiplayer world.
//!
//! Keeps a protected spawn zone safe: actors inside it are shielded and
//! stripped of banned items, hostile creatures are purged, block damage and
//! explosions are cancelled, and administrators manage the zone through
//! persistent world properties. The engine talks to the world only through
//! [`ActorHost`]; [`build_headless_app`] wires it to a Bevy sandbox host.

mod actions;
mod cache;
mod cleaner;
mod combat;
mod commands;
pub mod components;
pub mod ecs_host;
pub mod engine;
mod guards;
pub mod host;
mod permissions;
mod regen;
pub mod resources;
pub mod rules;
pub mod sandbox;
mod scheduler;
pub mod store;
mod systems;
mod teleport;
mod zone;
mod zone_config;

#[cfg(test)]
mod test_support;

use bevy::prelude::*;

pub use actions::{EffectOutcome, InventoryOutcome, PolicyTrackers};
pub use cache::TtlCache;
pub use cleaner::{GroundItemCleaner, SweepReport};
pub use combat::CombatTracker;
pub use commands::NO_PERMISSION_MESSAGE;
pub use engine::{HubEngine, TickReport, CLEANER_DENIED_MESSAGE};
pub use guards::{EventVerdict, HostEvent, BREAK_DENIED_MESSAGE};
pub use host::{ActorHost, ActorSnapshot, EntitySnapshot, HealthState, HostError, InventoryView};
pub use permissions::{PermissionFlags, PermissionLevel, PermissionTable, Rank};
pub use regen::{NaturalRegen, RegenReport};
pub use resources::{ActorIndex, BroadcastLog, EventLog, HubMetrics, HubTick, ServerConfig};
pub use rules::{load_hub_rules_from_env, HubRulesHandle, HubRulesMetadata};
pub use scheduler::{run_enforcement_pass, run_hostile_purge, EnforcementReport, PurgeReport};
pub use store::{PropertyStore, PropertyValue, StoreError, WorldProperties};
pub use systems::{dispatch_event, execute_admin_command};
pub use teleport::HubTeleports;
pub use zone::{contains, contains_in, ZONE_HEIGHT_LIMIT};
pub use zone_config::{read_zone_config, ZoneConfig, ZoneConfigCache};

/// Construct a Bevy [`App`] with the hub engine and an in-memory property
/// store.
pub fn build_headless_app() -> App {
    let mut app = App::new();

    let (rules, metadata) = load_hub_rules_from_env();

    app.insert_resource(ServerConfig::from_env())
        .insert_resource(HubEngine::new(rules.clone()))
        .insert_resource(HubRulesHandle::new(rules))
        .insert_resource(metadata)
        .insert_resource(WorldProperties::in_memory())
        .insert_resource(HubTick::default())
        .insert_resource(ActorIndex::default())
        .insert_resource(BroadcastLog::default())
        .insert_resource(EventLog::default())
        .insert_resource(HubMetrics::default())
        .add_event::<HostEvent>()
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            (
                systems::advance_tick,
                systems::process_host_events,
                systems::run_engine_tick,
                systems::expire_effects,
            )
                .chain(),
        );

    app
}

/// Execute a single game tick.
///
/// Each call advances [`HubTick`], answers queued [`HostEvent`]s, then runs
/// the engine's scheduled work for the new tick.
pub fn run_tick(app: &mut App) {
    app.update();
}

use std::collections::HashSet;

use hub_runtime::EffectSpec;
use serde::Serialize;

use crate::actions::{apply_zone_effects, enforce_inventory, EffectOutcome, PolicyTrackers};
use crate::host::ActorHost;
use crate::permissions::{resolve_tags, PermissionTable};
use crate::zone::{contains, contains_in};
use crate::zone_config::ZoneConfig;

/// Counters for one effect/inventory pass over the online players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnforcementReport {
    pub examined: usize,
    pub without_position: usize,
    pub other_dimension: usize,
    pub bypassed: usize,
    pub outside: usize,
    pub enforced: usize,
    pub effects_applied: usize,
    pub slots_cleared: usize,
    pub failures: usize,
}

/// Counters for one hostile-creature purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    pub examined: usize,
    pub removed: usize,
    pub failures: usize,
}

/// Applies effects and inventory rules to every non-bypass player standing
/// in the zone. A failure for one player is logged and counted; the pass
/// always reaches the remaining players.
pub fn run_enforcement_pass(
    host: &mut dyn ActorHost,
    config: &ZoneConfig,
    permissions: &PermissionTable,
    effects: &[EffectSpec],
    trackers: &mut PolicyTrackers,
    now: u64,
) -> EnforcementReport {
    let mut report = EnforcementReport::default();
    if !config.is_active() {
        return report;
    }

    let players = match host.players() {
        Ok(players) => players,
        Err(err) => {
            tracing::warn!(target: "hub::rules", error = %err, "enforcement.players_unavailable");
            report.failures += 1;
            return report;
        }
    };

    for player in players {
        report.examined += 1;
        let Some(position) = player.position else {
            report.without_position += 1;
            continue;
        };
        if player.dimension != config.dimension {
            report.other_dimension += 1;
            continue;
        }
        let tags = resolve_tags(host, player.id);
        if permissions.can_bypass_zone(&tags) {
            report.bypassed += 1;
            continue;
        }
        if !contains(position, config) {
            report.outside += 1;
            continue;
        }

        report.enforced += 1;
        match apply_zone_effects(host, player.id, effects, &mut trackers.effects, now) {
            Ok(EffectOutcome::Applied(count)) => report.effects_applied += count,
            Ok(EffectOutcome::StillActive) => {}
            Err(err) => {
                report.failures += 1;
                tracing::warn!(
                    target: "hub::rules",
                    actor = %player.id,
                    error = %err,
                    "enforcement.effects_failed"
                );
            }
        }
        match enforce_inventory(host, player.id, config, &mut trackers.inventory, now) {
            Ok(outcome) => report.slots_cleared += outcome.cleared,
            Err(err) => {
                report.failures += 1;
                tracing::warn!(
                    target: "hub::rules",
                    actor = %player.id,
                    error = %err,
                    "enforcement.inventory_failed"
                );
            }
        }
    }

    tracing::debug!(
        target: "hub::rules",
        tick = now,
        examined = report.examined,
        enforced = report.enforced,
        bypassed = report.bypassed,
        failures = report.failures,
        "enforcement.pass_completed"
    );
    report
}

/// Removes hostile creatures standing in the zone.
pub fn run_hostile_purge(
    host: &mut dyn ActorHost,
    config: &ZoneConfig,
    hostile: &HashSet<String>,
    now: u64,
) -> PurgeReport {
    let mut report = PurgeReport::default();
    if !config.is_active() {
        return report;
    }

    let entities = match host.entities(&config.dimension) {
        Ok(entities) => entities,
        Err(err) => {
            tracing::warn!(target: "hub::rules", error = %err, "purge.entities_unavailable");
            report.failures += 1;
            return report;
        }
    };

    for entity in entities {
        report.examined += 1;
        if !hostile.contains(&entity.entity_type) {
            continue;
        }
        let Some(position) = entity.position else {
            continue;
        };
        if !contains_in(position, &entity.dimension, config) {
            continue;
        }
        match host.remove_entity(entity.id) {
            Ok(()) => report.removed += 1,
            Err(err) => {
                report.failures += 1;
                tracing::warn!(
                    target: "hub::rules",
                    entity = %entity.id,
                    entity_type = %entity.entity_type,
                    error = %err,
                    "purge.remove_failed"
                );
            }
        }
    }

    if report.removed > 0 {
        tracing::debug!(
            target: "hub::rules",
            tick = now,
            removed = report.removed,
            "purge.completed"
        );
    }
    report
}

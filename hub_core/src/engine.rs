//! The hub rules engine.
//!
//! [`HubEngine`] owns every per-actor cache and deferred job. The host drives
//! it with [`HubEngine::on_tick`] once per game tick, forwards each
//! [`HostEvent`] to [`HubEngine::handle_event`], and routes administrative
//! commands through [`HubEngine::execute_command`].

use std::collections::HashSet;
use std::sync::Arc;

use bevy::prelude::Resource;
use hub_runtime::{ActorId, AdminCommand, CommandOutcome, EffectSpec, HubRulesConfig};
use serde::Serialize;

use crate::actions::PolicyTrackers;
use crate::cleaner::GroundItemCleaner;
use crate::combat::CombatTracker;
use crate::commands::{self, CommandContext};
use crate::guards::{self, EventVerdict, HostEvent};
use crate::host::ActorHost;
use crate::permissions::{resolve_tags, PermissionTable, Rank};
use crate::regen::{NaturalRegen, RegenReport};
use crate::scheduler::{run_enforcement_pass, run_hostile_purge, EnforcementReport, PurgeReport};
use crate::store::PropertyStore;
use crate::teleport::HubTeleports;
use crate::zone_config::{ZoneConfig, ZoneConfigCache};

pub const CLEANER_DENIED_MESSAGE: &str = "You do not have permission to use this command.";

/// What ran during one call to [`HubEngine::on_tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub teleports: usize,
    pub enforcement: Option<EnforcementReport>,
    pub purge: Option<PurgeReport>,
    pub regen: Option<RegenReport>,
    pub swept: Option<usize>,
}

#[derive(Resource)]
pub struct HubEngine {
    rules: Arc<HubRulesConfig>,
    permissions: PermissionTable,
    effects: Vec<EffectSpec>,
    hostile: HashSet<String>,
    zone_cache: ZoneConfigCache,
    trackers: PolicyTrackers,
    combat: CombatTracker,
    teleports: HubTeleports,
    regen: NaturalRegen,
    cleaner: GroundItemCleaner,
}

impl HubEngine {
    pub fn new(rules: Arc<HubRulesConfig>) -> Self {
        let enforcement = &rules.enforcement;
        let capacity = enforcement.tracker_capacity;
        let combat_window = rules
            .teleport
            .combat_lock_ticks
            .max(rules.regen.combat_grace_ticks);

        Self {
            permissions: PermissionTable::from_tags(&rules.permissions),
            effects: enforcement.effects.iter().map(|e| e.to_spec()).collect(),
            hostile: enforcement.hostile_entities.iter().cloned().collect(),
            zone_cache: ZoneConfigCache::new(enforcement.config_cache_ttl_ticks),
            trackers: PolicyTrackers::new(
                enforcement.effect_refresh_ticks,
                enforcement.inventory_recheck_ticks,
                capacity,
            ),
            combat: CombatTracker::new(combat_window, capacity),
            teleports: HubTeleports::new(rules.teleport.clone(), capacity),
            regen: NaturalRegen::new(rules.regen.clone(), capacity),
            cleaner: GroundItemCleaner::new(rules.cleaner.clone()),
            rules,
        }
    }

    pub fn rules(&self) -> &HubRulesConfig {
        &self.rules
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    pub fn combat(&self) -> &CombatTracker {
        &self.combat
    }

    pub fn cleaner(&self) -> &GroundItemCleaner {
        &self.cleaner
    }

    pub fn pending_teleports(&self) -> usize {
        self.teleports.pending()
    }

    /// Cached zone view; refreshed from the store once the TTL lapses.
    pub fn zone_config(&mut self, store: &dyn PropertyStore, now: u64) -> Arc<ZoneConfig> {
        self.zone_cache
            .get_or_refresh(store, &self.rules.zone, now)
    }

    pub fn on_tick(
        &mut self,
        host: &mut dyn ActorHost,
        store: &dyn PropertyStore,
        now: u64,
    ) -> TickReport {
        let mut report = TickReport {
            tick: now,
            teleports: self.teleports.drain(host),
            ..TickReport::default()
        };
        if is_due(now, self.rules.enforcement.effect_interval_ticks) {
            let config = self.zone_config(store, now);
            report.enforcement = Some(run_enforcement_pass(
                host,
                &config,
                &self.permissions,
                &self.effects,
                &mut self.trackers,
                now,
            ));
        }

        if is_due(now, self.rules.enforcement.purge_interval_ticks) {
            let config = self.zone_config(store, now);
            report.purge = Some(run_hostile_purge(host, &config, &self.hostile, now));
        }

        if self.regen.is_due(now) {
            report.regen = Some(self.regen.run(host, &self.combat, now));
        }

        self.cleaner.on_tick(host, now);

        if is_due(now, self.rules.enforcement.cache_sweep_interval_ticks) {
            report.swept = Some(self.sweep_caches(&*host, now));
        }

        report
    }

    pub fn handle_event(
        &mut self,
        host: &mut dyn ActorHost,
        store: &dyn PropertyStore,
        event: &HostEvent,
        now: u64,
    ) -> EventVerdict {
        if let HostEvent::PlayerLeft { actor } = event {
            self.forget_actor(*actor);
            return EventVerdict::Allow;
        }

        let config = self.zone_config(store, now);
        match event {
            HostEvent::BlockBreak { actor, block } => {
                guards::guard_block_break(host, &config, &self.permissions, *actor, *block)
            }
            HostEvent::BlockInteract { actor, block } => {
                guards::guard_block_interact(&*host, &config, &self.permissions, *actor, *block)
            }
            HostEvent::ItemUse { actor } => {
                guards::guard_item_use(&*host, &config, &self.permissions, *actor)
            }
            HostEvent::Explosion { origin, dimension } => {
                guards::guard_explosion(&config, *origin, dimension)
            }
            HostEvent::EntityHurt {
                victim, attacker, ..
            } => {
                self.combat.record_hurt(*victim, *attacker, now);
                guards::nullify_damage(host, &config, *victim);
                EventVerdict::Allow
            }
            HostEvent::PlayerSpawned { actor, initial } => {
                if *initial {
                    guards::handle_initial_spawn(host, &config, &self.permissions, *actor);
                }
                EventVerdict::Allow
            }
            HostEvent::PlayerLeft { .. } => EventVerdict::Allow,
        }
    }

    pub fn execute_command(
        &mut self,
        host: &mut dyn ActorHost,
        store: &mut dyn PropertyStore,
        actor: ActorId,
        command: &AdminCommand,
        now: u64,
    ) -> CommandOutcome {
        let outcome = match command {
            AdminCommand::Hub => {
                let config = ZoneConfigCache::read_fresh(&*store, &self.rules.zone);
                self.teleports.request(&config, &self.combat, actor, now)
            }
            AdminCommand::Cleaner => self.manual_clean(host, actor, now),
            AdminCommand::SetZoneCenter
            | AdminCommand::SetZoneRadius { .. }
            | AdminCommand::BanHeldItem
            | AdminCommand::ZoneDebug => {
                let mut ctx = CommandContext {
                    host,
                    store,
                    defaults: &self.rules.zone,
                    permissions: &self.permissions,
                };
                match command {
                    AdminCommand::SetZoneCenter => commands::set_zone_center(&mut ctx, actor),
                    AdminCommand::SetZoneRadius { radius } => {
                        commands::set_zone_radius(&mut ctx, actor, *radius)
                    }
                    AdminCommand::BanHeldItem => commands::ban_held_item(&mut ctx, actor),
                    _ => commands::zone_debug(&mut ctx, actor),
                }
            }
        };

        tracing::info!(
            target: "hub::rules",
            %actor,
            command = command.name(),
            success = outcome.is_success(),
            "command.executed"
        );
        outcome
    }

    /// Drops every cache entry held for `actor`.
    pub fn forget_actor(&mut self, actor: ActorId) {
        self.trackers.forget(actor);
        self.combat.forget(actor);
        self.teleports.forget(actor);
        self.regen.forget(actor);
    }

    fn manual_clean(
        &mut self,
        host: &mut dyn ActorHost,
        actor: ActorId,
        now: u64,
    ) -> CommandOutcome {
        let tags = resolve_tags(&*host, actor);
        if !self.permissions.has_rank_at_least(&tags, Rank::Admin) {
            return CommandOutcome::failure(CLEANER_DENIED_MESSAGE);
        }
        let name = host
            .player(actor)
            .map(|snapshot| snapshot.name)
            .unwrap_or_else(|_| actor.to_string());
        let announcement = format!("[Cleaner] Manual cleanup triggered by {name}.");
        if let Err(err) = host.broadcast(&announcement) {
            tracing::warn!(target: "hub::cleaner", error = %err, "cleaner.broadcast_failed");
        }
        let sweep = self.cleaner.sweep_now(host, now);
        tracing::info!(
            target: "hub::cleaner",
            %actor,
            initial = sweep.initial,
            removed = sweep.removed,
            remaining = sweep.remaining,
            "cleaner.manual_sweep"
        );
        CommandOutcome::success("Cleanup executed.")
    }

    fn sweep_caches(&mut self, host: &dyn ActorHost, now: u64) -> usize {
        let is_live = |id: &ActorId| host.is_online(*id);
        let swept = self.trackers.sweep(now, &is_live)
            + self.combat.sweep(now, &is_live)
            + self.teleports.sweep(now, &is_live)
            + self.regen.sweep(now, &is_live);
        if swept > 0 {
            tracing::debug!(target: "hub::rules", tick = now, swept, "caches.swept");
        }
        swept
    }
}

fn is_due(now: u64, interval: u64) -> bool {
    interval > 0 && now % interval == 0
}

use hub_runtime::{ActorId, RegenSettings};
use serde::Serialize;

use crate::cache::TtlCache;
use crate::combat::CombatTracker;
use crate::host::ActorHost;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegenReport {
    pub examined: usize,
    pub healed: usize,
    pub failures: usize,
}

/// Slow out-of-combat healing for players above the health floor.
#[derive(Debug, Clone)]
pub struct NaturalRegen {
    settings: RegenSettings,
    recently_healed: TtlCache<ActorId, ()>,
}

impl NaturalRegen {
    pub fn new(settings: RegenSettings, capacity: usize) -> Self {
        let recently_healed = TtlCache::new(settings.regen_interval_ticks, capacity);
        Self {
            settings,
            recently_healed,
        }
    }

    pub fn is_due(&self, now: u64) -> bool {
        self.settings.enabled
            && self.settings.check_interval_ticks > 0
            && now % self.settings.check_interval_ticks == 0
    }

    pub fn run(
        &mut self,
        host: &mut dyn ActorHost,
        combat: &CombatTracker,
        now: u64,
    ) -> RegenReport {
        let mut report = RegenReport::default();
        let players = match host.players() {
            Ok(players) => players,
            Err(err) => {
                tracing::warn!(target: "hub::rules", error = %err, "regen.players_unavailable");
                report.failures += 1;
                return report;
            }
        };

        for player in players {
            report.examined += 1;
            let health = match host.health(player.id) {
                Ok(Some(health)) => health,
                Ok(None) => continue,
                Err(err) => {
                    report.failures += 1;
                    tracing::debug!(
                        target: "hub::rules",
                        actor = %player.id,
                        error = %err,
                        "regen.health_unavailable"
                    );
                    continue;
                }
            };
            if health.current >= health.max {
                continue;
            }
            if combat.in_combat(player.id, now, self.settings.combat_grace_ticks) {
                continue;
            }
            if self.recently_healed.is_fresh(&player.id, now) {
                continue;
            }
            if health.current <= self.settings.health_floor {
                continue;
            }

            let next = (health.current + self.settings.amount).min(health.max);
            match host.set_health(player.id, next) {
                Ok(()) => {
                    report.healed += 1;
                    self.recently_healed.insert(player.id, (), now);
                }
                Err(err) => {
                    report.failures += 1;
                    tracing::warn!(
                        target: "hub::rules",
                        actor = %player.id,
                        error = %err,
                        "regen.heal_failed"
                    );
                }
            }
        }
        report
    }

    pub fn forget(&mut self, actor: ActorId) {
        self.recently_healed.remove(&actor);
    }

    pub fn sweep(&mut self, now: u64, is_live: impl Fn(&ActorId) -> bool) -> usize {
        self.recently_healed.sweep(now, is_live)
    }
}

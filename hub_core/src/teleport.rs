use std::collections::VecDeque;

use hub_runtime::{ActorId, CommandOutcome, TeleportSettings, WorldPos};

use crate::cache::TtlCache;
use crate::combat::CombatTracker;
use crate::host::ActorHost;
use crate::zone_config::ZoneConfig;

const TICKS_PER_SECOND: u64 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingTeleport {
    pub actor: ActorId,
    pub destination: WorldPos,
    pub dimension: String,
}

/// The player-facing `hub` command: checks, cooldown stamping and the queue
/// of teleports waiting for the next tick.
#[derive(Debug, Clone)]
pub struct HubTeleports {
    settings: TeleportSettings,
    cooldowns: TtlCache<ActorId, ()>,
    queue: VecDeque<PendingTeleport>,
}

impl HubTeleports {
    pub fn new(settings: TeleportSettings, capacity: usize) -> Self {
        let cooldowns = TtlCache::new(settings.cooldown_ticks, capacity);
        Self {
            settings,
            cooldowns,
            queue: VecDeque::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn request(
        &mut self,
        config: &ZoneConfig,
        combat: &CombatTracker,
        actor: ActorId,
        now: u64,
    ) -> CommandOutcome {
        if !config.center_configured {
            return CommandOutcome::failure(
                "Hub location not set. Ask an admin to set it with set-zone-center.",
            );
        }

        if let Some(elapsed) = combat.ticks_since_damage(actor, now) {
            if elapsed < self.settings.combat_lock_ticks {
                let seconds = seconds_left(self.settings.combat_lock_ticks - elapsed);
                return CommandOutcome::failure(format!(
                    "Cannot use hub while in combat! Wait {seconds} seconds."
                ));
            }
        }

        if let Some(elapsed) = self.cooldowns.age(&actor, now) {
            if elapsed < self.settings.cooldown_ticks {
                let seconds = seconds_left(self.settings.cooldown_ticks - elapsed);
                return CommandOutcome::failure(format!(
                    "Please wait {seconds} seconds before using hub again."
                ));
            }
        }

        // Stamped before the teleport runs so repeated requests inside the
        // same tick are rejected.
        self.cooldowns.insert(actor, (), now);
        self.queue.push_back(PendingTeleport {
            actor,
            destination: config.center,
            dimension: config.dimension.clone(),
        });
        CommandOutcome::success("Teleporting...")
    }

    /// Runs every queued teleport and reports the result to each actor.
    pub fn drain(&mut self, host: &mut dyn ActorHost) -> usize {
        let mut executed = 0;
        while let Some(pending) = self.queue.pop_front() {
            let teleported = host.teleport(pending.actor, pending.destination, &pending.dimension);
            let message = match teleported {
                Ok(()) => {
                    executed += 1;
                    "Teleported to hub!".to_string()
                }
                Err(err) => {
                    tracing::warn!(
                        target: "hub::rules",
                        actor = %pending.actor,
                        error = %err,
                        "hub_teleport.failed"
                    );
                    format!("Teleport failed: {err}")
                }
            };
            if let Err(err) = host.notify(pending.actor, &message) {
                tracing::debug!(
                    target: "hub::rules",
                    actor = %pending.actor,
                    error = %err,
                    "hub_teleport.notify_failed"
                );
            }
        }
        executed
    }

    pub fn forget(&mut self, actor: ActorId) {
        self.cooldowns.remove(&actor);
        self.queue.retain(|pending| pending.actor != actor);
    }

    pub fn sweep(&mut self, now: u64, is_live: impl Fn(&ActorId) -> bool) -> usize {
        self.cooldowns.sweep(now, is_live)
    }
}

fn seconds_left(ticks: u64) -> u64 {
    ticks.div_ceil(TICKS_PER_SECOND)
}

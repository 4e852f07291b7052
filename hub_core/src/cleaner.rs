//! Periodic removal of dropped items.
//!
//! The cleaner counts up in `step_ticks` increments, announces the
//! remaining minutes, runs a one-message-per-second countdown and then
//! sweeps every dimension. Items that survive a sweep are retried a capped
//! number of times before a summary is broadcast.

use hub_runtime::{ActorId, CleanerSettings};
use serde::Serialize;

use crate::host::ActorHost;

const TICKS_PER_SECOND: u64 = 20;
const TICKS_PER_MINUTE: u64 = 60 * TICKS_PER_SECOND;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub initial: usize,
    pub removed: usize,
    pub teleported: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    seconds_left: u32,
    next_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FollowUp {
    attempts: u32,
    next_at: u64,
    removed: usize,
}

#[derive(Debug, Clone)]
pub struct GroundItemCleaner {
    settings: CleanerSettings,
    ticks_since_clean: u64,
    countdown: Option<Countdown>,
    follow_up: Option<FollowUp>,
    last_sweep: Option<SweepReport>,
}

impl GroundItemCleaner {
    pub fn new(settings: CleanerSettings) -> Self {
        Self {
            settings,
            ticks_since_clean: 0,
            countdown: None,
            follow_up: None,
            last_sweep: None,
        }
    }

    pub fn counting_down(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn follow_up_pending(&self) -> bool {
        self.follow_up.is_some()
    }

    pub fn last_sweep(&self) -> Option<SweepReport> {
        self.last_sweep
    }

    /// Advances the cycle, countdown and follow-up retries for tick `now`.
    pub fn on_tick(&mut self, host: &mut dyn ActorHost, now: u64) {
        let step = self.settings.step_ticks;
        if self.settings.enabled && step > 0 && now % step == 0 {
            self.advance_cycle(host, now);
        }

        if let Some(countdown) = self.countdown {
            if now >= countdown.next_at {
                self.step_countdown(host, countdown, now);
            }
        }

        if let Some(follow_up) = self.follow_up {
            if now >= follow_up.next_at {
                self.step_follow_up(host, follow_up, now);
            }
        }
    }

    /// Manual sweep, bypassing the cycle and any countdown in progress.
    pub fn sweep_now(&mut self, host: &mut dyn ActorHost, now: u64) -> SweepReport {
        let pass = self.perform_pass(host);
        self.last_sweep = Some(pass);

        if pass.initial == 0 {
            broadcast(host, "Cleaner: No dropped items found.");
            return pass;
        }
        if pass.remaining == 0 {
            broadcast(
                host,
                &format!("All dropped items cleared. Removed: {}.", pass.removed),
            );
            return pass;
        }

        self.follow_up = Some(FollowUp {
            attempts: 0,
            next_at: now + self.settings.followup_interval_ticks,
            removed: pass.removed,
        });
        pass
    }

    fn advance_cycle(&mut self, host: &mut dyn ActorHost, now: u64) {
        self.ticks_since_clean += self.settings.step_ticks;
        let cycle = self.settings.cycle_ticks;
        let announce = self.settings.announce_interval_ticks;

        let elapsed = self.ticks_since_clean;
        if announce > 0 && elapsed % announce == 0 && elapsed < cycle {
            let minutes = (cycle - elapsed) / TICKS_PER_MINUTE;
            broadcast(
                host,
                &format!("[Cleaner] Ground items will be cleared in {minutes} minutes."),
            );
        }

        if self.ticks_since_clean >= cycle {
            broadcast(
                host,
                &format!(
                    "[Cleaner] Cleanup starting in {} seconds...",
                    self.settings.countdown_seconds
                ),
            );
            self.countdown = Some(Countdown {
                seconds_left: self.settings.countdown_seconds,
                next_at: now + TICKS_PER_SECOND,
            });
            self.ticks_since_clean = 0;
            tracing::info!(target: "hub::cleaner", tick = now, "cleaner.countdown_started");
        }
    }

    fn step_countdown(&mut self, host: &mut dyn ActorHost, countdown: Countdown, now: u64) {
        if countdown.seconds_left == 0 {
            self.countdown = None;
            self.sweep_now(host, now);
            return;
        }
        broadcast(
            host,
            &format!(
                "[Cleaner] Clearing all ground items in {}s...",
                countdown.seconds_left
            ),
        );
        self.countdown = Some(Countdown {
            seconds_left: countdown.seconds_left - 1,
            next_at: now + TICKS_PER_SECOND,
        });
    }

    fn step_follow_up(&mut self, host: &mut dyn ActorHost, follow_up: FollowUp, now: u64) {
        let attempts = follow_up.attempts + 1;
        let pass = self.perform_pass(host);
        let removed = follow_up.removed + pass.removed;

        if pass.remaining == 0 || attempts >= self.settings.followup_attempts {
            self.follow_up = None;
            self.last_sweep = Some(SweepReport {
                removed,
                ..pass
            });
            broadcast(
                host,
                &format!(
                    "[Cleaner] Cleared {removed} items. Remaining: {}.",
                    pass.remaining
                ),
            );
            if pass.remaining > 0 {
                tracing::warn!(
                    target: "hub::cleaner",
                    attempts,
                    remaining = pass.remaining,
                    "cleaner.items_remaining"
                );
            }
            return;
        }

        self.follow_up = Some(FollowUp {
            attempts,
            next_at: now + self.settings.followup_interval_ticks,
            removed,
        });
    }

    fn perform_pass(&self, host: &mut dyn ActorHost) -> SweepReport {
        let mut report = SweepReport::default();
        let dimensions = host.dimensions();
        let void = self.settings.void_pos();

        for dimension in &dimensions {
            for item in self.items_in(host, dimension) {
                report.initial += 1;
                match host.remove_entity(item) {
                    Ok(()) => report.removed += 1,
                    Err(err) => {
                        tracing::debug!(
                            target: "hub::cleaner",
                            entity = %item,
                            error = %err,
                            "cleaner.remove_failed"
                        );
                        match host.teleport(item, void, dimension) {
                            Ok(()) => report.teleported += 1,
                            Err(err) => tracing::warn!(
                                target: "hub::cleaner",
                                entity = %item,
                                error = %err,
                                "cleaner.void_teleport_failed"
                            ),
                        }
                    }
                }
            }
        }

        report.remaining = dimensions
            .iter()
            .map(|dimension| self.items_in(host, dimension).len())
            .sum();
        report
    }

    fn items_in(&self, host: &dyn ActorHost, dimension: &str) -> Vec<ActorId> {
        match host.entities(dimension) {
            Ok(entities) => entities
                .into_iter()
                .filter(|entity| entity.entity_type == self.settings.item_entity_type)
                .map(|entity| entity.id)
                .collect(),
            Err(err) => {
                tracing::warn!(
                    target: "hub::cleaner",
                    dimension,
                    error = %err,
                    "cleaner.entities_unavailable"
                );
                Vec::new()
            }
        }
    }
}

fn broadcast(host: &mut dyn ActorHost, message: &str) {
    if let Err(err) = host.broadcast(message) {
        tracing::warn!(target: "hub::cleaner", error = %err, "cleaner.broadcast_failed");
    }
}

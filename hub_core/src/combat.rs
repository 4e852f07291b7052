use hub_runtime::ActorId;

use crate::cache::TtlCache;

/// Remembers the last tick each actor took or dealt damage.
#[derive(Debug, Clone)]
pub struct CombatTracker {
    last_damage: TtlCache<ActorId, ()>,
}

impl CombatTracker {
    /// `window` is the longest lookback any caller needs; older stamps are
    /// swept and then read as "never damaged".
    pub fn new(window: u64, capacity: usize) -> Self {
        Self {
            last_damage: TtlCache::new(window, capacity),
        }
    }

    pub fn record_hurt(&mut self, victim: ActorId, attacker: Option<ActorId>, now: u64) {
        self.last_damage.insert(victim, (), now);
        if let Some(attacker) = attacker {
            self.last_damage.insert(attacker, (), now);
        }
    }

    pub fn ticks_since_damage(&self, actor: ActorId, now: u64) -> Option<u64> {
        self.last_damage.age(&actor, now)
    }

    /// True while fewer than `lock_ticks` have passed since the last damage.
    pub fn in_combat(&self, actor: ActorId, now: u64, lock_ticks: u64) -> bool {
        self.ticks_since_damage(actor, now)
            .is_some_and(|elapsed| elapsed < lock_ticks)
    }

    pub fn forget(&mut self, actor: ActorId) {
        self.last_damage.remove(&actor);
    }

    pub fn sweep(&mut self, now: u64, is_live: impl Fn(&ActorId) -> bool) -> usize {
        self.last_damage.sweep(now, is_live)
    }

    pub fn len(&self) -> usize {
        self.last_damage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_damage.is_empty()
    }
}

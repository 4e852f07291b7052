use hub_runtime::{ActorId, EffectSpec};

use crate::cache::TtlCache;
use crate::host::{ActorHost, HostError};
use crate::zone_config::ZoneConfig;

/// Per-actor bookkeeping that keeps policy actions from repeating work.
#[derive(Debug, Clone)]
pub struct PolicyTrackers {
    /// Actors whose effect bundle is still active.
    pub effects: TtlCache<ActorId, ()>,
    /// Actors whose inventory was scanned recently.
    pub inventory: TtlCache<ActorId, ()>,
}

impl PolicyTrackers {
    pub fn new(effect_refresh_ticks: u64, inventory_recheck_ticks: u64, capacity: usize) -> Self {
        Self {
            effects: TtlCache::new(effect_refresh_ticks, capacity),
            inventory: TtlCache::new(inventory_recheck_ticks, capacity),
        }
    }

    pub fn forget(&mut self, actor: ActorId) {
        self.effects.remove(&actor);
        self.inventory.remove(&actor);
    }

    pub fn sweep(&mut self, now: u64, is_live: impl Fn(&ActorId) -> bool) -> usize {
        self.effects.sweep(now, &is_live) + self.inventory.sweep(now, &is_live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    Applied(usize),
    StillActive,
}

/// Applies the protective bundle unless it was applied inside the refresh
/// window. The tracker is stamped only once every effect landed.
pub fn apply_zone_effects(
    host: &mut dyn ActorHost,
    actor: ActorId,
    effects: &[EffectSpec],
    tracker: &mut TtlCache<ActorId, ()>,
    now: u64,
) -> Result<EffectOutcome, HostError> {
    if tracker.is_fresh(&actor, now) {
        return Ok(EffectOutcome::StillActive);
    }
    for effect in effects {
        host.apply_effect(actor, effect)?;
    }
    tracker.insert(actor, (), now);
    Ok(EffectOutcome::Applied(effects.len()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryOutcome {
    pub scanned: bool,
    pub cleared: usize,
}

/// Clears every slot holding a banned resource and tells the actor once per
/// cleared slot. Actors without a container are left alone.
pub fn enforce_inventory(
    host: &mut dyn ActorHost,
    actor: ActorId,
    config: &ZoneConfig,
    checked: &mut TtlCache<ActorId, ()>,
    now: u64,
) -> Result<InventoryOutcome, HostError> {
    if checked.is_fresh(&actor, now) {
        return Ok(InventoryOutcome::default());
    }
    let Some(inventory) = host.inventory(actor)? else {
        return Ok(InventoryOutcome::default());
    };

    let mut cleared = 0;
    for (slot, stack) in inventory.slots.iter().enumerate() {
        let Some(stack) = stack else {
            continue;
        };
        if !config.is_banned(&stack.type_id) {
            continue;
        }
        host.clear_slot(actor, slot)?;
        cleared += 1;
        let message = format!("{} is not allowed in the Hub!", stack.short_name());
        if let Err(err) = host.notify(actor, &message) {
            tracing::debug!(
                target: "hub::rules",
                %actor,
                error = %err,
                "inventory.notify_failed"
            );
        }
    }

    checked.insert(actor, (), now);
    Ok(InventoryOutcome {
        scanned: true,
        cleared,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use hub_runtime::WorldPos;

    use super::*;
    use crate::test_support::MockHost;

    fn zone() -> ZoneConfig {
        ZoneConfig {
            center: WorldPos::default(),
            center_configured: true,
            radius: 100.0,
            banned_resources: ["minecraft:lava_bucket", "minecraft:tnt"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<_>>(),
            dimension: "overworld".to_string(),
        }
    }

    fn effect(name: &str) -> EffectSpec {
        EffectSpec {
            effect: name.to_string(),
            duration_ticks: 100,
            amplifier: 255,
            show_particles: false,
        }
    }

    #[test]
    fn banned_slots_are_cleared_with_one_notice_each() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        host.give(actor, 0, "minecraft:lava_bucket");
        host.give(actor, 3, "minecraft:bread");
        host.give(actor, 5, "minecraft:tnt");
        let mut checked = TtlCache::new(20, 16);

        let outcome = enforce_inventory(&mut host, actor, &zone(), &mut checked, 0).unwrap();
        assert_eq!(outcome.cleared, 2);

        let player = host.player_ref(actor);
        let slots = &player.inventory.as_ref().unwrap().slots;
        assert!(slots[0].is_none());
        assert!(slots[3].is_some());
        assert!(slots[5].is_none());
        assert_eq!(
            player.messages,
            vec![
                "lava_bucket is not allowed in the Hub!".to_string(),
                "tnt is not allowed in the Hub!".to_string(),
            ]
        );
    }

    #[test]
    fn recent_scan_suppresses_rescan() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        let mut checked = TtlCache::new(20, 16);
        enforce_inventory(&mut host, actor, &zone(), &mut checked, 0).unwrap();

        host.give(actor, 1, "minecraft:tnt");
        let skipped = enforce_inventory(&mut host, actor, &zone(), &mut checked, 10).unwrap();
        assert!(!skipped.scanned);
        let rescanned = enforce_inventory(&mut host, actor, &zone(), &mut checked, 20).unwrap();
        assert_eq!(rescanned.cleared, 1);
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        host.player_mut(actor).unwrap().inventory = None;
        let mut checked = TtlCache::new(20, 16);
        let outcome = enforce_inventory(&mut host, actor, &zone(), &mut checked, 0).unwrap();
        assert_eq!(outcome, InventoryOutcome::default());
    }

    #[test]
    fn effects_refresh_only_after_window() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        let bundle = vec![effect("resistance"), effect("weakness")];
        let mut tracker = TtlCache::new(80, 16);

        assert_eq!(
            apply_zone_effects(&mut host, actor, &bundle, &mut tracker, 0).unwrap(),
            EffectOutcome::Applied(2)
        );
        assert_eq!(
            apply_zone_effects(&mut host, actor, &bundle, &mut tracker, 40).unwrap(),
            EffectOutcome::StillActive
        );
        apply_zone_effects(&mut host, actor, &bundle, &mut tracker, 80).unwrap();
        assert_eq!(host.player_ref(actor).effects.len(), 4);
    }

    #[test]
    fn failed_effect_leaves_tracker_unstamped() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        host.fail("apply_effect", actor);
        let mut tracker = TtlCache::new(80, 16);
        let err = apply_zone_effects(&mut host, actor, &[effect("resistance")], &mut tracker, 0)
            .unwrap_err();
        assert!(matches!(err, HostError::CallFailed { call: "apply_effect", .. }));
        assert!(!tracker.is_fresh(&actor, 0));
    }
}

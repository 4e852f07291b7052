use bevy::prelude::Event;
use hub_runtime::{ActorId, WorldPos};

use crate::host::ActorHost;
use crate::permissions::{resolve_tags, PermissionTable};
use crate::zone::contains_in;
use crate::zone_config::ZoneConfig;

/// Discrete happenings the host reports to the engine.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum HostEvent {
    BlockBreak {
        actor: ActorId,
        block: WorldPos,
    },
    BlockInteract {
        actor: ActorId,
        block: WorldPos,
    },
    ItemUse {
        actor: ActorId,
    },
    Explosion {
        origin: WorldPos,
        dimension: String,
    },
    EntityHurt {
        victim: ActorId,
        attacker: Option<ActorId>,
        amount: f32,
    },
    PlayerSpawned {
        actor: ActorId,
        initial: bool,
    },
    PlayerLeft {
        actor: ActorId,
    },
}

/// Answer for cancellable events. Events the host cannot cancel always
/// resolve to `Allow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventVerdict {
    #[default]
    Allow,
    Deny,
}

impl EventVerdict {
    pub fn is_denied(self) -> bool {
        self == EventVerdict::Deny
    }
}

pub const BREAK_DENIED_MESSAGE: &str = "You cannot break blocks in the Hub!";

fn is_bypass(host: &dyn ActorHost, permissions: &PermissionTable, actor: ActorId) -> bool {
    permissions.can_bypass_zone(&resolve_tags(host, actor))
}

fn actor_dimension(host: &dyn ActorHost, actor: ActorId) -> Option<String> {
    host.player(actor).ok().map(|snapshot| snapshot.dimension)
}

pub fn guard_block_break(
    host: &mut dyn ActorHost,
    config: &ZoneConfig,
    permissions: &PermissionTable,
    actor: ActorId,
    block: WorldPos,
) -> EventVerdict {
    let Some(dimension) = actor_dimension(host, actor) else {
        return EventVerdict::Allow;
    };
    if !contains_in(block, &dimension, config) || is_bypass(host, permissions, actor) {
        return EventVerdict::Allow;
    }
    if let Err(err) = host.notify(actor, BREAK_DENIED_MESSAGE) {
        tracing::debug!(target: "hub::rules", %actor, error = %err, "guard.notify_failed");
    }
    EventVerdict::Deny
}

pub fn guard_block_interact(
    host: &dyn ActorHost,
    config: &ZoneConfig,
    permissions: &PermissionTable,
    actor: ActorId,
    block: WorldPos,
) -> EventVerdict {
    let Some(dimension) = actor_dimension(host, actor) else {
        return EventVerdict::Allow;
    };
    if contains_in(block, &dimension, config) && !is_bypass(host, permissions, actor) {
        EventVerdict::Deny
    } else {
        EventVerdict::Allow
    }
}

/// Denies using a banned item while standing in the zone.
pub fn guard_item_use(
    host: &dyn ActorHost,
    config: &ZoneConfig,
    permissions: &PermissionTable,
    actor: ActorId,
) -> EventVerdict {
    let Ok(snapshot) = host.player(actor) else {
        return EventVerdict::Allow;
    };
    let Some(position) = snapshot.position else {
        return EventVerdict::Allow;
    };
    if !contains_in(position, &snapshot.dimension, config) {
        return EventVerdict::Allow;
    }
    let held = match host.inventory(actor) {
        Ok(Some(inventory)) => inventory.selected_item().map(|stack| stack.type_id.clone()),
        Ok(None) => None,
        Err(err) => {
            tracing::debug!(
                target: "hub::rules",
                %actor,
                error = %err,
                "guard.inventory_unavailable"
            );
            None
        }
    };
    match held {
        Some(type_id) if config.is_banned(&type_id) && !is_bypass(host, permissions, actor) => {
            EventVerdict::Deny
        }
        _ => EventVerdict::Allow,
    }
}

/// Explosions starting in the zone are cancelled for everyone.
pub fn guard_explosion(config: &ZoneConfig, origin: WorldPos, dimension: &str) -> EventVerdict {
    if contains_in(origin, dimension, config) {
        EventVerdict::Deny
    } else {
        EventVerdict::Allow
    }
}

/// Restores a damaged entity in the zone to full health, bypass or not.
/// Returns whether health was reset.
pub fn nullify_damage(host: &mut dyn ActorHost, config: &ZoneConfig, victim: ActorId) -> bool {
    let Ok(entity) = host.entity(victim) else {
        return false;
    };
    let Some(position) = entity.position else {
        return false;
    };
    if !contains_in(position, &entity.dimension, config) {
        return false;
    }
    let health = match host.health(victim) {
        Ok(Some(health)) => health,
        Ok(None) => return false,
        Err(err) => {
            tracing::debug!(
                target: "hub::rules",
                %victim,
                error = %err,
                "guard.health_unavailable"
            );
            return false;
        }
    };
    match host.set_health(victim, health.max) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(target: "hub::rules", %victim, error = %err, "guard.heal_failed");
            false
        }
    }
}

/// Sends a newly joined player to the zone center, even while the zone
/// radius is 0. Non-bypass players also get their spawn point pinned there.
pub fn handle_initial_spawn(
    host: &mut dyn ActorHost,
    config: &ZoneConfig,
    permissions: &PermissionTable,
    actor: ActorId,
) {
    if let Err(err) = host.teleport(actor, config.center, &config.dimension) {
        tracing::warn!(target: "hub::rules", %actor, error = %err, "spawn.teleport_failed");
    }
    if is_bypass(host, permissions, actor) {
        return;
    }
    if let Err(err) = host.set_spawn_point(actor, config.center.floor(), &config.dimension) {
        tracing::warn!(target: "hub::rules", %actor, error = %err, "spawn.set_spawn_point_failed");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use hub_runtime::{BlockPos, PermissionTags};

    use super::*;
    use crate::test_support::MockHost;

    fn zone() -> ZoneConfig {
        ZoneConfig {
            center: WorldPos::new(0.5, 64.7, -0.5),
            center_configured: true,
            radius: 100.0,
            banned_resources: BTreeSet::from(["minecraft:tnt".to_string()]),
            dimension: "overworld".to_string(),
        }
    }

    fn table() -> PermissionTable {
        PermissionTable::from_tags(&PermissionTags::default())
    }

    #[test]
    fn breaking_inside_is_denied_with_notice() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::new(500.0, 64.0, 0.0), &[]);
        let verdict =
            guard_block_break(&mut host, &zone(), &table(), actor, WorldPos::new(10.0, 64.0, 10.0));
        assert!(verdict.is_denied());
        assert_eq!(host.player_ref(actor).messages, vec![BREAK_DENIED_MESSAGE]);

        let outside =
            guard_block_break(&mut host, &zone(), &table(), actor, WorldPos::new(300.0, 64.0, 0.0));
        assert_eq!(outside, EventVerdict::Allow);
    }

    #[test]
    fn bypass_players_may_build_and_interact() {
        let mut host = MockHost::new();
        let owner = host.add_player("Owner", WorldPos::default(), &["owner"]);
        let block = WorldPos::new(1.0, 64.0, 1.0);
        assert_eq!(
            guard_block_break(&mut host, &zone(), &table(), owner, block),
            EventVerdict::Allow
        );
        assert_eq!(
            guard_block_interact(&host, &zone(), &table(), owner, block),
            EventVerdict::Allow
        );
        assert!(host.player_ref(owner).messages.is_empty());
    }

    #[test]
    fn interact_is_denied_silently() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::default(), &[]);
        let verdict = guard_block_interact(&host, &zone(), &table(), actor, WorldPos::default());
        assert!(verdict.is_denied());
        assert!(host.player_ref(actor).messages.is_empty());
    }

    #[test]
    fn using_banned_item_in_zone_is_denied() {
        let mut host = MockHost::new();
        let actor = host.add_player("Alex", WorldPos::new(3.0, 64.0, 3.0), &[]);
        assert_eq!(guard_item_use(&host, &zone(), &table(), actor), EventVerdict::Allow);
        host.give(actor, 0, "minecraft:tnt");
        assert!(guard_item_use(&host, &zone(), &table(), actor).is_denied());

        host.player_mut(actor).unwrap().snapshot.position = Some(WorldPos::new(900.0, 64.0, 0.0));
        assert_eq!(guard_item_use(&host, &zone(), &table(), actor), EventVerdict::Allow);
    }

    #[test]
    fn explosions_cancelled_only_in_zone() {
        assert!(guard_explosion(&zone(), WorldPos::new(50.0, 60.0, 50.0), "overworld").is_denied());
        assert_eq!(
            guard_explosion(&zone(), WorldPos::new(150.0, 60.0, 50.0), "overworld"),
            EventVerdict::Allow
        );
        assert_eq!(
            guard_explosion(&zone(), WorldPos::new(50.0, 60.0, 50.0), "nether"),
            EventVerdict::Allow
        );
    }

    #[test]
    fn damage_is_nullified_even_for_bypass_players() {
        let mut host = MockHost::new();
        let owner = host.add_player("Owner", WorldPos::default(), &["owner"]);
        host.player_mut(owner).unwrap().health.as_mut().unwrap().current = 4.0;
        assert!(nullify_damage(&mut host, &zone(), owner));
        assert_eq!(host.player_ref(owner).health.unwrap().current, 20.0);

        let far = host.add_player("Far", WorldPos::new(400.0, 0.0, 0.0), &[]);
        host.player_mut(far).unwrap().health.as_mut().unwrap().current = 4.0;
        assert!(!nullify_damage(&mut host, &zone(), far));
        assert_eq!(host.player_ref(far).health.unwrap().current, 4.0);
    }

    #[test]
    fn initial_spawn_pins_spawn_point_for_regular_players() {
        let mut host = MockHost::new();
        let visitor = host.add_player("Visitor", WorldPos::new(900.0, 70.0, 900.0), &[]);
        let manager =
            host.add_player("Manager", WorldPos::new(900.0, 70.0, 900.0), &["hub_manager"]);

        handle_initial_spawn(&mut host, &zone(), &table(), visitor);
        handle_initial_spawn(&mut host, &zone(), &table(), manager);

        let visitor = host.player_ref(visitor);
        assert_eq!(visitor.snapshot.position, Some(zone().center));
        assert_eq!(visitor.spawn_point, Some(BlockPos { x: 0, y: 64, z: -1 }));
        let manager = host.player_ref(manager);
        assert_eq!(manager.snapshot.position, Some(zone().center));
        assert!(manager.spawn_point.is_none());
    }

    #[test]
    fn initial_spawn_teleports_while_zone_is_disabled() {
        let mut host = MockHost::new();
        let visitor = host.add_player("Visitor", WorldPos::new(900.0, 70.0, 900.0), &[]);
        let disabled = ZoneConfig {
            center: WorldPos::new(0.0, 0.0, 0.0),
            radius: 0.0,
            ..zone()
        };

        handle_initial_spawn(&mut host, &disabled, &table(), visitor);

        let visitor = host.player_ref(visitor);
        assert_eq!(visitor.snapshot.position, Some(WorldPos::new(0.0, 0.0, 0.0)));
        assert_eq!(visitor.spawn_point, Some(BlockPos { x: 0, y: 0, z: 0 }));
    }
}

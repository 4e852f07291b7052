use hub_runtime::{
    ActorId, CommandOutcome, ZoneDebugReport, ZoneDefaults, MAX_ZONE_RADIUS,
};

use crate::host::ActorHost;
use crate::permissions::{resolve_tags, PermissionLevel, PermissionTable};
use crate::store::{keys, PropertyStore, PropertyValue};
use crate::zone::contains_in;
use crate::zone_config::ZoneConfigCache;

pub const NO_PERMISSION_MESSAGE: &str = "No permission. Required: Hub Manager or higher.";

/// Everything the store-backed administrative commands need.
pub struct CommandContext<'a> {
    pub host: &'a mut dyn ActorHost,
    pub store: &'a mut dyn PropertyStore,
    pub defaults: &'a ZoneDefaults,
    pub permissions: &'a PermissionTable,
}

impl CommandContext<'_> {
    fn require(&self, actor: ActorId, level: PermissionLevel) -> Result<(), CommandOutcome> {
        let tags = resolve_tags(&*self.host, actor);
        if self.permissions.has_permission(&tags, level) {
            Ok(())
        } else {
            Err(CommandOutcome::failure(NO_PERMISSION_MESSAGE))
        }
    }
}

pub fn set_zone_center(ctx: &mut CommandContext<'_>, actor: ActorId) -> CommandOutcome {
    if let Err(denied) = ctx.require(actor, PermissionLevel::HubManager) {
        return denied;
    }
    let position = match ctx.host.player(actor).map(|snapshot| snapshot.position) {
        Ok(Some(position)) => position,
        _ => return CommandOutcome::failure("Unable to read your position."),
    };

    let block = position.floor();
    let writes = [
        (keys::CENTER_X, block.x),
        (keys::CENTER_Y, block.y),
        (keys::CENTER_Z, block.z),
    ];
    let previous: Vec<(&str, Option<PropertyValue>)> =
        writes.iter().map(|(key, _)| (*key, ctx.store.get(key))).collect();
    for (written, (key, value)) in writes.into_iter().enumerate() {
        if let Err(err) = ctx.store.set(key, PropertyValue::Number(value as f64)) {
            tracing::warn!(target: "hub::store", key, error = %err, "zone_center.save_failed");
            restore(&mut *ctx.store, &previous[..written]);
            return CommandOutcome::failure(format!("Failed to save hub location: {err}"));
        }
    }
    tracing::info!(
        target: "hub::rules",
        %actor,
        x = block.x,
        y = block.y,
        z = block.z,
        "zone_center.updated"
    );
    CommandOutcome::success("Hub location saved.")
}

/// Puts back keys written before a failed multi-key update.
fn restore(store: &mut dyn PropertyStore, previous: &[(&str, Option<PropertyValue>)]) {
    for (key, value) in previous {
        let result = match value {
            Some(value) => store.set(key, value.clone()),
            None => store.remove(key),
        };
        if let Err(err) = result {
            tracing::error!(target: "hub::store", key, error = %err, "zone_center.restore_failed");
        }
    }
}

pub fn set_zone_radius(
    ctx: &mut CommandContext<'_>,
    actor: ActorId,
    radius: i64,
) -> CommandOutcome {
    if let Err(denied) = ctx.require(actor, PermissionLevel::HubManager) {
        return denied;
    }
    if !(0..=MAX_ZONE_RADIUS).contains(&radius) {
        return CommandOutcome::failure(format!(
            "Radius must be between 0 and {MAX_ZONE_RADIUS} blocks."
        ));
    }
    if let Err(err) = ctx.store.set(keys::RADIUS, PropertyValue::Number(radius as f64)) {
        tracing::warn!(target: "hub::store", error = %err, "zone_radius.save_failed");
        return CommandOutcome::failure(format!("Failed to save hub radius: {err}"));
    }
    tracing::info!(target: "hub::rules", %actor, radius, "zone_radius.updated");
    CommandOutcome::success(format!("Hub radius set to {radius} blocks."))
}

pub fn ban_held_item(ctx: &mut CommandContext<'_>, actor: ActorId) -> CommandOutcome {
    if let Err(denied) = ctx.require(actor, PermissionLevel::HubManager) {
        return denied;
    }
    let held = match ctx.host.inventory(actor) {
        Ok(Some(inventory)) => inventory.selected_item().map(|stack| stack.type_id.clone()),
        _ => None,
    };
    let Some(type_id) = held else {
        return CommandOutcome::failure("Hold an item to ban it.");
    };

    let mut banned = ZoneConfigCache::read_fresh(&*ctx.store, ctx.defaults).banned_resources;
    if banned.insert(type_id.clone()) {
        let list: Vec<&String> = banned.iter().collect();
        let encoded = match serde_json::to_string(&list) {
            Ok(encoded) => encoded,
            Err(err) => {
                return CommandOutcome::failure(format!("Failed to encode banned list: {err}"))
            }
        };
        if let Err(err) = ctx.store.set(keys::BANNED_RESOURCES, PropertyValue::Text(encoded)) {
            tracing::warn!(target: "hub::store", error = %err, "banned_resources.save_failed");
            return CommandOutcome::failure(format!("Failed to save banned list: {err}"));
        }
        tracing::info!(target: "hub::rules", %actor, item = %type_id, "banned_resources.added");
    }
    CommandOutcome::success(format!("Banned {type_id} from the Hub."))
}

/// Reports the caller's standing against a fresh read of the zone.
pub fn zone_debug(ctx: &mut CommandContext<'_>, actor: ActorId) -> CommandOutcome {
    let snapshot = match ctx.host.player(actor) {
        Ok(snapshot) => snapshot,
        Err(_) => return CommandOutcome::failure("Only players can run this command."),
    };
    let Some(position) = snapshot.position else {
        return CommandOutcome::failure("Unable to read your position.");
    };

    let config = ZoneConfigCache::read_fresh(&*ctx.store, ctx.defaults);
    let tags = resolve_tags(&*ctx.host, actor);
    let report = ZoneDebugReport {
        position,
        center: config.center,
        radius: config.radius,
        distance: position.abs_delta(config.center),
        in_zone: contains_in(position, &snapshot.dimension, &config),
        bypass: ctx.permissions.can_bypass_zone(&tags),
    };
    CommandOutcome::success(report.render())
}

#[cfg(test)]
mod tests {
    use hub_runtime::{PermissionTags, WorldPos};

    use super::*;
    use crate::store::{StoreError, WorldProperties};
    use crate::test_support::MockHost;
    use crate::zone_config::read_zone_config;

    struct Fixture {
        host: MockHost,
        store: WorldProperties,
        defaults: ZoneDefaults,
        permissions: PermissionTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                host: MockHost::new(),
                store: WorldProperties::in_memory(),
                defaults: ZoneDefaults::default(),
                permissions: PermissionTable::from_tags(&PermissionTags::default()),
            }
        }

        fn ctx(&mut self) -> CommandContext<'_> {
            CommandContext {
                host: &mut self.host,
                store: &mut self.store,
                defaults: &self.defaults,
                permissions: &self.permissions,
            }
        }
    }

    #[test]
    fn center_is_floored_and_persisted() {
        let mut fx = Fixture::new();
        let manager = fx
            .host
            .add_player("Manager", WorldPos::new(10.7, 64.2, -3.5), &["hub_manager"]);

        let outcome = set_zone_center(&mut fx.ctx(), manager);
        assert!(outcome.is_success());
        let config = read_zone_config(&fx.store, &fx.defaults);
        assert!(config.center_configured);
        assert_eq!(config.center, WorldPos::new(10.0, 64.0, -4.0));
    }

    #[test]
    fn regular_players_cannot_change_the_zone() {
        let mut fx = Fixture::new();
        let visitor = fx.host.add_player("Visitor", WorldPos::default(), &["helper"]);
        assert_eq!(
            set_zone_radius(&mut fx.ctx(), visitor, 20),
            CommandOutcome::failure(NO_PERMISSION_MESSAGE)
        );
        assert_eq!(
            set_zone_center(&mut fx.ctx(), visitor),
            CommandOutcome::failure(NO_PERMISSION_MESSAGE)
        );
        assert!(fx.store.is_empty());
    }

    #[test]
    fn radius_range_is_enforced() {
        let mut fx = Fixture::new();
        let manager = fx.host.add_player("Manager", WorldPos::default(), &["hub_manager"]);
        assert!(!set_zone_radius(&mut fx.ctx(), manager, -1).is_success());
        assert!(!set_zone_radius(&mut fx.ctx(), manager, MAX_ZONE_RADIUS + 1).is_success());
        assert_eq!(
            set_zone_radius(&mut fx.ctx(), manager, 0),
            CommandOutcome::success("Hub radius set to 0 blocks.")
        );
        assert_eq!(fx.store.get(keys::RADIUS), Some(PropertyValue::Number(0.0)));
    }

    #[test]
    fn banning_requires_a_held_item_and_deduplicates() {
        let mut fx = Fixture::new();
        let manager = fx.host.add_player("Manager", WorldPos::default(), &["hub_manager"]);
        assert_eq!(
            ban_held_item(&mut fx.ctx(), manager),
            CommandOutcome::failure("Hold an item to ban it.")
        );

        fx.host.give(manager, 0, "minecraft:bow");
        assert!(ban_held_item(&mut fx.ctx(), manager).is_success());
        assert!(ban_held_item(&mut fx.ctx(), manager).is_success());

        let config = read_zone_config(&fx.store, &fx.defaults);
        assert!(config.is_banned("minecraft:bow"));
        assert!(config.is_banned("minecraft:tnt"));
        assert_eq!(
            config.banned_resources.len(),
            ZoneDefaults::default().banned_resources.len() + 1
        );
    }

    #[test]
    fn debug_report_reads_fresh_config() {
        let mut fx = Fixture::new();
        let visitor = fx.host.add_player("Visitor", WorldPos::new(50.0, 10.0, -50.0), &[]);
        fx.store.set(keys::CENTER_X, 0.0.into()).unwrap();
        fx.store.set(keys::CENTER_Y, 0.0.into()).unwrap();
        fx.store.set(keys::CENTER_Z, 0.0.into()).unwrap();
        fx.store.set(keys::RADIUS, 100.0.into()).unwrap();

        let outcome = zone_debug(&mut fx.ctx(), visitor);
        assert!(outcome.is_success());
        insta::assert_snapshot!(outcome.message, @r###"
        Hub Debug:
        Position: 50.00, 10.00, -50.00
        Center: 0.00, 0.00, 0.00
        Radius: 100
        Distance X: 50.00 | Z: 50.00 | Y: 10.00
        In Hub Zone: Yes
        Bypass: No
        "###);
    }

    struct RejectingStore;

    impl PropertyStore for RejectingStore {
        fn get(&self, _key: &str) -> Option<PropertyValue> {
            None
        }

        fn set(&mut self, key: &str, _value: PropertyValue) -> Result<(), StoreError> {
            Err(StoreError::Rejected(key.to_string()))
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            Err(StoreError::Rejected(key.to_string()))
        }
    }

    /// In-memory store that refuses writes to one key.
    struct RejectKey {
        inner: WorldProperties,
        rejected: &'static str,
    }

    impl PropertyStore for RejectKey {
        fn get(&self, key: &str) -> Option<PropertyValue> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: PropertyValue) -> Result<(), StoreError> {
            if key == self.rejected {
                return Err(StoreError::Rejected(key.to_string()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_center_update_keeps_the_old_center() {
        let mut host = MockHost::new();
        let manager =
            host.add_player("Manager", WorldPos::new(500.0, 80.0, 500.0), &["hub_manager"]);
        let mut inner = WorldProperties::in_memory();
        for key in [keys::CENTER_X, keys::CENTER_Y, keys::CENTER_Z] {
            inner.set(key, 0.0.into()).unwrap();
        }
        let mut store = RejectKey {
            inner,
            rejected: keys::CENTER_Z,
        };
        let defaults = ZoneDefaults::default();
        let permissions = PermissionTable::from_tags(&PermissionTags::default());
        let mut ctx = CommandContext {
            host: &mut host,
            store: &mut store,
            defaults: &defaults,
            permissions: &permissions,
        };

        let outcome = set_zone_center(&mut ctx, manager);
        assert!(!outcome.is_success());
        let config = read_zone_config(&store, &defaults);
        assert_eq!(config.center, WorldPos::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn failed_center_update_removes_keys_that_were_unset() {
        let mut host = MockHost::new();
        let manager =
            host.add_player("Manager", WorldPos::new(500.0, 80.0, 500.0), &["hub_manager"]);
        let mut store = RejectKey {
            inner: WorldProperties::in_memory(),
            rejected: keys::CENTER_Z,
        };
        let defaults = ZoneDefaults::default();
        let permissions = PermissionTable::from_tags(&PermissionTags::default());
        let mut ctx = CommandContext {
            host: &mut host,
            store: &mut store,
            defaults: &defaults,
            permissions: &permissions,
        };

        assert!(!set_zone_center(&mut ctx, manager).is_success());
        assert!(store.inner.is_empty());
        assert!(!read_zone_config(&store, &defaults).center_configured);
    }

    #[test]
    fn store_failures_become_failure_outcomes() {
        let mut host = MockHost::new();
        let manager = host.add_player("Manager", WorldPos::default(), &["hub_manager"]);
        let mut store = RejectingStore;
        let defaults = ZoneDefaults::default();
        let permissions = PermissionTable::from_tags(&PermissionTags::default());
        let mut ctx = CommandContext {
            host: &mut host,
            store: &mut store,
            defaults: &defaults,
            permissions: &permissions,
        };
        let outcome = set_zone_radius(&mut ctx, manager, 10);
        assert!(!outcome.is_success());
        assert!(outcome.message.contains("hub:radius"));
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use hub_runtime::{WorldPos, ZoneDefaults};

use crate::store::{keys, PropertyStore, PropertyValue};

/// Effective zone settings reconstructed from the property store.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneConfig {
    pub center: WorldPos,
    /// False when the center fell back to the compiled default.
    pub center_configured: bool,
    pub radius: f64,
    pub banned_resources: BTreeSet<String>,
    pub dimension: String,
}

impl ZoneConfig {
    pub fn from_defaults(defaults: &ZoneDefaults) -> Self {
        Self {
            center: defaults.center_pos(),
            center_configured: false,
            radius: defaults.radius,
            banned_resources: defaults.banned_resources.iter().cloned().collect(),
            dimension: defaults.dimension.clone(),
        }
    }

    /// A zone with a non-positive or non-finite radius enforces nothing.
    pub fn is_active(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0
    }

    pub fn is_banned(&self, type_id: &str) -> bool {
        self.banned_resources.contains(type_id)
    }
}

/// Reads the zone settings, falling back to `defaults` key by key. Malformed
/// values are logged and never surface as errors.
pub fn read_zone_config(store: &dyn PropertyStore, defaults: &ZoneDefaults) -> ZoneConfig {
    let mut config = ZoneConfig::from_defaults(defaults);

    let axes = [keys::CENTER_X, keys::CENTER_Y, keys::CENTER_Z].map(|key| read_number(store, key));
    if let [Some(x), Some(y), Some(z)] = axes {
        config.center = WorldPos::new(x, y, z);
        config.center_configured = true;
    }

    if let Some(radius) = read_number(store, keys::RADIUS) {
        config.radius = radius;
    }

    if let Some(banned) = read_banned(store) {
        config.banned_resources = banned;
    }

    config
}

fn read_number(store: &dyn PropertyStore, key: &'static str) -> Option<f64> {
    let value = store.get(key)?;
    match value.as_number().filter(|number| number.is_finite()) {
        Some(number) => Some(number),
        None => {
            tracing::warn!(
                target: "hub::config",
                key,
                value = ?value,
                "zone_config.malformed=number"
            );
            None
        }
    }
}

fn read_banned(store: &dyn PropertyStore) -> Option<BTreeSet<String>> {
    let value = store.get(keys::BANNED_RESOURCES)?;
    let PropertyValue::Text(raw) = &value else {
        tracing::warn!(
            target: "hub::config",
            key = keys::BANNED_RESOURCES,
            value = ?value,
            "zone_config.malformed=banned_resources"
        );
        return None;
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => Some(list.into_iter().collect()),
        Err(err) => {
            tracing::warn!(
                target: "hub::config",
                key = keys::BANNED_RESOURCES,
                error = %err,
                "zone_config.malformed=banned_resources"
            );
            None
        }
    }
}

/// Single-entry cache in front of [`read_zone_config`]. Expiry is the only
/// invalidation, so external edits become visible within one TTL.
#[derive(Debug, Clone)]
pub struct ZoneConfigCache {
    ttl: u64,
    entry: Option<(Arc<ZoneConfig>, u64)>,
}

impl ZoneConfigCache {
    pub fn new(ttl: u64) -> Self {
        Self { ttl, entry: None }
    }

    pub fn get_or_refresh(
        &mut self,
        store: &dyn PropertyStore,
        defaults: &ZoneDefaults,
        now: u64,
    ) -> Arc<ZoneConfig> {
        if let Some((config, stamped_at)) = &self.entry {
            if now.saturating_sub(*stamped_at) < self.ttl {
                return Arc::clone(config);
            }
        }
        let config = Arc::new(read_zone_config(store, defaults));
        self.entry = Some((Arc::clone(&config), now));
        config
    }

    pub fn read_fresh(store: &dyn PropertyStore, defaults: &ZoneDefaults) -> ZoneConfig {
        read_zone_config(store, defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorldProperties;

    fn defaults() -> ZoneDefaults {
        ZoneDefaults {
            center: [10.0, 64.0, -10.0],
            radius: 50.0,
            banned_resources: vec!["minecraft:tnt".to_string()],
            dimension: "overworld".to_string(),
        }
    }

    #[test]
    fn empty_store_yields_defaults() {
        let store = WorldProperties::in_memory();
        let config = read_zone_config(&store, &defaults());
        assert_eq!(config, ZoneConfig::from_defaults(&defaults()));
        assert!(!config.center_configured);
    }

    #[test]
    fn partial_center_keeps_default_center() {
        let mut store = WorldProperties::in_memory();
        store.set(keys::CENTER_X, 1.0.into()).unwrap();
        store.set(keys::CENTER_Y, 2.0.into()).unwrap();
        let config = read_zone_config(&store, &defaults());
        assert_eq!(config.center, WorldPos::new(10.0, 64.0, -10.0));
        assert!(!config.center_configured);
    }

    #[test]
    fn malformed_values_degrade_to_defaults() {
        let mut store = WorldProperties::in_memory();
        store.set(keys::RADIUS, "wide".into()).unwrap();
        store.set(keys::BANNED_RESOURCES, "{not json".into()).unwrap();
        let config = read_zone_config(&store, &defaults());
        assert_eq!(config.radius, 50.0);
        assert!(config.is_banned("minecraft:tnt"));

        store.set(keys::BANNED_RESOURCES, "[1, 2]".into()).unwrap();
        let config = read_zone_config(&store, &defaults());
        assert_eq!(config.banned_resources.len(), 1);
    }

    #[test]
    fn non_finite_radius_is_malformed() {
        let mut store = WorldProperties::in_memory();
        store.set(keys::RADIUS, "NaN".into()).unwrap();
        assert_eq!(read_zone_config(&store, &defaults()).radius, 50.0);
    }

    #[test]
    fn cache_serves_stale_view_until_ttl_expires() {
        let mut store = WorldProperties::in_memory();
        let mut cache = ZoneConfigCache::new(100);
        let first = cache.get_or_refresh(&store, &defaults(), 0);
        assert_eq!(first.radius, 50.0);

        store.set(keys::RADIUS, 75.0.into()).unwrap();
        assert_eq!(cache.get_or_refresh(&store, &defaults(), 99).radius, 50.0);
        assert_eq!(cache.get_or_refresh(&store, &defaults(), 100).radius, 75.0);
        assert_eq!(ZoneConfigCache::read_fresh(&store, &defaults()).radius, 75.0);
    }
}

use hub_runtime::WorldPos;

use crate::zone_config::ZoneConfig;

/// Vertical half-extent of the zone, in blocks above or below the center.
pub const ZONE_HEIGHT_LIMIT: f64 = 256.0;

/// Inclusive box test around the zone center. Horizontal extent is the
/// configured radius on x and z; vertical extent is [`ZONE_HEIGHT_LIMIT`].
pub fn contains(position: WorldPos, config: &ZoneConfig) -> bool {
    if !config.is_active() || !position.is_finite() {
        return false;
    }
    let delta = position.abs_delta(config.center);
    delta.x <= config.radius && delta.z <= config.radius && delta.y <= ZONE_HEIGHT_LIMIT
}

/// [`contains`] restricted to the zone's dimension.
pub fn contains_in(position: WorldPos, dimension: &str, config: &ZoneConfig) -> bool {
    dimension == config.dimension && contains(position, config)
}

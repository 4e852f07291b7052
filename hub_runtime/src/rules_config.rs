//! Tuning for the hub rules: zone defaults, enforcement cadence, permission
//! tag tables and the supporting services.
//!
//! The builtin copy lives in `data/hub_rules.json`; hosts may point at an
//! override file instead. Every section is `#[serde(default)]` so partial
//! overrides only need to name the values they change.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use hub_schema::{EffectSpec, WorldPos, OVERWORLD};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BUILTIN_HUB_RULES_CONFIG: &str = include_str!("data/hub_rules.json");

/// Largest radius the set-zone-radius command accepts.
pub const MAX_ZONE_RADIUS: i64 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HubRulesConfig {
    pub zone: ZoneDefaults,
    pub enforcement: EnforcementSettings,
    pub permissions: PermissionTags,
    pub teleport: TeleportSettings,
    pub regen: RegenSettings,
    pub cleaner: CleanerSettings,
}

impl HubRulesConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_HUB_RULES_CONFIG)
                .expect("builtin hub rules config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read, parse and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, RulesConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| RulesConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = HubRulesConfig::from_json_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RulesValidationError> {
        let mut errors = Vec::new();

        let center = self.zone.center_pos();
        if !center.is_finite() {
            errors.push("zone.center must be finite".to_string());
        }
        if !self.zone.radius.is_finite() || self.zone.radius < 0.0 {
            errors.push(format!(
                "zone.radius must be a non-negative number (got {})",
                self.zone.radius
            ));
        }
        if self.zone.dimension.trim().is_empty() {
            errors.push("zone.dimension must not be empty".to_string());
        }

        let intervals = [
            (
                "enforcement.effect_interval_ticks",
                self.enforcement.effect_interval_ticks,
            ),
            (
                "enforcement.purge_interval_ticks",
                self.enforcement.purge_interval_ticks,
            ),
            (
                "enforcement.cache_sweep_interval_ticks",
                self.enforcement.cache_sweep_interval_ticks,
            ),
            (
                "enforcement.config_cache_ttl_ticks",
                self.enforcement.config_cache_ttl_ticks,
            ),
            ("regen.check_interval_ticks", self.regen.check_interval_ticks),
            ("regen.regen_interval_ticks", self.regen.regen_interval_ticks),
            ("cleaner.cycle_ticks", self.cleaner.cycle_ticks),
            ("cleaner.step_ticks", self.cleaner.step_ticks),
            (
                "cleaner.followup_interval_ticks",
                self.cleaner.followup_interval_ticks,
            ),
        ];
        for (name, value) in intervals {
            if value == 0 {
                errors.push(format!("{name} must be greater than zero"));
            }
        }

        if self.enforcement.tracker_capacity == 0 {
            errors.push("enforcement.tracker_capacity must be greater than zero".to_string());
        }
        for (index, effect) in self.enforcement.effects.iter().enumerate() {
            if effect.effect.trim().is_empty() {
                errors.push(format!("enforcement.effects[{index}] has an empty name"));
            }
        }
        if self.permissions.hub_manager.is_empty() && self.permissions.owner.is_empty() {
            errors.push(
                "permissions.hub_manager and permissions.owner cannot both be empty".to_string(),
            );
        }
        if self.cleaner.item_entity_type.trim().is_empty() {
            errors.push("cleaner.item_entity_type must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(RulesValidationError::new(errors))
        }
    }
}

#[derive(Debug, Error)]
pub enum RulesConfigError {
    #[error("failed to parse hub rules config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read hub rules config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] RulesValidationError),
}

#[derive(Debug, Clone, Error)]
#[error("invalid hub rules config: {}", .errors.join("; "))]
pub struct RulesValidationError {
    errors: Vec<String>,
}

impl RulesValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Fallback values used whenever the persisted zone keys are missing or
/// unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ZoneDefaults {
    pub center: [f64; 3],
    pub radius: f64,
    pub banned_resources: Vec<String>,
    pub dimension: String,
}

impl ZoneDefaults {
    pub fn center_pos(&self) -> WorldPos {
        WorldPos::from_array(self.center)
    }
}

impl Default for ZoneDefaults {
    fn default() -> Self {
        Self {
            center: [9027.0, 100.0, 8978.0],
            radius: 260.0,
            banned_resources: [
                "minecraft:lava_bucket",
                "minecraft:water_bucket",
                "minecraft:powder_snow_bucket",
                "minecraft:cod_bucket",
                "minecraft:salmon_bucket",
                "minecraft:pufferfish_bucket",
                "minecraft:tropical_fish_bucket",
                "minecraft:tadpole_bucket",
                "minecraft:axolotl_bucket",
                "minecraft:glow_squid_bucket",
                "minecraft:tnt",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            dimension: OVERWORLD.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EnforcementSettings {
    pub effect_interval_ticks: u64,
    pub purge_interval_ticks: u64,
    pub cache_sweep_interval_ticks: u64,
    pub config_cache_ttl_ticks: u64,
    /// Window during which effects applied to an actor are not re-sent.
    pub effect_refresh_ticks: u64,
    /// Window during which an actor's inventory is not rescanned.
    pub inventory_recheck_ticks: u64,
    /// Upper bound on entries held by each per-actor tracker.
    pub tracker_capacity: usize,
    pub effects: Vec<EffectSettings>,
    pub hostile_entities: Vec<String>,
}

impl Default for EnforcementSettings {
    fn default() -> Self {
        Self {
            effect_interval_ticks: 20,
            purge_interval_ticks: 40,
            cache_sweep_interval_ticks: 600,
            config_cache_ttl_ticks: 100,
            effect_refresh_ticks: 80,
            inventory_recheck_ticks: 20,
            tracker_capacity: 1024,
            effects: ["resistance", "weakness", "regeneration"]
                .into_iter()
                .map(EffectSettings::protective)
                .collect(),
            hostile_entities: [
                "minecraft:zombie",
                "minecraft:husk",
                "minecraft:drowned",
                "minecraft:skeleton",
                "minecraft:stray",
                "minecraft:creeper",
                "minecraft:spider",
                "minecraft:cave_spider",
                "minecraft:enderman",
                "minecraft:endermite",
                "minecraft:witch",
                "minecraft:vindicator",
                "minecraft:evoker",
                "minecraft:pillager",
                "minecraft:ravager",
                "minecraft:illusioner",
                "minecraft:slime",
                "minecraft:magma_cube",
                "minecraft:phantom",
                "minecraft:guardian",
                "minecraft:elder_guardian",
                "minecraft:hoglin",
                "minecraft:zoglin",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EffectSettings {
    pub effect: String,
    #[serde(default = "default_effect_duration")]
    pub duration_ticks: u32,
    #[serde(default = "default_effect_amplifier")]
    pub amplifier: u8,
    #[serde(default)]
    pub show_particles: bool,
}

fn default_effect_duration() -> u32 {
    100
}

fn default_effect_amplifier() -> u8 {
    u8::MAX
}

impl EffectSettings {
    fn protective(name: &str) -> Self {
        Self {
            effect: name.to_string(),
            duration_ticks: default_effect_duration(),
            amplifier: default_effect_amplifier(),
            show_particles: false,
        }
    }

    pub fn to_spec(&self) -> EffectSpec {
        EffectSpec {
            effect: self.effect.clone(),
            duration_ticks: self.duration_ticks,
            amplifier: self.amplifier,
            show_particles: self.show_particles,
        }
    }
}

/// Role-marker tags granting each permission level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PermissionTags {
    pub owner: Vec<String>,
    pub admin: Vec<String>,
    pub moderator: Vec<String>,
    pub helper: Vec<String>,
    pub broadcast_manager: Vec<String>,
    pub hub_manager: Vec<String>,
}

impl Default for PermissionTags {
    fn default() -> Self {
        let staff = |extra: &str| -> Vec<String> {
            ["staff", "admin", "Admin", extra]
                .into_iter()
                .map(String::from)
                .collect()
        };
        Self {
            owner: staff("owner"),
            admin: staff("admin_manager"),
            moderator: staff("moderator"),
            helper: vec!["helper".to_string()],
            broadcast_manager: staff("broadcast_manager"),
            hub_manager: staff("hub_manager"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TeleportSettings {
    pub cooldown_ticks: u64,
    pub combat_lock_ticks: u64,
}

impl Default for TeleportSettings {
    fn default() -> Self {
        Self {
            cooldown_ticks: 100,
            combat_lock_ticks: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RegenSettings {
    pub enabled: bool,
    pub check_interval_ticks: u64,
    pub regen_interval_ticks: u64,
    pub combat_grace_ticks: u64,
    /// Players at or below this health are left alone.
    pub health_floor: f32,
    pub amount: f32,
}

impl Default for RegenSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_ticks: 20,
            regen_interval_ticks: 40,
            combat_grace_ticks: 60,
            health_floor: 10.0,
            amount: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CleanerSettings {
    pub enabled: bool,
    pub cycle_ticks: u64,
    pub announce_interval_ticks: u64,
    /// Granularity of the cleaner clock and of the countdown.
    pub step_ticks: u64,
    pub countdown_seconds: u32,
    pub followup_attempts: u32,
    pub followup_interval_ticks: u64,
    pub item_entity_type: String,
    pub void_position: [f64; 3],
}

impl CleanerSettings {
    pub fn void_pos(&self) -> WorldPos {
        WorldPos::from_array(self.void_position)
    }
}

impl Default for CleanerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            cycle_ticks: 24_000,
            announce_interval_ticks: 6_000,
            step_ticks: 20,
            countdown_seconds: 10,
            followup_attempts: 4,
            followup_interval_ticks: 20,
            item_entity_type: "minecraft:item".to_string(),
            void_position: [0.0, -256.0, 0.0],
        }
    }
}

pub fn rules_config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(HubRulesConfig)
}

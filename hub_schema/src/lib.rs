//! Data contracts shared by the hub crates.
//!
//! Everything here is plain serde data: positions, identifiers, item stacks,
//! effect descriptions and the structured result returned by administrative
//! commands. Nothing in this crate touches the host world.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dimension the hub zone lives in unless configured otherwise.
pub const OVERWORLD: &str = "overworld";

/// Stable identifier for anything the host tracks: players, creatures and
/// ground items share one id space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuous world coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPos {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    /// Snap to the containing block.
    pub fn floor(self) -> BlockPos {
        BlockPos {
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            z: self.z.floor() as i64,
        }
    }

    /// Per-axis absolute distance to `other`.
    pub fn abs_delta(self, other: WorldPos) -> WorldPos {
        WorldPos {
            x: (self.x - other.x).abs(),
            y: (self.y - other.y).abs(),
            z: (self.z - other.z).abs(),
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}, {:.2}, {:.2}", self.x, self.y, self.z)
    }
}

/// Integer block coordinate, used for spawn points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl BlockPos {
    pub fn to_world(self) -> WorldPos {
        WorldPos::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

/// A stack of items sitting in an inventory slot or on the ground.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub type_id: String,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

fn default_amount() -> u32 {
    1
}

impl ItemStack {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            amount: 1,
        }
    }

    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    /// Identifier with any `namespace:` prefix removed, for player-facing text.
    pub fn short_name(&self) -> &str {
        short_type_name(&self.type_id)
    }
}

/// Strips a `namespace:` prefix from a resource identifier.
pub fn short_type_name(type_id: &str) -> &str {
    type_id
        .split_once(':')
        .map(|(_, name)| name)
        .unwrap_or(type_id)
}

/// A status effect the host can apply to an actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub effect: String,
    pub duration_ticks: u32,
    pub amplifier: u8,
    #[serde(default)]
    pub show_particles: bool,
}

/// Two-valued result of every administrative command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
    Failure,
}

/// Structured command result handed back to the host's command dispatcher.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub status: CommandStatus,
    pub message: String,
}

impl CommandOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// Everything the zone-debug command reports about the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneDebugReport {
    pub position: WorldPos,
    pub center: WorldPos,
    pub radius: f64,
    pub distance: WorldPos,
    pub in_zone: bool,
    pub bypass: bool,
}

impl ZoneDebugReport {
    pub fn render(&self) -> String {
        format!(
            "Hub Debug:\n\
             Position: {}\n\
             Center: {}\n\
             Radius: {}\n\
             Distance X: {:.2} | Z: {:.2} | Y: {:.2}\n\
             In Hub Zone: {}\n\
             Bypass: {}",
            self.position,
            self.center,
            self.radius,
            self.distance.x,
            self.distance.z,
            self.distance.y,
            yes_no(self.in_zone),
            yes_no(self.bypass),
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

use hub_schema::{ActorId, WorldPos};

/// Administrative and player commands routed to the hub engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// Store the caller's floored position as the zone center.
    SetZoneCenter,
    /// Store a new zone radius; accepted range is `0..=MAX_ZONE_RADIUS`.
    SetZoneRadius { radius: i64 },
    /// Add the caller's selected item to the banned-resource list.
    BanHeldItem,
    /// Report the caller's position, the zone and membership.
    ZoneDebug,
    /// Teleport the caller to the zone center after cooldown and combat checks.
    Hub,
    /// Sweep all ground items immediately.
    Cleaner,
}

impl AdminCommand {
    pub fn name(&self) -> &'static str {
        match self {
            AdminCommand::SetZoneCenter => "set-zone-center",
            AdminCommand::SetZoneRadius { .. } => "set-zone-radius",
            AdminCommand::BanHeldItem => "ban-held-item",
            AdminCommand::ZoneDebug => "zone-debug",
            AdminCommand::Hub => "hub",
            AdminCommand::Cleaner => "cleaner",
        }
    }
}

/// Commands accepted by the sandbox host. They stand in for the live game
/// world: each one either mutates the sandbox or raises a host event.
#[derive(Debug, Clone, PartialEq)]
pub enum SandboxCommand {
    Tick {
        steps: u32,
    },
    Join {
        name: String,
        position: WorldPos,
        tags: Vec<String>,
    },
    Leave {
        actor: ActorId,
    },
    Move {
        actor: ActorId,
        position: WorldPos,
    },
    Tag {
        actor: ActorId,
        tag: String,
    },
    Give {
        actor: ActorId,
        item: String,
        slot: Option<usize>,
    },
    Select {
        actor: ActorId,
        slot: usize,
    },
    Break {
        actor: ActorId,
        block: WorldPos,
    },
    Interact {
        actor: ActorId,
        block: WorldPos,
    },
    Use {
        actor: ActorId,
    },
    Hurt {
        victim: ActorId,
        amount: f32,
        attacker: Option<ActorId>,
    },
    Explode {
        position: WorldPos,
        dimension: String,
    },
    Spawn {
        entity_type: String,
        position: WorldPos,
        dimension: String,
    },
    Drop {
        item: String,
        position: WorldPos,
        dimension: String,
    },
    Admin {
        actor: ActorId,
        command: AdminCommand,
    },
}

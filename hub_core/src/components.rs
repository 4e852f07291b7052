use bevy::prelude::*;
use hub_runtime::{ActorId, BlockPos, EffectSpec, ItemStack, WorldPos};

pub const INVENTORY_SIZE: usize = 36;

/// Host-wide identifier carried by every tracked entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostId(pub ActorId);

/// Marks a player.
#[derive(Component, Debug, Clone)]
pub struct Actor {
    pub name: String,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub WorldPos);

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Dimension(pub String);

#[derive(Component, Debug, Clone, Default)]
pub struct RoleTags(pub Vec<String>);

impl RoleTags {
    pub fn add(&mut self, tag: &str) {
        if !self.0.iter().any(|existing| existing == tag) {
            self.0.push(tag.to_string());
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct Inventory {
    pub slots: Vec<Option<ItemStack>>,
    pub selected: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SIZE],
            selected: 0,
        }
    }
}

impl Inventory {
    /// Places `item` in `slot`, or the first empty slot. Returns the slot used.
    pub fn give(&mut self, item: ItemStack, slot: Option<usize>) -> Option<usize> {
        let target = match slot {
            Some(slot) if slot < self.slots.len() => slot,
            Some(_) => return None,
            None => self.slots.iter().position(Option::is_none)?,
        };
        self.slots[target] = Some(item);
        Some(target)
    }

    pub fn select(&mut self, slot: usize) -> bool {
        if slot < self.slots.len() {
            self.selected = slot;
            true
        } else {
            false
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self {
            current: 20.0,
            max: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEffect {
    pub spec: EffectSpec,
    pub remaining_ticks: u32,
}

#[derive(Component, Debug, Clone, Default)]
pub struct ActiveEffects {
    pub effects: Vec<ActiveEffect>,
}

impl ActiveEffects {
    /// Re-applying an effect replaces it and restarts its duration.
    pub fn apply(&mut self, spec: &EffectSpec) {
        self.effects.retain(|active| active.spec.effect != spec.effect);
        self.effects.push(ActiveEffect {
            spec: spec.clone(),
            remaining_ticks: spec.duration_ticks,
        });
    }

    pub fn has(&self, effect: &str) -> bool {
        self.effects.iter().any(|active| active.spec.effect == effect)
    }

    pub fn tick(&mut self) {
        for active in &mut self.effects {
            active.remaining_ticks = active.remaining_ticks.saturating_sub(1);
        }
        self.effects.retain(|active| active.remaining_ticks > 0);
    }
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SpawnPoint {
    pub point: BlockPos,
    pub dimension: String,
}

/// Chat lines delivered to a player.
#[derive(Component, Debug, Clone, Default)]
pub struct Inbox(pub Vec<String>);

/// Type identifier of a non-player entity (`minecraft:zombie`, `minecraft:item`).
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EntityType(pub String);

/// The item stack a ground-item entity carries.
#[derive(Component, Debug, Clone)]
pub struct DroppedItem(pub ItemStack);

/// Entities the host refuses to despawn.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Indestructible;

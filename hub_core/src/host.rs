//! Binding between the engine and the world it governs.
//!
//! The engine never owns actors or entities. Every read and mutation goes
//! through [`ActorHost`], and every call can fail independently; call sites
//! decide whether a failure is skipped, logged or counted.

use hub_runtime::{ActorId, BlockPos, EffectSpec, ItemStack, WorldPos};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("actor {0} is not available")]
    ActorUnavailable(ActorId),
    #[error("entity {0} is not available")]
    EntityUnavailable(ActorId),
    #[error("{call} failed for {target}: {reason}")]
    CallFailed {
        call: &'static str,
        target: ActorId,
        reason: String,
    },
}

impl HostError {
    pub fn call_failed(call: &'static str, target: ActorId, reason: impl Into<String>) -> Self {
        HostError::CallFailed {
            call,
            target,
            reason: reason.into(),
        }
    }
}

/// Per-tick view of a player.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorSnapshot {
    pub id: ActorId,
    pub name: String,
    pub position: Option<WorldPos>,
    pub dimension: String,
}

/// Per-tick view of a non-player entity (creatures, ground items).
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: ActorId,
    pub entity_type: String,
    pub position: Option<WorldPos>,
    pub dimension: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryView {
    pub slots: Vec<Option<ItemStack>>,
    pub selected: usize,
}

impl InventoryView {
    pub fn selected_item(&self) -> Option<&ItemStack> {
        self.slots.get(self.selected).and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthState {
    pub current: f32,
    pub max: f32,
}

pub trait ActorHost {
    /// Online players in the host's enumeration order. One unreadable
    /// player is left out rather than failing the whole list.
    fn players(&self) -> Result<Vec<ActorSnapshot>, HostError>;
    fn player(&self, id: ActorId) -> Result<ActorSnapshot, HostError>;
    fn is_online(&self, id: ActorId) -> bool;
    fn tags(&self, id: ActorId) -> Result<Vec<String>, HostError>;

    /// `None` when the actor carries no container.
    fn inventory(&self, id: ActorId) -> Result<Option<InventoryView>, HostError>;
    fn clear_slot(&mut self, id: ActorId, slot: usize) -> Result<(), HostError>;

    fn apply_effect(&mut self, id: ActorId, effect: &EffectSpec) -> Result<(), HostError>;

    /// Health of any living entity; `None` when it has no health pool.
    fn health(&self, id: ActorId) -> Result<Option<HealthState>, HostError>;
    fn set_health(&mut self, id: ActorId, value: f32) -> Result<(), HostError>;

    fn notify(&mut self, id: ActorId, message: &str) -> Result<(), HostError>;
    fn broadcast(&mut self, message: &str) -> Result<(), HostError>;

    fn teleport(&mut self, id: ActorId, position: WorldPos, dimension: &str)
        -> Result<(), HostError>;
    fn set_spawn_point(
        &mut self,
        id: ActorId,
        point: BlockPos,
        dimension: &str,
    ) -> Result<(), HostError>;

    fn dimensions(&self) -> Vec<String>;
    /// Non-player entities in `dimension`.
    fn entities(&self, dimension: &str) -> Result<Vec<EntitySnapshot>, HostError>;
    /// Any tracked entity, players included.
    fn entity(&self, id: ActorId) -> Result<EntitySnapshot, HostError>;
    fn remove_entity(&mut self, id: ActorId) -> Result<(), HostError>;
}

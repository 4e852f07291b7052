//! [`ActorHost`] over a Bevy [`World`].
//!
//! Players and entities live as ECS entities tagged with [`HostId`]; the
//! [`ActorIndex`] resource maps host ids back to entities. A call against an
//! entity missing the component it needs fails with [`HostError::CallFailed`],
//! which is how the sandbox simulates a host that refuses an operation.

use bevy::prelude::*;
use hub_runtime::{ActorId, BlockPos, EffectSpec, ItemStack, WorldPos, OVERWORLD};

use crate::components::{
    ActiveEffects, Actor, Dimension, DroppedItem, EntityType, Health, HostId, Inbox,
    Indestructible, Inventory, Position, RoleTags, SpawnPoint,
};
use crate::host::{
    ActorHost, ActorSnapshot, EntitySnapshot, HealthState, HostError, InventoryView,
};
use crate::resources::{ActorIndex, BroadcastLog};

pub const KNOWN_DIMENSIONS: [&str; 3] = [OVERWORLD, "nether", "the_end"];
pub const PLAYER_ENTITY_TYPE: &str = "minecraft:player";
pub const ITEM_ENTITY_TYPE: &str = "minecraft:item";

/// Spawns a fully equipped player and registers it in the [`ActorIndex`].
pub fn spawn_player(world: &mut World, name: &str, position: WorldPos, tags: &[String]) -> ActorId {
    let id = world.resource_mut::<ActorIndex>().allocate();
    let entity = world
        .spawn((
            HostId(id),
            Actor {
                name: name.to_string(),
            },
            Position(position),
            Dimension(OVERWORLD.to_string()),
            RoleTags(tags.to_vec()),
            Inventory::default(),
            Health::default(),
            ActiveEffects::default(),
            Inbox::default(),
        ))
        .id();
    world.resource_mut::<ActorIndex>().insert(id, entity, true);
    id
}

/// Spawns a non-player entity. Living entities get a health pool.
pub fn spawn_entity(
    world: &mut World,
    entity_type: &str,
    position: WorldPos,
    dimension: &str,
) -> ActorId {
    let id = world.resource_mut::<ActorIndex>().allocate();
    let mut entity = world.spawn((
        HostId(id),
        EntityType(entity_type.to_string()),
        Position(position),
        Dimension(dimension.to_string()),
    ));
    if entity_type != ITEM_ENTITY_TYPE {
        entity.insert(Health::default());
    }
    let entity = entity.id();
    world.resource_mut::<ActorIndex>().insert(id, entity, false);
    id
}

pub fn spawn_dropped_item(
    world: &mut World,
    item: ItemStack,
    position: WorldPos,
    dimension: &str,
) -> ActorId {
    let id = spawn_entity(world, ITEM_ENTITY_TYPE, position, dimension);
    if let Some(entity) = world.resource::<ActorIndex>().entity(id) {
        world.entity_mut(entity).insert(DroppedItem(item));
    }
    id
}

/// Removes any tracked entity, players included. Returns false if unknown.
pub fn despawn(world: &mut World, id: ActorId) -> bool {
    match world.resource_mut::<ActorIndex>().remove(id) {
        Some(entity) => world.despawn(entity),
        None => false,
    }
}

pub struct EcsHost<'w> {
    world: &'w mut World,
}

impl<'w> EcsHost<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    fn lookup(&self, id: ActorId) -> Option<Entity> {
        self.world.resource::<ActorIndex>().entity(id)
    }

    fn player_entity(&self, id: ActorId) -> Result<Entity, HostError> {
        self.world
            .resource::<ActorIndex>()
            .find_player(id)
            .ok_or(HostError::ActorUnavailable(id))
    }

    fn actor_snapshot(&self, id: ActorId, entity: Entity) -> Result<ActorSnapshot, HostError> {
        let entity_ref = self
            .world
            .get_entity(entity)
            .ok_or(HostError::ActorUnavailable(id))?;
        let actor = entity_ref
            .get::<Actor>()
            .ok_or(HostError::ActorUnavailable(id))?;
        Ok(ActorSnapshot {
            id,
            name: actor.name.clone(),
            position: entity_ref.get::<Position>().map(|position| position.0),
            dimension: dimension_of(entity_ref.get::<Dimension>()),
        })
    }

    fn entity_snapshot(&self, id: ActorId, entity: Entity) -> Result<EntitySnapshot, HostError> {
        let entity_ref = self
            .world
            .get_entity(entity)
            .ok_or(HostError::EntityUnavailable(id))?;
        let entity_type = match (entity_ref.get::<EntityType>(), entity_ref.get::<Actor>()) {
            (Some(entity_type), _) => entity_type.0.clone(),
            (None, Some(_)) => PLAYER_ENTITY_TYPE.to_string(),
            (None, None) => return Err(HostError::EntityUnavailable(id)),
        };
        Ok(EntitySnapshot {
            id,
            entity_type,
            position: entity_ref.get::<Position>().map(|position| position.0),
            dimension: dimension_of(entity_ref.get::<Dimension>()),
        })
    }
}

fn dimension_of(dimension: Option<&Dimension>) -> String {
    dimension
        .map(|dimension| dimension.0.clone())
        .unwrap_or_else(|| OVERWORLD.to_string())
}

impl ActorHost for EcsHost<'_> {
    /// Players whose snapshot cannot be read are logged and left out.
    fn players(&self) -> Result<Vec<ActorSnapshot>, HostError> {
        let index = self.world.resource::<ActorIndex>();
        let players = index
            .players()
            .iter()
            .filter_map(|id| index.entity(*id).map(|entity| (*id, entity)))
            .filter_map(|(id, entity)| match self.actor_snapshot(id, entity) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    tracing::warn!(
                        target: "hub::sandbox",
                        actor = %id,
                        error = %err,
                        "players.snapshot_skipped"
                    );
                    None
                }
            })
            .collect();
        Ok(players)
    }

    fn player(&self, id: ActorId) -> Result<ActorSnapshot, HostError> {
        let entity = self.player_entity(id)?;
        self.actor_snapshot(id, entity)
    }

    fn is_online(&self, id: ActorId) -> bool {
        self.player_entity(id).is_ok()
    }

    fn tags(&self, id: ActorId) -> Result<Vec<String>, HostError> {
        let entity = self.player_entity(id)?;
        self.world
            .get::<RoleTags>(entity)
            .map(|tags| tags.0.clone())
            .ok_or_else(|| HostError::call_failed("tags", id, "no role tags"))
    }

    fn inventory(&self, id: ActorId) -> Result<Option<InventoryView>, HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        Ok(self.world.get::<Inventory>(entity).map(|inventory| InventoryView {
            slots: inventory.slots.clone(),
            selected: inventory.selected,
        }))
    }

    fn clear_slot(&mut self, id: ActorId, slot: usize) -> Result<(), HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        let mut inventory = self
            .world
            .get_mut::<Inventory>(entity)
            .ok_or_else(|| HostError::call_failed("clear_slot", id, "no inventory"))?;
        match inventory.slots.get_mut(slot) {
            Some(stack) => {
                *stack = None;
                Ok(())
            }
            None => Err(HostError::call_failed(
                "clear_slot",
                id,
                format!("slot {slot} out of range"),
            )),
        }
    }

    fn apply_effect(&mut self, id: ActorId, effect: &EffectSpec) -> Result<(), HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        let mut effects = self
            .world
            .get_mut::<ActiveEffects>(entity)
            .ok_or_else(|| HostError::call_failed("apply_effect", id, "entity rejects effects"))?;
        effects.apply(effect);
        Ok(())
    }

    fn health(&self, id: ActorId) -> Result<Option<HealthState>, HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        Ok(self.world.get::<Health>(entity).map(|health| HealthState {
            current: health.current,
            max: health.max,
        }))
    }

    fn set_health(&mut self, id: ActorId, value: f32) -> Result<(), HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        let mut health = self
            .world
            .get_mut::<Health>(entity)
            .ok_or_else(|| HostError::call_failed("set_health", id, "no health pool"))?;
        health.current = value.clamp(0.0, health.max);
        Ok(())
    }

    fn notify(&mut self, id: ActorId, message: &str) -> Result<(), HostError> {
        let entity = self.player_entity(id)?;
        let mut inbox = self
            .world
            .get_mut::<Inbox>(entity)
            .ok_or_else(|| HostError::call_failed("notify", id, "no chat channel"))?;
        inbox.0.push(message.to_string());
        Ok(())
    }

    fn broadcast(&mut self, message: &str) -> Result<(), HostError> {
        let recipients: Vec<Entity> = {
            let index = self.world.resource::<ActorIndex>();
            index
                .players()
                .iter()
                .filter_map(|id| index.entity(*id))
                .collect()
        };
        for entity in recipients {
            if let Some(mut inbox) = self.world.get_mut::<Inbox>(entity) {
                inbox.0.push(message.to_string());
            }
        }
        self.world.resource_mut::<BroadcastLog>().record(message);
        Ok(())
    }

    fn teleport(
        &mut self,
        id: ActorId,
        position: WorldPos,
        dimension: &str,
    ) -> Result<(), HostError> {
        if !position.is_finite() {
            return Err(HostError::call_failed("teleport", id, "non-finite destination"));
        }
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        let mut entity_mut = self
            .world
            .get_entity_mut(entity)
            .ok_or(HostError::EntityUnavailable(id))?;
        entity_mut.insert((Position(position), Dimension(dimension.to_string())));
        Ok(())
    }

    fn set_spawn_point(
        &mut self,
        id: ActorId,
        point: BlockPos,
        dimension: &str,
    ) -> Result<(), HostError> {
        let entity = self.player_entity(id)?;
        let mut entity_mut = self
            .world
            .get_entity_mut(entity)
            .ok_or(HostError::ActorUnavailable(id))?;
        entity_mut.insert(SpawnPoint {
            point,
            dimension: dimension.to_string(),
        });
        Ok(())
    }

    fn dimensions(&self) -> Vec<String> {
        KNOWN_DIMENSIONS.iter().map(|name| name.to_string()).collect()
    }

    fn entities(&self, dimension: &str) -> Result<Vec<EntitySnapshot>, HostError> {
        let mut snapshots: Vec<EntitySnapshot> = self
            .world
            .iter_entities()
            .filter(|entity_ref| !entity_ref.contains::<Actor>())
            .filter_map(|entity_ref| {
                let id = entity_ref.get::<HostId>()?.0;
                let entity_type = entity_ref.get::<EntityType>()?.0.clone();
                let entity_dimension = dimension_of(entity_ref.get::<Dimension>());
                (entity_dimension == dimension).then(|| EntitySnapshot {
                    id,
                    entity_type,
                    position: entity_ref.get::<Position>().map(|position| position.0),
                    dimension: entity_dimension,
                })
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Ok(snapshots)
    }

    fn entity(&self, id: ActorId) -> Result<EntitySnapshot, HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        self.entity_snapshot(id, entity)
    }

    fn remove_entity(&mut self, id: ActorId) -> Result<(), HostError> {
        let entity = self.lookup(id).ok_or(HostError::EntityUnavailable(id))?;
        if self.world.get::<Actor>(entity).is_some() {
            return Err(HostError::call_failed("remove_entity", id, "players cannot be removed"));
        }
        if self.world.get::<Indestructible>(entity).is_some() {
            return Err(HostError::call_failed("remove_entity", id, "entity is indestructible"));
        }
        if despawn(self.world, id) {
            Ok(())
        } else {
            Err(HostError::EntityUnavailable(id))
        }
    }
}

use std::collections::HashSet;

use hub_runtime::{ActorId, BlockPos, EffectSpec, ItemStack, WorldPos, OVERWORLD};

use crate::host::{
    ActorHost, ActorSnapshot, EntitySnapshot, HealthState, HostError, InventoryView,
};

#[derive(Debug, Clone)]
pub struct MockPlayer {
    pub snapshot: ActorSnapshot,
    pub tags: Vec<String>,
    pub inventory: Option<InventoryView>,
    pub health: Option<HealthState>,
    pub effects: Vec<EffectSpec>,
    pub messages: Vec<String>,
    pub spawn_point: Option<BlockPos>,
}

#[derive(Debug, Clone)]
pub struct MockEntity {
    pub snapshot: EntitySnapshot,
    pub health: Option<HealthState>,
}

/// In-memory host with per-call failure injection.
#[derive(Debug, Default)]
pub struct MockHost {
    pub players: Vec<MockPlayer>,
    pub entities: Vec<MockEntity>,
    pub broadcasts: Vec<String>,
    failing: HashSet<(&'static str, ActorId)>,
    next_id: u64,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn add_player(&mut self, name: &str, position: WorldPos, tags: &[&str]) -> ActorId {
        let id = self.allocate();
        self.players.push(MockPlayer {
            snapshot: ActorSnapshot {
                id,
                name: name.to_string(),
                position: Some(position),
                dimension: OVERWORLD.to_string(),
            },
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            inventory: Some(InventoryView {
                slots: vec![None; 9],
                selected: 0,
            }),
            health: Some(HealthState {
                current: 20.0,
                max: 20.0,
            }),
            effects: Vec::new(),
            messages: Vec::new(),
            spawn_point: None,
        });
        id
    }

    pub fn add_entity(
        &mut self,
        entity_type: &str,
        position: WorldPos,
        dimension: &str,
    ) -> ActorId {
        let id = self.allocate();
        self.entities.push(MockEntity {
            snapshot: EntitySnapshot {
                id,
                entity_type: entity_type.to_string(),
                position: Some(position),
                dimension: dimension.to_string(),
            },
            health: Some(HealthState {
                current: 20.0,
                max: 20.0,
            }),
        });
        id
    }

    pub fn fail(&mut self, call: &'static str, id: ActorId) {
        self.failing.insert((call, id));
    }

    pub fn give(&mut self, id: ActorId, slot: usize, item: &str) {
        if let Some(inventory) = self.player_mut(id).and_then(|p| p.inventory.as_mut()) {
            inventory.slots[slot] = Some(ItemStack::new(item));
        }
    }

    pub fn player_ref(&self, id: ActorId) -> &MockPlayer {
        self.players
            .iter()
            .find(|p| p.snapshot.id == id)
            .expect("mock player exists")
    }

    pub fn player_mut(&mut self, id: ActorId) -> Option<&mut MockPlayer> {
        self.players.iter_mut().find(|p| p.snapshot.id == id)
    }

    fn allocate(&mut self) -> ActorId {
        self.next_id += 1;
        ActorId(self.next_id)
    }

    fn check(&self, call: &'static str, id: ActorId) -> Result<(), HostError> {
        if self.failing.contains(&(call, id)) {
            Err(HostError::call_failed(call, id, "injected failure"))
        } else {
            Ok(())
        }
    }

    fn find_player(&self, id: ActorId) -> Result<&MockPlayer, HostError> {
        self.players
            .iter()
            .find(|p| p.snapshot.id == id)
            .ok_or(HostError::ActorUnavailable(id))
    }

    fn find_player_mut(&mut self, id: ActorId) -> Result<&mut MockPlayer, HostError> {
        self.player_mut(id).ok_or(HostError::ActorUnavailable(id))
    }
}

impl ActorHost for MockHost {
    fn players(&self) -> Result<Vec<ActorSnapshot>, HostError> {
        Ok(self.players.iter().map(|p| p.snapshot.clone()).collect())
    }

    fn player(&self, id: ActorId) -> Result<ActorSnapshot, HostError> {
        self.check("player", id)?;
        self.find_player(id).map(|p| p.snapshot.clone())
    }

    fn is_online(&self, id: ActorId) -> bool {
        self.players.iter().any(|p| p.snapshot.id == id)
    }

    fn tags(&self, id: ActorId) -> Result<Vec<String>, HostError> {
        self.check("tags", id)?;
        self.find_player(id).map(|p| p.tags.clone())
    }

    fn inventory(&self, id: ActorId) -> Result<Option<InventoryView>, HostError> {
        self.check("inventory", id)?;
        self.find_player(id).map(|p| p.inventory.clone())
    }

    fn clear_slot(&mut self, id: ActorId, slot: usize) -> Result<(), HostError> {
        self.check("clear_slot", id)?;
        let player = self.find_player_mut(id)?;
        if let Some(entry) = player
            .inventory
            .as_mut()
            .and_then(|inv| inv.slots.get_mut(slot))
        {
            *entry = None;
        }
        Ok(())
    }

    fn apply_effect(&mut self, id: ActorId, effect: &EffectSpec) -> Result<(), HostError> {
        self.check("apply_effect", id)?;
        self.find_player_mut(id)?.effects.push(effect.clone());
        Ok(())
    }

    fn health(&self, id: ActorId) -> Result<Option<HealthState>, HostError> {
        self.check("health", id)?;
        if let Ok(player) = self.find_player(id) {
            return Ok(player.health);
        }
        self.entities
            .iter()
            .find(|e| e.snapshot.id == id)
            .map(|e| e.health)
            .ok_or(HostError::EntityUnavailable(id))
    }

    fn set_health(&mut self, id: ActorId, value: f32) -> Result<(), HostError> {
        self.check("set_health", id)?;
        let slot = if self.is_online(id) {
            self.player_mut(id).and_then(|p| p.health.as_mut())
        } else {
            self.entities
                .iter_mut()
                .find(|e| e.snapshot.id == id)
                .and_then(|e| e.health.as_mut())
        };
        match slot {
            Some(health) => {
                health.current = value.min(health.max);
                Ok(())
            }
            None => Err(HostError::EntityUnavailable(id)),
        }
    }

    fn notify(&mut self, id: ActorId, message: &str) -> Result<(), HostError> {
        self.check("notify", id)?;
        self.find_player_mut(id)?.messages.push(message.to_string());
        Ok(())
    }

    fn broadcast(&mut self, message: &str) -> Result<(), HostError> {
        self.broadcasts.push(message.to_string());
        Ok(())
    }

    fn teleport(
        &mut self,
        id: ActorId,
        position: WorldPos,
        dimension: &str,
    ) -> Result<(), HostError> {
        self.check("teleport", id)?;
        if let Some(player) = self.player_mut(id) {
            player.snapshot.position = Some(position);
            player.snapshot.dimension = dimension.to_string();
            return Ok(());
        }
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.snapshot.id == id)
            .ok_or(HostError::EntityUnavailable(id))?;
        entity.snapshot.position = Some(position);
        entity.snapshot.dimension = dimension.to_string();
        Ok(())
    }

    fn set_spawn_point(
        &mut self,
        id: ActorId,
        point: BlockPos,
        _dimension: &str,
    ) -> Result<(), HostError> {
        self.check("set_spawn_point", id)?;
        self.find_player_mut(id)?.spawn_point = Some(point);
        Ok(())
    }

    fn dimensions(&self) -> Vec<String> {
        vec![
            OVERWORLD.to_string(),
            "nether".to_string(),
            "the_end".to_string(),
        ]
    }

    fn entities(&self, dimension: &str) -> Result<Vec<EntitySnapshot>, HostError> {
        Ok(self
            .entities
            .iter()
            .filter(|e| e.snapshot.dimension == dimension)
            .map(|e| e.snapshot.clone())
            .collect())
    }

    fn entity(&self, id: ActorId) -> Result<EntitySnapshot, HostError> {
        if let Ok(player) = self.find_player(id) {
            return Ok(EntitySnapshot {
                id,
                entity_type: "minecraft:player".to_string(),
                position: player.snapshot.position,
                dimension: player.snapshot.dimension.clone(),
            });
        }
        self.entities
            .iter()
            .find(|e| e.snapshot.id == id)
            .map(|e| e.snapshot.clone())
            .ok_or(HostError::EntityUnavailable(id))
    }

    fn remove_entity(&mut self, id: ActorId) -> Result<(), HostError> {
        self.check("remove_entity", id)?;
        let before = self.entities.len();
        self.entities.retain(|e| e.snapshot.id != id);
        if self.entities.len() == before {
            return Err(HostError::EntityUnavailable(id));
        }
        Ok(())
    }
}

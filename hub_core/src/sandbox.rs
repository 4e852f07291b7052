//! Applies [`SandboxCommand`]s to a headless app.
//!
//! The sandbox stands in for a live game world. Commands that would be game
//! events in a real host are dispatched to the engine immediately so the
//! caller sees the verdict.

use std::fmt;

use bevy::prelude::*;
use hub_runtime::{ActorId, CommandOutcome, ItemStack, SandboxCommand, WorldPos};
use thiserror::Error;

use crate::components::{Health, Inventory, Position, RoleTags};
use crate::ecs_host::{despawn, spawn_dropped_item, spawn_entity, spawn_player};
use crate::guards::{EventVerdict, HostEvent};
use crate::resources::{ActorIndex, HubTick};
use crate::systems::{dispatch_event, execute_admin_command};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    #[error("no player with id {0}")]
    UnknownPlayer(ActorId),
    #[error("slot {0} is out of range")]
    InvalidSlot(usize),
    #[error("inventory of {0} is full")]
    InventoryFull(ActorId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SandboxReply {
    Ticked { tick: u64 },
    Joined { actor: ActorId },
    Left { actor: ActorId },
    Spawned { entity: ActorId },
    Updated,
    Verdict(EventVerdict),
    Command(CommandOutcome),
}

impl fmt::Display for SandboxReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxReply::Ticked { tick } => write!(f, "tick {tick}"),
            SandboxReply::Joined { actor } => write!(f, "joined as {actor}"),
            SandboxReply::Left { actor } => write!(f, "{actor} left"),
            SandboxReply::Spawned { entity } => write!(f, "spawned {entity}"),
            SandboxReply::Updated => f.write_str("ok"),
            SandboxReply::Verdict(EventVerdict::Allow) => f.write_str("allowed"),
            SandboxReply::Verdict(EventVerdict::Deny) => f.write_str("denied"),
            SandboxReply::Command(outcome) => f.write_str(&outcome.message),
        }
    }
}

pub fn apply_command(app: &mut App, command: SandboxCommand) -> Result<SandboxReply, SandboxError> {
    if let SandboxCommand::Tick { steps } = command {
        for _ in 0..steps {
            app.update();
        }
        return Ok(SandboxReply::Ticked {
            tick: app.world.resource::<HubTick>().0,
        });
    }
    apply_world_command(&mut app.world, command)
}

fn player_entity(world: &World, actor: ActorId) -> Result<Entity, SandboxError> {
    world
        .resource::<ActorIndex>()
        .find_player(actor)
        .ok_or(SandboxError::UnknownPlayer(actor))
}

fn apply_world_command(
    world: &mut World,
    command: SandboxCommand,
) -> Result<SandboxReply, SandboxError> {
    let reply = match command {
        SandboxCommand::Tick { .. } => SandboxReply::Updated,
        SandboxCommand::Join {
            name,
            position,
            tags,
        } => {
            let actor = spawn_player(world, &name, position, &tags);
            tracing::info!(target: "hub::sandbox", %actor, name = %name, "player.joined");
            dispatch_event(world, HostEvent::PlayerSpawned {
                actor,
                initial: true,
            });
            SandboxReply::Joined { actor }
        }
        SandboxCommand::Leave { actor } => {
            player_entity(world, actor)?;
            despawn(world, actor);
            dispatch_event(world, HostEvent::PlayerLeft { actor });
            SandboxReply::Left { actor }
        }
        SandboxCommand::Move { actor, position } => {
            let entity = player_entity(world, actor)?;
            world.entity_mut(entity).insert(Position(position));
            SandboxReply::Updated
        }
        SandboxCommand::Tag { actor, tag } => {
            let entity = player_entity(world, actor)?;
            match world.get_mut::<RoleTags>(entity) {
                Some(mut tags) => tags.add(&tag),
                None => {
                    world.entity_mut(entity).insert(RoleTags(vec![tag]));
                }
            }
            SandboxReply::Updated
        }
        SandboxCommand::Give { actor, item, slot } => {
            let entity = player_entity(world, actor)?;
            let mut inventory = world
                .get_mut::<Inventory>(entity)
                .ok_or(SandboxError::InventoryFull(actor))?;
            match inventory.give(ItemStack::new(item), slot) {
                Some(_) => SandboxReply::Updated,
                None => {
                    return Err(match slot {
                        Some(slot) => SandboxError::InvalidSlot(slot),
                        None => SandboxError::InventoryFull(actor),
                    })
                }
            }
        }
        SandboxCommand::Select { actor, slot } => {
            let entity = player_entity(world, actor)?;
            let selected = world
                .get_mut::<Inventory>(entity)
                .map(|mut inventory| inventory.select(slot))
                .unwrap_or(false);
            if !selected {
                return Err(SandboxError::InvalidSlot(slot));
            }
            SandboxReply::Updated
        }
        SandboxCommand::Break { actor, block } => {
            player_entity(world, actor)?;
            SandboxReply::Verdict(dispatch_event(world, HostEvent::BlockBreak { actor, block }))
        }
        SandboxCommand::Interact { actor, block } => {
            player_entity(world, actor)?;
            SandboxReply::Verdict(dispatch_event(
                world,
                HostEvent::BlockInteract { actor, block },
            ))
        }
        SandboxCommand::Use { actor } => {
            player_entity(world, actor)?;
            SandboxReply::Verdict(dispatch_event(world, HostEvent::ItemUse { actor }))
        }
        SandboxCommand::Hurt {
            victim,
            amount,
            attacker,
        } => {
            let entity = world
                .resource::<ActorIndex>()
                .entity(victim)
                .ok_or(SandboxError::UnknownPlayer(victim))?;
            if let Some(mut health) = world.get_mut::<Health>(entity) {
                health.current = (health.current - amount).max(0.0);
            }
            SandboxReply::Verdict(dispatch_event(
                world,
                HostEvent::EntityHurt {
                    victim,
                    attacker,
                    amount,
                },
            ))
        }
        SandboxCommand::Explode {
            position,
            dimension,
        } => SandboxReply::Verdict(dispatch_event(
            world,
            HostEvent::Explosion {
                origin: position,
                dimension,
            },
        )),
        SandboxCommand::Spawn {
            entity_type,
            position,
            dimension,
        } => SandboxReply::Spawned {
            entity: spawn_entity(world, &entity_type, position, &dimension),
        },
        SandboxCommand::Drop {
            item,
            position,
            dimension,
        } => SandboxReply::Spawned {
            entity: spawn_dropped_item(world, ItemStack::new(item), position, &dimension),
        },
        SandboxCommand::Admin { actor, command } => {
            player_entity(world, actor)?;
            SandboxReply::Command(execute_admin_command(world, actor, &command))
        }
    };
    Ok(reply)
}

/// Joins a player in the overworld and returns its id.
pub fn join(app: &mut App, name: &str, position: WorldPos, tags: &[&str]) -> ActorId {
    let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
    let actor = spawn_player(&mut app.world, name, position, &tags);
    dispatch_event(&mut app.world, HostEvent::PlayerSpawned {
        actor,
        initial: true,
    });
    actor
}

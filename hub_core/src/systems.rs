use bevy::ecs::event::Events;
use bevy::prelude::*;
use hub_runtime::{ActorId, AdminCommand, CommandOutcome};

use crate::components::ActiveEffects;
use crate::ecs_host::EcsHost;
use crate::engine::{HubEngine, TickReport};
use crate::guards::{EventVerdict, HostEvent};
use crate::resources::{EventLog, HubMetrics, HubTick};
use crate::store::WorldProperties;

pub fn advance_tick(mut tick: ResMut<HubTick>) {
    tick.0 += 1;
}

/// Drains queued host events and answers each one.
pub fn process_host_events(world: &mut World) {
    let events: Vec<HostEvent> = world
        .resource_mut::<Events<HostEvent>>()
        .drain()
        .collect();
    for event in events {
        dispatch_event(world, event);
    }
}

pub fn run_engine_tick(world: &mut World) {
    let now = world.resource::<HubTick>().0;
    let report: TickReport = world.resource_scope(|world, properties: Mut<WorldProperties>| {
        world.resource_scope(|world, mut engine: Mut<HubEngine>| {
            let mut host = EcsHost::new(world);
            engine.on_tick(&mut host, &*properties, now)
        })
    });

    if let Some(pass) = report.enforcement {
        tracing::debug!(
            target: "hub::rules",
            tick = now,
            examined = pass.examined,
            enforced = pass.enforced,
            failures = pass.failures,
            "enforcement.pass"
        );
    }
    world.resource_mut::<HubMetrics>().record(&report);
}

pub fn expire_effects(mut effects: Query<&mut ActiveEffects>) {
    for mut active in &mut effects {
        if !active.effects.is_empty() {
            active.tick();
        }
    }
}

/// Hands a single event to the engine immediately and records the verdict.
pub fn dispatch_event(world: &mut World, event: HostEvent) -> EventVerdict {
    let now = world.resource::<HubTick>().0;
    let verdict = world.resource_scope(|world, properties: Mut<WorldProperties>| {
        world.resource_scope(|world, mut engine: Mut<HubEngine>| {
            let mut host = EcsHost::new(world);
            engine.handle_event(&mut host, &*properties, &event, now)
        })
    });
    if verdict.is_denied() {
        tracing::debug!(target: "hub::guards", tick = now, ?event, "event.denied");
    }
    world.resource_mut::<EventLog>().record(event, verdict);
    verdict
}

pub fn execute_admin_command(
    world: &mut World,
    actor: ActorId,
    command: &AdminCommand,
) -> CommandOutcome {
    let now = world.resource::<HubTick>().0;
    world.resource_scope(|world, mut properties: Mut<WorldProperties>| {
        world.resource_scope(|world, mut engine: Mut<HubEngine>| {
            let mut host = EcsHost::new(world);
            engine.execute_command(&mut host, &mut *properties, actor, command, now)
        })
    })
}

mod common;

use hub_core::components::{ActiveEffects, Actor, Inbox, Inventory};
use hub_core::{ActorIndex, HubMetrics};

use common::{advance_to, component, exists, place, run, scenario_app};

#[test]
fn only_players_inside_the_zone_are_enforced() {
    let mut app = scenario_app();
    let inside = place(&mut app, "Inside", [50.0, 10.0, -50.0], "");
    let beyond_radius = place(&mut app, "Far", [150.0, 0.0, 0.0], "");
    let above_ceiling = place(&mut app, "High", [0.0, 300.0, 0.0], "");
    run(&mut app, &format!("give {} minecraft:tnt 0", inside.0));
    run(&mut app, &format!("give {} minecraft:tnt 0", beyond_radius.0));

    advance_to(&mut app, 20);

    let effects = component::<ActiveEffects>(&app, inside).expect("effects");
    for name in ["resistance", "weakness", "regeneration"] {
        assert!(effects.has(name), "missing {name}");
    }
    let inventory = component::<Inventory>(&app, inside).expect("inventory");
    assert!(inventory.slots[0].is_none());
    let inbox = component::<Inbox>(&app, inside).expect("inbox");
    assert!(inbox.0.contains(&"tnt is not allowed in the Hub!".to_string()));

    for outside in [beyond_radius, above_ceiling] {
        let effects = component::<ActiveEffects>(&app, outside).expect("effects");
        assert!(effects.effects.is_empty());
    }
    let far_inventory = component::<Inventory>(&app, beyond_radius).expect("inventory");
    assert!(far_inventory.slots[0].is_some());

    let report = app.world.resource::<HubMetrics>().last_tick.enforcement.expect("pass ran");
    assert_eq!(report.examined, 3);
    assert_eq!(report.enforced, 1);
    assert_eq!(report.outside, 2);
    assert_eq!(report.slots_cleared, 1);
}

#[test]
fn bypass_players_keep_their_items() {
    let mut app = scenario_app();
    let manager = place(&mut app, "Manager", [5.0, 0.0, 5.0], "hub_manager");
    run(&mut app, &format!("give {} minecraft:lava_bucket", manager.0));

    advance_to(&mut app, 20);

    let inventory = component::<Inventory>(&app, manager).expect("inventory");
    assert!(inventory.slots[0].is_some());
    let effects = component::<ActiveEffects>(&app, manager).expect("effects");
    assert!(effects.effects.is_empty());
}

#[test]
fn admin_tagged_players_are_skipped() {
    let mut app = scenario_app();
    let admin = place(&mut app, "Admin", [50.0, 10.0, 50.0], "admin");
    let visitor = place(&mut app, "Visitor", [50.0, 10.0, -50.0], "");
    run(&mut app, &format!("give {} minecraft:tnt 0", admin.0));

    advance_to(&mut app, 20);

    let inventory = component::<Inventory>(&app, admin).expect("inventory");
    assert_eq!(
        inventory.slots[0].as_ref().map(|stack| stack.type_id.as_str()),
        Some("minecraft:tnt")
    );
    let effects = component::<ActiveEffects>(&app, admin).expect("effects");
    assert!(effects.effects.is_empty());
    assert!(component::<Inbox>(&app, admin).expect("inbox").0.is_empty());
    assert!(component::<ActiveEffects>(&app, visitor)
        .expect("effects")
        .has("resistance"));

    let report = app.world.resource::<HubMetrics>().last_tick.enforcement.expect("pass ran");
    assert_eq!(report.bypassed, 1);
    assert_eq!(report.enforced, 1);
}

#[test]
fn unreadable_player_is_skipped_without_blocking_others() {
    let mut app = scenario_app();
    let broken = place(&mut app, "Broken", [1.0, 0.0, 1.0], "");
    let healthy = place(&mut app, "Healthy", [2.0, 0.0, 2.0], "");
    let entity = app
        .world
        .resource::<ActorIndex>()
        .entity(broken)
        .expect("broken player entity");
    app.world.entity_mut(entity).remove::<Actor>();

    advance_to(&mut app, 20);

    assert!(component::<ActiveEffects>(&app, healthy)
        .expect("effects")
        .has("resistance"));
    let report = app.world.resource::<HubMetrics>().last_tick.enforcement.expect("pass ran");
    assert_eq!(report.examined, 1);
    assert_eq!(report.enforced, 1);
    assert_eq!(report.failures, 0);
}

#[test]
fn one_failing_player_does_not_stop_the_pass() {
    let mut app = scenario_app();
    let broken = place(&mut app, "Broken", [1.0, 0.0, 1.0], "");
    let healthy = place(&mut app, "Healthy", [2.0, 0.0, 2.0], "");
    let entity = app
        .world
        .resource::<ActorIndex>()
        .entity(broken)
        .expect("broken player entity");
    app.world.entity_mut(entity).remove::<ActiveEffects>();

    advance_to(&mut app, 20);

    let effects = component::<ActiveEffects>(&app, healthy).expect("effects");
    assert!(effects.has("resistance"));
    let metrics = app.world.resource::<HubMetrics>();
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.last_tick.enforcement.map(|pass| pass.enforced), Some(2));
}

#[test]
fn effects_are_refreshed_before_they_lapse() {
    let mut app = scenario_app();
    let actor = place(&mut app, "Camper", [0.0, 0.0, 0.0], "");

    advance_to(&mut app, 20);
    advance_to(&mut app, 100);
    let effects = component::<ActiveEffects>(&app, actor).expect("effects");
    let resistance = effects
        .effects
        .iter()
        .find(|active| active.spec.effect == "resistance")
        .expect("resistance active");
    // Re-applied on tick 100, eighty ticks after the first application.
    assert_eq!(resistance.remaining_ticks, 99);
}

#[test]
fn hostile_creatures_inside_are_purged() {
    let mut app = scenario_app();
    let near_zombie = spawn(&mut app, "spawn minecraft:zombie 10 0 10");
    let far_zombie = spawn(&mut app, "spawn minecraft:zombie 500 0 0");
    let cow = spawn(&mut app, "spawn minecraft:cow 5 0 5");
    let nether_zombie = spawn(&mut app, "spawn minecraft:zombie 0 0 0 nether");

    advance_to(&mut app, 39);
    assert!(exists(&app, near_zombie));

    advance_to(&mut app, 40);
    assert!(!exists(&app, near_zombie));
    assert!(exists(&app, far_zombie));
    assert!(exists(&app, cow));
    assert!(exists(&app, nether_zombie));
    assert_eq!(app.world.resource::<HubMetrics>().hostiles_removed, 1);
}

fn spawn(app: &mut bevy::prelude::App, line: &str) -> hub_runtime::ActorId {
    match run(app, line) {
        hub_core::sandbox::SandboxReply::Spawned { entity } => entity,
        other => panic!("unexpected reply {other:?}"),
    }
}

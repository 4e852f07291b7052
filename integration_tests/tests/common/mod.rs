#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use bevy::prelude::{App, Component};
use hub_core::sandbox::{apply_command, SandboxReply};
use hub_core::store::keys;
use hub_core::{build_headless_app, run_tick, ActorIndex, HubTick, PropertyStore, WorldProperties};
use hub_runtime::{parse_command_line, ActorId};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_hub_rules.json");

        debug_assert!(
            config_path.exists(),
            "missing test hub rules at {}",
            config_path.display()
        );

        std::env::set_var("HUB_RULES_CONFIG_PATH", &config_path);
    });
}

/// App with the zone centered on the origin, radius 100.
pub fn scenario_app() -> App {
    ensure_test_config();
    let mut app = build_headless_app();
    {
        let mut properties = app.world.resource_mut::<WorldProperties>();
        for key in [keys::CENTER_X, keys::CENTER_Y, keys::CENTER_Z] {
            properties.set(key, 0.0.into()).expect("in-memory set");
        }
        properties.set(keys::RADIUS, 100.0.into()).expect("in-memory set");
    }
    app
}

pub fn run(app: &mut App, line: &str) -> SandboxReply {
    let command = parse_command_line(line).unwrap_or_else(|err| panic!("{line}: {err}"));
    apply_command(app, command).unwrap_or_else(|err| panic!("{line}: {err}"))
}

/// Joins a player and moves it to `position`, undoing the spawn teleport.
pub fn place(app: &mut App, name: &str, position: [f64; 3], tags: &str) -> ActorId {
    let [x, y, z] = position;
    let SandboxReply::Joined { actor } = run(app, &format!("join {name} {x} {y} {z} {tags}")) else {
        panic!("join did not return an actor");
    };
    run(app, &format!("move {} {x} {y} {z}", actor.0));
    actor
}

pub fn advance_to(app: &mut App, tick: u64) {
    while app.world.resource::<HubTick>().0 < tick {
        run_tick(app);
    }
}

pub fn component<T: Component + Clone>(app: &App, actor: ActorId) -> Option<T> {
    let entity = app.world.resource::<ActorIndex>().entity(actor)?;
    app.world.get::<T>(entity).cloned()
}

pub fn exists(app: &App, id: ActorId) -> bool {
    app.world.resource::<ActorIndex>().entity(id).is_some()
}

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use hub_core::sandbox::join;
use hub_core::store::keys;
use hub_core::{build_headless_app, run_tick, HubTick, PropertyStore, WorldProperties};
use hub_runtime::WorldPos;

fn populated_app(players: u32) -> bevy::app::App {
    let mut app = build_headless_app();
    {
        let mut properties = app.world.resource_mut::<WorldProperties>();
        for key in [keys::CENTER_X, keys::CENTER_Y, keys::CENTER_Z] {
            let _ = properties.set(key, 0.0.into());
        }
        let _ = properties.set(keys::RADIUS, 100.0.into());
    }
    for index in 0..players {
        let offset = (index % 200) as f64;
        join(
            &mut app,
            &format!("player{index}"),
            WorldPos::new(offset, 64.0, -offset),
            &[],
        );
    }
    // Land the next update on an enforcement tick.
    app.world.resource_mut::<HubTick>().0 = 19;
    app
}

fn bench_enforcement(c: &mut Criterion) {
    let mut group = c.benchmark_group("enforcement_pass");

    for players in [10u32, 50, 100, 250] {
        group.bench_with_input(BenchmarkId::new("players", players), &players, |b, &players| {
            b.iter_batched(
                || populated_app(players),
                |mut app| {
                    run_tick(&mut app);
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(enforcement_benches, bench_enforcement);
criterion_main!(enforcement_benches);

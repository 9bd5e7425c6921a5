//! THE MOST IMPORTANT SIMULATION TEST IN THE PROJECT.
//!
//! Two engines, same seed, same tick count.
//! They must produce byte-identical event logs and savegame dumps.
//! Any divergence is a blocker — do not merge until fixed.

use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::serializer::SaveSerializer;
use parallax_core::world::World;

fn run(seed: u64, ticks: u64) -> (SimEngine, World) {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(seed, &config).expect("build engine");
    engine.run_ticks(ticks, &world).expect("run ticks");
    (engine, world)
}

#[test]
fn same_seed_produces_identical_runs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    const TICKS: u64 = 200;

    let (engine_a, world_a) = run(SEED, TICKS);
    let (engine_b, world_b) = run(SEED, TICKS);

    let log_a: Vec<&str> = engine_a.event_log().iter().map(|e| e.payload.as_str()).collect();
    let log_b: Vec<&str> = engine_b.event_log().iter().map(|e| e.payload.as_str()).collect();

    assert_eq!(
        log_a.len(),
        log_b.len(),
        "Event log lengths differ: {} vs {}",
        log_a.len(),
        log_b.len()
    );
    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(a, b, "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}");
    }

    let serializer = SaveSerializer::new();
    let dump_a = serializer.savegame(&world_a, engine_a.live_view());
    let dump_b = serializer.savegame(&world_b, engine_b.live_view());
    assert_eq!(dump_a, dump_b, "Savegame dumps diverged for the same seed");
}

#[test]
fn different_seeds_produce_different_worlds() {
    let (engine_a, world_a) = run(42, 30);
    let (engine_b, world_b) = run(99, 30);

    let serializer = SaveSerializer::new();
    let dump_a = serializer.savegame(&world_a, engine_a.live_view());
    let dump_b = serializer.savegame(&world_b, engine_b.live_view());

    assert_ne!(
        dump_a, dump_b,
        "Different seeds produced identical worlds — the seed is not being used"
    );
}

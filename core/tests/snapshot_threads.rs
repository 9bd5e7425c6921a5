//! The concurrency contract with real threads: the mutator never waits on
//! the reader, and a background dump is a point-in-time snapshot no matter
//! how much the world changes while it runs.

use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::serializer::SaveSerializer;
use parallax_core::snapshot::{Perspective, SaveCoordinator, SnapCell};
use std::sync::mpsc;
use std::thread;

#[test]
fn mutator_makes_progress_while_the_reader_stalls() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(0u64, &coordinator);

    let window = coordinator.begin_save().expect("open window");

    let (release_tx, release_rx) = mpsc::channel::<()>();
    let (seen_tx, seen_rx) = mpsc::channel::<u64>();

    let cell_ref = &cell;
    let window_ref = &window;
    thread::scope(|scope| {
        scope.spawn(move || {
            // A deliberately slow reader: it does not even look at the
            // world until the mutator says it is done writing.
            release_rx.recv().expect("release signal");
            seen_tx
                .send(cell_ref.get(Perspective::Snap(window_ref)))
                .expect("send observed value");
        });

        // Every one of these writes returns without waiting on the reader.
        for i in 1..=100_000u64 {
            cell.set(i, &mut mutator);
        }
        release_tx.send(()).expect("release reader");

        let seen = seen_rx.recv().expect("observed value");
        assert_eq!(seen, 0, "the stalled reader still sees the begin_save value");
    });

    coordinator.end_save(window, &mut mutator).expect("close window");
    assert_eq!(cell.get(Perspective::Live(&mutator)), 100_000);
}

#[test]
fn background_dump_matches_the_state_at_begin_save() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(0x5EED, &config).expect("build engine");
    engine.run_ticks(5, &world).expect("warm-up ticks");

    let serializer = SaveSerializer::new();
    let before = serializer.savegame(&world, engine.live_view());

    let coordinator = engine.coordinator().clone();
    let window = coordinator.begin_save().expect("open window");

    let snap = thread::scope(|scope| {
        let world_ref = &world;
        let window_ref = &window;
        let reader = scope.spawn(move || {
            SaveSerializer::new().savegame(world_ref, Perspective::Snap(window_ref))
        });

        // The simulation keeps running while the dump is produced.
        engine.run_ticks(20, &world).expect("concurrent ticks");

        reader.join().expect("reader thread")
    });

    coordinator
        .end_save(window, engine.mutator_mut())
        .expect("close window");

    assert_eq!(
        snap, before,
        "the background dump must be the world exactly as of begin_save"
    );

    // And the live world really did move on meanwhile.
    let after = serializer.savegame(&world, engine.live_view());
    assert_ne!(after, before, "twenty ticks must change the live dump");
}

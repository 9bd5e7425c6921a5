//! Movement behavior: seeking, docking, and the sector-membership
//! bookkeeping staying consistent over long runs.

use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::models::{Destination, DestinationObject};
use parallax_core::movement_subsystem::MovementSubsystem;
use parallax_core::rng::{SubsystemRng, SubsystemSlot};
use parallax_core::snapshot::Perspective;
use parallax_core::subsystem::SimSubsystem;
use parallax_core::types::{SectorId, ShipId};
use parallax_core::vec2::Vec2;
use parallax_core::world::World;

const SEED: u64 = 0xA11CE;

fn membership_is_consistent(world: &World, view: Perspective<'_>) {
    let mut seen = 0usize;
    for (idx, sector) in world.sectors.iter().enumerate() {
        for &ship_id in sector.ships.read(view).iter() {
            seen += 1;
            assert_eq!(
                world.ship(ship_id).sector.get(view),
                SectorId(idx as u32),
                "ship {ship_id:?} is listed in a sector it does not reference"
            );
        }
    }
    assert_eq!(seen, world.ships.len(), "every ship lives in exactly one sector");
}

#[test]
fn long_runs_keep_membership_and_bounds_consistent() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(SEED, &config).expect("build engine");
    engine.run_ticks(300, &world).expect("run ticks");

    membership_is_consistent(&world, engine.live_view());

    for ship in &world.ships {
        let size = world.sector(ship.sector.get(engine.live_view())).size;
        let pos = ship.position.get(engine.live_view());
        assert!(pos.x >= 0.0 && pos.x <= size.x, "x out of bounds: {}", pos.x);
        assert!(pos.y >= 0.0 && pos.y <= size.y, "y out of bounds: {}", pos.y);
    }
}

#[test]
fn a_ship_closes_on_its_destination() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(SEED, &config).expect("build engine");

    let ship = world.ship(ShipId(0));
    let sector = ship.sector.get(engine.live_view());
    let goal = Vec2::new(15.0, 15.0);

    let mutator = engine.mutator_mut();
    ship.docked.set(false, mutator);
    ship.timeout.set(0.0, mutator);
    ship.position.set(Vec2::new(3.0, 3.0), mutator);
    ship.destination.set(
        Some(Destination {
            sector,
            position: goal,
            object: None,
        }),
        mutator,
    );

    let before = (goal - ship.position.get(engine.live_view())).magnitude();

    let mut movement = MovementSubsystem::new(config.clone());
    let mut rng = SubsystemRng::new(SEED, SubsystemSlot::Movement as u64);
    movement
        .update(1, &world, engine.mutator_mut(), &[], &mut rng)
        .expect("movement tick");

    let after = (goal - ship.position.get(engine.live_view())).magnitude();
    assert!(after < before, "one tick must close the distance: {after} vs {before}");

    let dir = ship.direction.get(engine.live_view());
    assert!((dir.magnitude() - 1.0).abs() < 1e-4, "heading stays normalized");
}

#[test]
fn arriving_at_a_station_docks_and_repairs() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(SEED, &config).expect("build engine");
    assert!(!world.stations.is_empty(), "test world needs a station");

    let station_id = parallax_core::types::StationId(0);
    let station = world.station(station_id);
    let ship_id = ShipId(0);
    let ship = world.ship(ship_id);

    // Park the ship next to the station, headed straight at it.
    let old_sector = ship.sector.get(engine.live_view());
    let mutator = engine.mutator_mut();
    let mut from = world
        .sector(old_sector)
        .ships
        .read(Perspective::Live(mutator))
        .clone();
    from.remove(&ship_id);
    world.sector(old_sector).ships.set(from, mutator);
    let mut to = world
        .sector(station.sector)
        .ships
        .read(Perspective::Live(mutator))
        .clone();
    to.insert(ship_id);
    world.sector(station.sector).ships.set(to, mutator);

    ship.sector.set(station.sector, mutator);
    ship.docked.set(false, mutator);
    ship.timeout.set(0.0, mutator);
    ship.current_hull.set(1, mutator);
    ship.position.set(station.position - Vec2::new(0.01, 0.0), mutator);
    ship.direction.set(Vec2::new(1.0, 0.0), mutator);
    ship.destination.set(
        Some(Destination {
            sector: station.sector,
            position: station.position,
            object: Some(DestinationObject::Station(station_id)),
        }),
        mutator,
    );

    let mut movement = MovementSubsystem::new(config.clone());
    let mut rng = SubsystemRng::new(SEED, SubsystemSlot::Movement as u64);
    let events = movement
        .update(1, &world, engine.mutator_mut(), &[], &mut rng)
        .expect("movement tick");

    assert!(ship.docked.get(engine.live_view()), "ship must dock on arrival");
    assert_eq!(
        ship.current_hull.get(engine.live_view()),
        ship.max_hull.get(engine.live_view()),
        "docking repairs the hull"
    );
    assert_eq!(ship.timeout.get(engine.live_view()), config.dock_time);
    assert!(
        events.iter().any(|e| matches!(
            e,
            parallax_core::event::SimEvent::ShipDocked { ship: s, .. } if *s == ship_id
        )),
        "a dock event must be emitted"
    );

    membership_is_consistent(&world, engine.live_view());
}

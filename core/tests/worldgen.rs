//! Generated worlds are well-formed: paired gates, reachable sectors,
//! spaced stations, consistent starting membership.

use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::types::SectorId;

#[test]
fn jumpgates_come_in_mutual_pairs() {
    let (_engine, world) = SimEngine::build(11, &WorldConfig::default_test()).expect("build");

    assert!(!world.jumpgates.is_empty());
    for (i, gate) in world.jumpgates.iter().enumerate() {
        let partner = world.jumpgate(gate.target);
        assert_eq!(
            partner.target.0 as usize, i,
            "gate {i} and its partner must point at each other"
        );
        assert_ne!(gate.sector, partner.sector, "a gate pair spans two sectors");
    }
}

#[test]
fn every_sector_has_a_route_out() {
    let (_engine, world) = SimEngine::build(23, &WorldConfig::default_test()).expect("build");

    for sector in &world.sectors {
        assert!(
            sector.gates.count() >= 1,
            "sector {} is unreachable",
            sector.name
        );
    }
}

#[test]
fn gate_slots_agree_with_the_arena() {
    let (_engine, world) = SimEngine::build(31, &WorldConfig::default_test()).expect("build");

    for (idx, sector) in world.sectors.iter().enumerate() {
        for gate_id in sector.gates.all() {
            assert_eq!(
                world.jumpgate(gate_id).sector,
                SectorId(idx as u32),
                "sector {} lists a gate that lives elsewhere",
                sector.name
            );
        }
    }
}

#[test]
fn stations_keep_their_clearance() {
    let (_engine, world) = SimEngine::build(47, &WorldConfig::default_test()).expect("build");

    for station in &world.stations {
        let sector = world.sector(station.sector);
        for gate_id in sector.gates.all() {
            let gap = (world.jumpgate(gate_id).position - station.position).magnitude();
            assert!(
                gap >= 2.0,
                "station {:?} sits {gap} from a gate in {}",
                station.id,
                sector.name
            );
        }
    }
}

#[test]
fn starting_membership_covers_the_whole_fleet() {
    let config = WorldConfig::default_test();
    let (engine, world) = SimEngine::build(53, &config).expect("build");

    let total: usize = world
        .sectors
        .iter()
        .map(|s| s.ships.read(engine.live_view()).len())
        .sum();
    assert_eq!(total, config.ship_count);
    assert_eq!(world.ships.len(), config.ship_count);

    for (idx, sector) in world.sectors.iter().enumerate() {
        for &ship_id in sector.ships.read(engine.live_view()).iter() {
            assert_eq!(
                world.ship(ship_id).sector.get(engine.live_view()),
                SectorId(idx as u32),
                "membership and the ship's own sector handle disagree"
            );
        }
    }
}

//! Gunnery math and a staged duel through the targeting and combat
//! subsystems.

use parallax_core::config::WorldConfig;
use parallax_core::engine::SimEngine;
use parallax_core::event::SimEvent;
use parallax_core::gunnery;
use parallax_core::models::{Faction, ShipKind, WeaponKind, WeaponPosition};
use parallax_core::combat_subsystem::CombatSubsystem;
use parallax_core::rng::{SubsystemRng, SubsystemSlot};
use parallax_core::snapshot::Perspective;
use parallax_core::subsystem::SimSubsystem;
use parallax_core::targeting_subsystem::TargetingSubsystem;
use parallax_core::types::ShipId;
use parallax_core::vec2::Vec2;
use parallax_core::world::World;

const SEED: u64 = 0xF1657;

#[test]
fn raw_to_hit_respects_range_and_turret_scaling() {
    // Pulse reaches 2.0 units; a turret only half of that.
    assert!(gunnery::chance_to_hit_raw(WeaponKind::Pulse, false, ShipKind::Transport, 1.9) > 0.0);
    assert_eq!(
        gunnery::chance_to_hit_raw(WeaponKind::Pulse, false, ShipKind::Transport, 2.1),
        0.0
    );
    assert_eq!(
        gunnery::chance_to_hit_raw(WeaponKind::Pulse, true, ShipKind::Transport, 1.5),
        0.0,
        "turret range is scaled down"
    );

    // Accuracy scales with how easy the target kind is to track.
    let vs_scout = gunnery::chance_to_hit_raw(WeaponKind::Cannon, false, ShipKind::Scout, 1.0);
    let vs_frigate = gunnery::chance_to_hit_raw(WeaponKind::Cannon, false, ShipKind::Frigate, 1.0);
    assert!(vs_frigate > vs_scout, "frigates are easier to hit than scouts");
}

/// Two hostile ships alone in one sector: everyone else is made neutral so
/// the targeting pass only sees the duel.
fn stage_duel(engine: &mut SimEngine, world: &World) -> (ShipId, ShipId) {
    let shooter_id = ShipId(0);
    let victim_id = ShipId(1);
    let view = engine.live_view();
    let duel_sector = world.ship(shooter_id).sector.get(view);

    let mutator = engine.mutator_mut();
    for (i, ship) in world.ships.iter().enumerate() {
        if i > 1 {
            ship.faction.set(Faction::Neutral, mutator);
        }
    }

    // Move the victim into the shooter's sector.
    let shooter = world.ship(shooter_id);
    let victim = world.ship(victim_id);
    let victim_sector = victim.sector.get(Perspective::Live(mutator));
    if victim_sector != duel_sector {
        let mut from = world
            .sector(victim_sector)
            .ships
            .read(Perspective::Live(mutator))
            .clone();
        from.remove(&victim_id);
        world.sector(victim_sector).ships.set(from, mutator);
        let mut to = world
            .sector(duel_sector)
            .ships
            .read(Perspective::Live(mutator))
            .clone();
        to.insert(victim_id);
        world.sector(duel_sector).ships.set(to, mutator);
        victim.sector.set(duel_sector, mutator);
    }

    shooter.faction.set(Faction::Player, mutator);
    shooter.kind.set(ShipKind::Corvette, mutator); // military: picks a primary target
    shooter.docked.set(false, mutator);
    shooter.timeout.set(0.0, mutator);
    shooter.current_hull.set(500, mutator);
    shooter.max_hull.set(500, mutator);
    shooter.position.set(Vec2::new(5.0, 5.0), mutator);
    shooter.direction.set(Vec2::new(1.0, 0.0), mutator);
    // One pulse gun on the bow; everything else stripped.
    for (slot, mount) in shooter.weapons.iter().enumerate() {
        mount.kind.set(if slot == 0 { Some(WeaponKind::Pulse) } else { None }, mutator);
        mount.position.set(WeaponPosition::Bow, mutator);
        mount.cooldown.set(0.0, mutator);
        mount.target.set(None, mutator);
    }
    for mount in &shooter.turrets {
        mount.kind.set(None, mutator);
        mount.target.set(None, mutator);
    }

    victim.faction.set(Faction::Foe, mutator);
    victim.docked.set(false, mutator);
    victim.timeout.set(0.0, mutator);
    victim.max_hull.set(40, mutator);
    victim.current_hull.set(40, mutator);
    victim.position.set(Vec2::new(5.5, 5.0), mutator); // dead ahead, in range
    // Defenseless: every mount stripped.
    for mount in victim.weapons.iter().chain(victim.turrets.iter()) {
        mount.kind.set(None, mutator);
        mount.target.set(None, mutator);
    }

    (shooter_id, victim_id)
}

#[test]
fn a_duel_runs_to_the_kill() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(SEED, &config).expect("build engine");
    let (shooter_id, victim_id) = stage_duel(&mut engine, &world);

    let mut targeting = TargetingSubsystem::new();
    let mut combat = CombatSubsystem::new(config.clone());
    let mut targeting_rng = SubsystemRng::new(SEED, SubsystemSlot::Targeting as u64);
    let mut combat_rng = SubsystemRng::new(SEED, SubsystemSlot::Combat as u64);

    targeting
        .update(1, &world, engine.mutator_mut(), &[], &mut targeting_rng)
        .expect("targeting tick");

    let shooter = world.ship(shooter_id);
    assert_eq!(
        shooter.target.get(engine.live_view()),
        Some(victim_id),
        "the only hostile in range becomes the primary target"
    );
    assert_eq!(
        shooter.weapons[0].target.get(engine.live_view()),
        Some(victim_id),
        "the bow gun locks on"
    );

    let victim = world.ship(victim_id);
    let mut destroyed = false;
    for tick in 2..400u64 {
        let events = combat
            .update(tick, &world, engine.mutator_mut(), &[], &mut combat_rng)
            .expect("combat tick");
        if events.iter().any(|e| matches!(
            e,
            SimEvent::ShipDestroyed { ship, by, .. } if *ship == victim_id && *by == shooter_id
        )) {
            destroyed = true;
            break;
        }
    }

    assert!(destroyed, "forty hull against a pulse gun cannot survive 400 ticks");
    assert!(victim.is_dead(engine.live_view()));
    assert_eq!(
        victim.timeout.get(engine.live_view()),
        config.respawn_time,
        "a kill starts the respawn timer"
    );
}

#[test]
fn fixed_mounts_only_fire_inside_their_aim_window() {
    let config = WorldConfig::default_test();
    let (mut engine, world) = SimEngine::build(SEED, &config).expect("build engine");
    let (shooter_id, victim_id) = stage_duel(&mut engine, &world);

    // Turn the shooter away from the victim: bow weapon has no shot.
    let shooter = world.ship(shooter_id);
    shooter
        .direction
        .set(Vec2::new(-1.0, 0.0), engine.mutator_mut());

    let victim = world.ship(victim_id);
    let to_hit = gunnery::chance_to_hit(
        shooter,
        &shooter.weapons[0],
        victim,
        engine.live_view(),
    );
    assert_eq!(to_hit, 0.0, "target behind the bow gun is unhittable");

    shooter
        .direction
        .set(Vec2::new(1.0, 0.0), engine.mutator_mut());
    let to_hit = gunnery::chance_to_hit(
        shooter,
        &shooter.weapons[0],
        victim,
        engine.live_view(),
    );
    assert!(to_hit > 0.0, "target dead ahead is in the window");
}

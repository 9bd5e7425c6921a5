//! Respawn: dead ships past their timeout come back as new entities.
//!
//! A respawn never destroys cells — the ship slot is rebuilt by writing
//! every field through its existing cell, so an open save window still sees
//! the wreck it started with.

use crate::config::WorldConfig;
use crate::error::SimResult;
use crate::event::SimEvent;
use crate::models::{DestinationObject, Faction, Ship, ShipKind, WeaponPosition};
use crate::namegen::{random_code, ShipNamer};
use crate::rng::SubsystemRng;
use crate::snapshot::{Mutator, Perspective};
use crate::subsystem::SimSubsystem;
use crate::types::{EntityIdGen, SectorId, ShipId, Tick};
use crate::world::{self, World};
use std::collections::{BTreeMap, BTreeSet};

pub struct RespawnSubsystem {
    config: WorldConfig,
    namer: ShipNamer,
    id_gen: EntityIdGen,
}

impl RespawnSubsystem {
    /// Takes over the name and id sequences worldgen started.
    pub fn new(config: WorldConfig, namer: ShipNamer, id_gen: EntityIdGen) -> Self {
        Self {
            config,
            namer,
            id_gen,
        }
    }
}

fn stage_membership<'a>(
    staged: &'a mut BTreeMap<SectorId, BTreeSet<ShipId>>,
    world: &World,
    mutator: &Mutator,
    sector: SectorId,
) -> &'a mut BTreeSet<ShipId> {
    staged.entry(sector).or_insert_with(|| {
        world
            .sector(sector)
            .ships
            .read(Perspective::Live(mutator))
            .clone()
    })
}

impl SimSubsystem for RespawnSubsystem {
    fn name(&self) -> &'static str {
        "respawn"
    }

    fn update(
        &mut self,
        tick: Tick,
        world: &World,
        mutator: &mut Mutator,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        if world.stations.is_empty() {
            return Ok(Vec::new()); // no valid respawn points
        }

        let mut events = Vec::new();
        let mut staged: BTreeMap<SectorId, BTreeSet<ShipId>> = BTreeMap::new();

        for (i, ship) in world.ships.iter().enumerate() {
            let id = ShipId(i as u32);
            let is_player = id == world.player_ship;

            if !ship.is_dead(Perspective::Live(mutator))
                || ship.timeout.get(Perspective::Live(mutator)) > 0.0
            {
                continue;
            }
            // Wrecks in the player's sector stay where they fell.
            let player_sector = world
                .ship(world.player_ship)
                .sector
                .get(Perspective::Live(mutator));
            let old_sector = ship.sector.get(Perspective::Live(mutator));
            if !is_player && old_sector == player_sector {
                continue;
            }

            let station_id = match world.random_station(rng) {
                Some(s) => s,
                None => continue,
            };
            let station = world.station(station_id);
            let sector = station.sector;
            let kind = world::random_ship_kind(rng);

            stage_membership(&mut staged, world, mutator, old_sector).remove(&id);
            stage_membership(&mut staged, world, mutator, sector).insert(id);

            let new_id = self.id_gen.next_id();
            ship.id.set(new_id, mutator);
            ship.kind.set(kind, mutator);
            ship.code.set(random_code(rng), mutator);
            ship.name.set(self.namer.next_name(kind), mutator);
            ship.max_hull.set(kind.hull(), mutator);
            ship.current_hull.set(kind.hull(), mutator);
            ship.speed.set(kind.speed(), mutator);
            ship.position.set(station.position, mutator);

            let misc = if is_player && world.sector(sector).gates.count() > 1 {
                0.0
            } else {
                self.config.misc_destination_chance
            };
            let dest = world.random_destination(
                sector,
                self.config.use_jumpgates,
                misc,
                &[DestinationObject::Station(station_id)],
                rng,
            );
            let mut dir = (dest.position - station.position).normalized();
            if dir.magnitude() == 0.0 {
                dir = world::random_direction(rng);
            }
            ship.direction.set(dir, mutator);
            ship.destination.set(Some(dest), mutator);
            ship.sector.set(sector, mutator);
            ship.target.set(None, mutator);
            ship.docked.set(true, mutator);
            ship.timeout.set(0.0, mutator);

            rearm(ship, kind, &mut self.id_gen, mutator);

            // Neutral ships are not part of the combat system, so a respawn
            // always comes back combat-capable.
            let faction = if is_player {
                Faction::Player
            } else {
                let total = self.config.player_frequency
                    + self.config.friend_frequency
                    + self.config.enemy_frequency;
                let roll = rng.next_f64() * total;
                if roll < self.config.player_frequency {
                    Faction::Player
                } else if roll < self.config.player_frequency + self.config.friend_frequency {
                    Faction::Friend
                } else {
                    Faction::Foe
                }
            };
            ship.faction.set(faction, mutator);

            events.push(SimEvent::ShipRespawned {
                tick,
                ship: id,
                station: station_id,
                new_id,
            });
        }

        for (sector_id, members) in staged {
            world.sector(sector_id).ships.set(members, mutator);
        }

        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn rearm(ship: &Ship, kind: ShipKind, id_gen: &mut EntityIdGen, mutator: &mut Mutator) {
    let loadout = kind.fixed_loadout();
    for (slot, mount) in ship.weapons.iter().enumerate() {
        match loadout.get(slot) {
            Some(&(weapon, position)) => {
                mount.id.set(id_gen.next_id(), mutator);
                mount.kind.set(Some(weapon), mutator);
                mount.position.set(position, mutator);
            }
            None => {
                mount.kind.set(None, mutator);
                mount.position.set(WeaponPosition::Bow, mutator);
            }
        }
        mount.cooldown.set(0.0, mutator);
        mount.target.set(None, mutator);
    }

    let turret_loadout = kind.turret_loadout();
    for (slot, mount) in ship.turrets.iter().enumerate() {
        match turret_loadout.get(slot) {
            Some(&weapon) => {
                mount.id.set(id_gen.next_id(), mutator);
                mount.kind.set(Some(weapon), mutator);
            }
            None => {
                mount.kind.set(None, mutator);
            }
        }
        mount.position.set(WeaponPosition::Bow, mutator);
        mount.cooldown.set(0.0, mutator);
        mount.target.set(None, mutator);
    }
}

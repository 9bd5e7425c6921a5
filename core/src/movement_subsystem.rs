//! Ship movement: timeouts, undocking, destination seeking, jumpgate
//! travel, wall handling, and sector membership.

use crate::config::WorldConfig;
use crate::error::SimResult;
use crate::event::SimEvent;
use crate::models::DestinationObject;
use crate::rng::SubsystemRng;
use crate::snapshot::{Mutator, Perspective};
use crate::subsystem::SimSubsystem;
use crate::types::{SectorId, ShipId, Tick, TICK_DELTA};
use crate::vec2::Vec2;
use crate::world::World;
use std::collections::{BTreeMap, BTreeSet};

pub struct MovementSubsystem {
    config: WorldConfig,
}

impl MovementSubsystem {
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }
}

/// Sector membership is copied out once per touched sector, edited, and
/// written back through the cell in one piece at the end of the pass.
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

impl SimSubsystem for MovementSubsystem {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn update(
        &mut self,
        tick: Tick,
        world: &World,
        mutator: &mut Mutator,
        _events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        let delta = TICK_DELTA;
        let mut events = Vec::new();
        let mut staged: BTreeMap<SectorId, BTreeSet<ShipId>> = BTreeMap::new();

        for (i, ship) in world.ships.iter().enumerate() {
            let id = ShipId(i as u32);
            let is_player = id == world.player_ship;

            let timeout = ship.timeout.get(Perspective::Live(mutator));
            if timeout > 0.0 {
                ship.timeout.set((timeout - delta).max(0.0), mutator);
            }
            let timeout = ship.timeout.get(Perspective::Live(mutator));
            if ship.docked.get(Perspective::Live(mutator)) && timeout == 0.0 {
                ship.docked.set(false, mutator);
                events.push(SimEvent::ShipUndocked { tick, ship: id });
            }
            if ship.docked.get(Perspective::Live(mutator))
                || ship.is_dead(Perspective::Live(mutator))
                || timeout > 0.0
            {
                continue;
            }

            let home_sector = ship.sector.get(Perspective::Live(mutator));
            let mut sector = home_sector;
            let mut pos = ship.position.get(Perspective::Live(mutator));
            let mut dir = ship.direction.get(Perspective::Live(mutator));
            let speed = ship.speed.get(Perspective::Live(mutator));
            let dest = ship.destination.get(Perspective::Live(mutator));

            match dest {
                Some(d) if d.sector == sector => {
                    let dest_pos = world.destination_position(&d);
                    let new_dir = (dest_pos - pos).normalized();
                    let new_pos = pos + new_dir * speed * delta;
                    if new_dir.dot(dest_pos - new_pos) > 0.0 {
                        // Still short of it.
                        pos = new_pos;
                        dir = new_dir;
                    } else {
                        pos = dest_pos;
                        let mut excludes: Vec<DestinationObject> = Vec::new();

                        match d.object {
                            Some(DestinationObject::Jumpgate(gate)) => {
                                let exit_id = world.jumpgate(gate).target;
                                let exit = world.jumpgate(exit_id);
                                sector = exit.sector;
                                pos = exit.position;
                                excludes.push(DestinationObject::Jumpgate(exit_id));
                                events.push(SimEvent::ShipJumped {
                                    tick,
                                    ship: id,
                                    from: home_sector,
                                    to: sector,
                                });
                            }
                            Some(DestinationObject::Station(station)) => {
                                excludes.extend(
                                    world
                                        .sector(sector)
                                        .stations
                                        .iter()
                                        .map(|&s| DestinationObject::Station(s)),
                                );
                                // Dock and repair.
                                let max = ship.max_hull.get(Perspective::Live(mutator));
                                ship.current_hull.set(max, mutator);
                                ship.docked.set(true, mutator);
                                ship.timeout.set(self.config.dock_time, mutator);
                                events.push(SimEvent::ShipDocked {
                                    tick,
                                    ship: id,
                                    station,
                                });
                            }
                            None => {}
                        }

                        let misc = if is_player && world.sector(sector).gates.count() > 1 {
                            0.0
                        } else {
                            self.config.misc_destination_chance
                        };
                        let next = world.random_destination(
                            sector,
                            self.config.use_jumpgates,
                            misc,
                            &excludes,
                            rng,
                        );
                        if d.object.is_some() {
                            dir = (next.position - pos).normalized();
                        }
                        ship.destination.set(Some(next), mutator);
                    }
                }
                _ => {
                    // No destination in this sector -- just keep flying.
                    pos = pos + dir * speed * delta;
                }
            }

            let size = world.sector(sector).size;
            if self.config.use_jumpgates {
                // Gates are the only way between sectors; walls turn ships
                // back toward a fresh destination.
                if pos.x < 0.0 || pos.x >= size.x || pos.y < 0.0 || pos.y >= size.y {
                    let next = world.random_destination(sector, true, 0.0, &[], rng);
                    dir = (next.position - pos).normalized();
                    ship.destination.set(Some(next), mutator);
                }
            } else {
                // Open walls: cross into the neighbor or bounce.
                let neighbors = world.sector(sector).neighbors;
                if pos.x < 0.0 {
                    if let Some(west) = neighbors.west {
                        sector = west;
                        pos = Vec2::new(pos.x + size.x, pos.y);
                    } else {
                        dir = Vec2::new(-dir.x, rng.next_f32_range(-1.0, 1.0)).normalized();
                    }
                } else if pos.x >= size.x {
                    if let Some(east) = neighbors.east {
                        pos = Vec2::new(pos.x - size.x, pos.y);
                        sector = east;
                    } else {
                        dir = Vec2::new(-dir.x, rng.next_f32_range(-1.0, 1.0)).normalized();
                    }
                }
                let neighbors = world.sector(sector).neighbors;
                if pos.y < 0.0 {
                    if let Some(north) = neighbors.north {
                        sector = north;
                        pos = Vec2::new(pos.x, pos.y + size.y);
                    } else {
                        dir = Vec2::new(rng.next_f32_range(-1.0, 1.0), -dir.y).normalized();
                    }
                } else if pos.y >= size.y {
                    if let Some(south) = neighbors.south {
                        pos = Vec2::new(pos.x, pos.y - size.y);
                        sector = south;
                    } else {
                        dir = Vec2::new(rng.next_f32_range(-1.0, 1.0), -dir.y).normalized();
                    }
                }
            }

            if sector != home_sector {
                stage_membership(&mut staged, world, mutator, home_sector).remove(&id);
                stage_membership(&mut staged, world, mutator, sector).insert(id);
                ship.sector.set(sector, mutator);
            }

            pos.x = pos.x.clamp(0.0, size.x);
            pos.y = pos.y.clamp(0.0, size.y);
            ship.position.set(pos, mutator);
            ship.direction.set(dir, mutator);
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

//! Target acquisition, sector by sector.
//!
//! Cells are only written when the chosen target actually changes; an
//! unchanged target must not fork its cell inside a save window.

use crate::error::SimResult;
use crate::event::SimEvent;
use crate::gunnery;
use crate::models::{Faction, Sector, Ship, MAX_TO_HIT_RANGE};
use crate::rng::SubsystemRng;
use crate::snapshot::{Mutator, Perspective};
use crate::subsystem::SimSubsystem;
use crate::types::{ShipId, Tick};
use crate::world::World;

pub struct TargetingSubsystem;

impl TargetingSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TargetingSubsystem {
    fn default() -> Self {
        Self::new()
    }
}

fn clear_targets(ship: &Ship, mutator: &mut Mutator) {
    if ship.target.get(Perspective::Live(mutator)).is_some() {
        ship.target.set(None, mutator);
    }
    for mount in ship.weapons.iter().chain(ship.turrets.iter()) {
        if mount.target.get(Perspective::Live(mutator)).is_some() {
            mount.target.set(None, mutator);
        }
    }
}

impl SimSubsystem for TargetingSubsystem {
    fn name(&self) -> &'static str {
        "targeting"
    }

    fn update(
        &mut self,
        _tick: Tick,
        world: &World,
        mutator: &mut Mutator,
        _events_in: &[SimEvent],
        _rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>> {
        for sector in &world.sectors {
            acquire_for_sector(sector, world, mutator);
        }
        Ok(Vec::new())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn acquire_for_sector(sector: &Sector, world: &World, mutator: &mut Mutator) {
    let members: Vec<ShipId> = sector
        .ships
        .read(Perspective::Live(mutator))
        .iter()
        .copied()
        .collect();

    // Dead ships drop their locks; neutral ships sit the fight out.
    let mut combatants: Vec<ShipId> = Vec::with_capacity(members.len());
    for &id in &members {
        let ship = world.ship(id);
        if ship.is_dead(Perspective::Live(mutator)) {
            clear_targets(ship, mutator);
            continue;
        }
        if ship.faction.get(Perspective::Live(mutator)) == Faction::Neutral {
            continue;
        }
        combatants.push(id);
    }

    for &id in &combatants {
        let ship = world.ship(id);
        let faction = ship.faction.get(Perspective::Live(mutator));
        let own_pos = ship.position.get(Perspective::Live(mutator));

        let candidates: Vec<ShipId> = combatants
            .iter()
            .copied()
            .filter(|&other_id| {
                if other_id == id {
                    return false;
                }
                let other = world.ship(other_id);
                !other.docked.get(Perspective::Live(mutator))
                    && !other.is_dead(Perspective::Live(mutator))
                    && faction.hostile_to(other.faction.get(Perspective::Live(mutator)))
                    && (other.position.get(Perspective::Live(mutator)) - own_pos).magnitude()
                        <= MAX_TO_HIT_RANGE
            })
            .collect();

        let armed = ship.armed_mounts(Perspective::Live(mutator));
        if armed.is_empty() || candidates.is_empty() {
            clear_targets(ship, mutator);
            continue;
        }

        // Primary target: only military kinds pick one. Most important kind
        // first, then the weakest, then the nearest.
        if ship.kind.get(Perspective::Live(mutator)).is_military() {
            let mut best: Option<ShipId> = None;
            for &candidate_id in &candidates {
                let candidate = world.ship(candidate_id);
                let better = match best {
                    None => true,
                    Some(current_id) => {
                        let current = world.ship(current_id);
                        let ck = candidate.kind.get(Perspective::Live(mutator));
                        let bk = current.kind.get(Perspective::Live(mutator));
                        if ck != bk {
                            ck > bk
                        } else {
                            let ch = candidate.current_hull.get(Perspective::Live(mutator));
                            let bh = current.current_hull.get(Perspective::Live(mutator));
                            if ch != bh {
                                ch < bh
                            } else {
                                let cd = (candidate.position.get(Perspective::Live(mutator))
                                    - own_pos)
                                    .magnitude();
                                let bd = (current.position.get(Perspective::Live(mutator))
                                    - own_pos)
                                    .magnitude();
                                cd < bd
                            }
                        }
                    }
                };
                if better {
                    best = Some(candidate_id);
                }
            }
            if ship.target.get(Perspective::Live(mutator)) != best {
                ship.target.set(best, mutator);
            }
        }

        // Each mount takes whatever it can hit best.
        for mount in armed {
            let mut best: Option<(ShipId, f32)> = None;
            for &candidate_id in &candidates {
                let to_hit = gunnery::chance_to_hit(
                    ship,
                    mount,
                    world.ship(candidate_id),
                    Perspective::Live(mutator),
                );
                if to_hit > 0.0 && best.map_or(true, |(_, b)| to_hit > b) {
                    best = Some((candidate_id, to_hit));
                }
            }
            let chosen = best.map(|(c, _)| c);
            if mount.target.get(Perspective::Live(mutator)) != chosen {
                mount.target.set(chosen, mutator);
            }
        }
    }
}

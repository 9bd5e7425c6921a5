//! Weapons fire and hull damage.
//!
//! Cooldowns accumulate per mount: a mount whose cycle has elapsed and whose
//! target is still viable attempts one shot and rewinds its cooldown. Beam
//! weapons have no cycle and burn for damage-over-time instead.

use crate::config::WorldConfig;
use crate::error::SimResult;
use crate::event::SimEvent;
use crate::gunnery;
use crate::models::TURRET_DAMAGE_SCALE;
use crate::rng::SubsystemRng;
use crate::snapshot::{Mutator, Perspective};
use crate::subsystem::SimSubsystem;
use crate::types::{ShipId, Tick, TICK_DELTA};
use crate::world::World;

pub struct CombatSubsystem {
    config: WorldConfig,
}

impl CombatSubsystem {
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for CombatSubsystem {
    fn name(&self) -> &'static str {
        "combat"
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

        // Cooldowns run down whether or not the mount gets to fire.
        for ship in &world.ships {
            for mount in ship.weapons.iter().chain(ship.turrets.iter()) {
                let cooldown = mount.cooldown.get(Perspective::Live(mutator));
                if cooldown > 0.0 {
                    mount.cooldown.set((cooldown - delta).max(0.0), mutator);
                }
            }
        }

        for (i, shooter) in world.ships.iter().enumerate() {
            let shooter_id = ShipId(i as u32);
            if shooter.is_dead(Perspective::Live(mutator))
                || shooter.docked.get(Perspective::Live(mutator))
            {
                continue;
            }

            for mount in shooter.armed_mounts(Perspective::Live(mutator)) {
                let target_id = match mount.target.get(Perspective::Live(mutator)) {
                    Some(t) => t,
                    None => continue,
                };
                let target = world.ship(target_id);
                if target.is_dead(Perspective::Live(mutator))
                    || target.docked.get(Perspective::Live(mutator))
                {
                    continue;
                }
                let weapon = match mount.kind.get(Perspective::Live(mutator)) {
                    Some(w) => w,
                    None => continue,
                };
                let to_hit =
                    gunnery::chance_to_hit(shooter, mount, target, Perspective::Live(mutator));
                if to_hit <= 0.0 {
                    continue;
                }

                let scale = if mount.turret { TURRET_DAMAGE_SCALE } else { 1.0 };
                let mut damage = 0u32;
                if weapon.is_damage_over_time() {
                    if rng.chance(to_hit as f64) {
                        damage = (weapon.damage() * scale * delta).round() as u32;
                    }
                } else if mount.cooldown.get(Perspective::Live(mutator)) == 0.0 {
                    // The cycle restarts whether or not the shot lands.
                    mount.cooldown.set(weapon.cooldown(), mutator);
                    if rng.chance(to_hit as f64) {
                        damage = (weapon.damage() * scale).round() as u32;
                    }
                }

                if damage > 0 {
                    let hull = target.current_hull.get(Perspective::Live(mutator));
                    let new_hull = hull.saturating_sub(damage);
                    target.current_hull.set(new_hull, mutator);
                    if new_hull == 0 {
                        target.timeout.set(self.config.respawn_time, mutator);
                        events.push(SimEvent::ShipDestroyed {
                            tick,
                            ship: target_id,
                            by: shooter_id,
                        });
                        log::debug!(
                            "tick={tick} combat: ship {:?} destroyed by {:?}",
                            target_id,
                            shooter_id
                        );
                    }
                }
            }
        }

        Ok(events)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

//! To-hit math shared by targeting and combat.

use crate::models::{
    Ship, ShipKind, WeaponKind, WeaponMount, WeaponPosition, MAX_TO_HIT_RANGE, TURRET_RANGE_SCALE,
};
use crate::snapshot::Perspective;

/// Aim window for fixed mounts: the target must lie within 45 degrees of
/// the mount's facing.
const AIM_WINDOW_DEG: f32 = 45.0;

/// Chance to hit from the raw numbers: weapon reach (scaled down for
/// turrets) gates the shot, then accuracy is scaled by how easy the target
/// kind is to track.
pub fn chance_to_hit_raw(
    weapon: WeaponKind,
    is_turret: bool,
    target_kind: ShipKind,
    distance: f32,
) -> f32 {
    let mut range = weapon.range();
    if is_turret {
        range *= TURRET_RANGE_SCALE;
    }
    if range < distance {
        return 0.0;
    }
    weapon.accuracy() * target_kind.accuracy_multiplier()
}

/// Chance for `mount` on `shooter` to hit `target`, under the caller's view.
/// Zero when the mount is empty, the ships are in different sectors, the
/// target is out of reach, or a fixed mount is not facing it.
pub fn chance_to_hit(
    shooter: &Ship,
    mount: &WeaponMount,
    target: &Ship,
    view: Perspective<'_>,
) -> f32 {
    let weapon = match mount.kind.get(view) {
        Some(w) => w,
        None => return 0.0,
    };
    if shooter.sector.get(view) != target.sector.get(view) {
        return 0.0;
    }

    let target_vector = target.position.get(view) - shooter.position.get(view);
    let distance = target_vector.magnitude();
    if distance > MAX_TO_HIT_RANGE {
        return 0.0;
    }

    if !mount.turret {
        let dir = shooter.direction.get(view);
        let aim = match mount.position.get(view) {
            WeaponPosition::Port => dir.port(),
            WeaponPosition::Starboard => dir.starboard(),
            WeaponPosition::Bow => dir,
        };
        if aim.angle_deg(target_vector) > AIM_WINDOW_DEG {
            return 0.0;
        }
    }

    chance_to_hit_raw(weapon, mount.turret, target.kind.get(view), distance)
}

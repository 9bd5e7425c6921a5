//! The world arenas and the queries subsystems share.
//!
//! RULE: Only worldgen pushes into the arenas. After generation the shape of
//! the world is fixed; everything that changes per tick changes through
//! snapshot cells, so the world can be lent to the save reader as a plain
//! shared reference while the simulation keeps writing.

use crate::models::{
    Destination, DestinationObject, Jumpgate, Sector, Ship, ShipKind, Station, SHIP_KINDS,
};
use crate::rng::SubsystemRng;
use crate::snapshot::SaveCoordinator;
use crate::types::{JumpgateId, SectorId, ShipId, StationId};
use crate::vec2::Vec2;

pub struct World {
    pub coordinator: SaveCoordinator,
    pub rows: usize,
    pub cols: usize,
    pub sectors: Vec<Sector>,
    pub jumpgates: Vec<Jumpgate>,
    pub stations: Vec<Station>,
    pub ships: Vec<Ship>,
    /// Ship index 0 by construction.
    pub player_ship: ShipId,
}

impl World {
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.0 as usize]
    }

    pub fn jumpgate(&self, id: JumpgateId) -> &Jumpgate {
        &self.jumpgates[id.0 as usize]
    }

    pub fn station(&self, id: StationId) -> &Station {
        &self.stations[id.0 as usize]
    }

    pub fn ship(&self, id: ShipId) -> &Ship {
        &self.ships[id.0 as usize]
    }

    pub fn sector_id_at(&self, row: usize, col: usize) -> SectorId {
        SectorId((row * self.cols + col) as u32)
    }

    /// Where a destination currently is. An attached object wins over the
    /// stored point; objects are placed once at worldgen, so this is a plain
    /// lookup.
    pub fn destination_position(&self, dest: &Destination) -> Vec2<f32> {
        match dest.object {
            Some(DestinationObject::Jumpgate(id)) => self.jumpgate(id).position,
            Some(DestinationObject::Station(id)) => self.station(id).position,
            None => dest.position,
        }
    }

    /// Build a destination pointing at a fixture.
    pub fn destination_to(&self, object: DestinationObject) -> Destination {
        let (sector, position) = match object {
            DestinationObject::Jumpgate(id) => {
                let g = self.jumpgate(id);
                (g.sector, g.position)
            }
            DestinationObject::Station(id) => {
                let s = self.station(id);
                (s.sector, s.position)
            }
        };
        Destination {
            sector,
            position,
            object: Some(object),
        }
    }

    /// Pick a travel destination within a sector: usually a station or a
    /// jumpgate, sometimes (with `misc_chance`, or when nothing qualifies)
    /// an arbitrary point.
    pub fn random_destination(
        &self,
        sector_id: SectorId,
        use_jumpgates: bool,
        misc_chance: f64,
        excludes: &[DestinationObject],
        rng: &mut SubsystemRng,
    ) -> Destination {
        let sector = self.sector(sector_id);

        let misc = misc_chance > 0.0 && rng.chance(misc_chance);
        if !misc {
            let mut candidates: Vec<DestinationObject> = sector
                .stations
                .iter()
                .map(|&s| DestinationObject::Station(s))
                .collect();
            if use_jumpgates {
                candidates.extend(sector.gates.all().into_iter().map(DestinationObject::Jumpgate));
            }
            candidates.retain(|c| !excludes.contains(c));

            if !candidates.is_empty() {
                let pick = candidates[rng.next_u64_below(candidates.len() as u64) as usize];
                return self.destination_to(pick);
            }
        }

        Destination {
            sector: sector_id,
            position: random_position(Vec2::new(0.0, 0.0), sector.size, rng),
            object: None,
        }
    }

    pub fn random_position_in_sector(
        &self,
        sector_id: SectorId,
        wall_buffer: f32,
        rng: &mut SubsystemRng,
    ) -> Vec2<f32> {
        let size = self.sector(sector_id).size;
        random_position(
            Vec2::new(wall_buffer, wall_buffer),
            Vec2::new(size.x - wall_buffer, size.y - wall_buffer),
            rng,
        )
    }

    pub fn random_sector(&self, rng: &mut SubsystemRng) -> SectorId {
        SectorId(rng.next_u64_below(self.sectors.len() as u64) as u32)
    }

    pub fn random_station(&self, rng: &mut SubsystemRng) -> Option<StationId> {
        if self.stations.is_empty() {
            return None;
        }
        Some(StationId(
            rng.next_u64_below(self.stations.len() as u64) as u32
        ))
    }
}

pub fn random_position(min: Vec2<f32>, max: Vec2<f32>, rng: &mut SubsystemRng) -> Vec2<f32> {
    Vec2::new(
        rng.next_f32_range(min.x, max.x),
        rng.next_f32_range(min.y, max.y),
    )
}

/// Unit-length heading. Re-rolls the (vanishingly rare) zero vector.
pub fn random_direction(rng: &mut SubsystemRng) -> Vec2<f32> {
    loop {
        let d = Vec2::new(rng.next_f32_range(-1.0, 1.0), rng.next_f32_range(-1.0, 1.0));
        if d.magnitude() > 0.0 {
            return d.normalized();
        }
    }
}

pub fn random_ship_kind(rng: &mut SubsystemRng) -> ShipKind {
    SHIP_KINDS[rng.next_u64_below(SHIP_KINDS.len() as u64) as usize]
}

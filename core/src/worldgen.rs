//! World generation: the sector grid, jumpgate network, stations and the
//! starting ship population.
//!
//! Generation runs before the first tick, with no save window open, so all
//! cell writes here are plain in-place stores. Everything generated is
//! reachable from the arenas only through ids.

use crate::config::WorldConfig;
use crate::error::SimResult;
use crate::models::{
    Faction, Jumpgate, Sector, SectorGates, Ship, Station, WeaponKind, WeaponMount,
    WeaponPosition, FIXED_MOUNTS, TURRET_MOUNTS,
};
use crate::namegen::{random_code, ShipNamer};
use crate::rng::SubsystemRng;
use crate::snapshot::{HandleCell, Mutator, SaveCoordinator, SnapCell, SnapVec2};
use crate::types::{EntityIdGen, JumpgateId, SectorId, ShipId, StationId};
use crate::vec2::Vec2;
use crate::world::{self, World};
use std::collections::{BTreeSet, HashMap};

/// Minimum spacing between a station and any other fixture.
const STATION_CLEARANCE: f32 = 2.0;
const STATION_PLACEMENT_TRIES: usize = 10;

#[derive(Clone, Copy, PartialEq)]
enum Edge {
    North,
    East,
    South,
    West,
}

impl Edge {
    fn opposite(self) -> Edge {
        match self {
            Edge::North => Edge::South,
            Edge::East => Edge::West,
            Edge::South => Edge::North,
            Edge::West => Edge::East,
        }
    }

    /// Band along this edge in which a gate may sit: middle third of the
    /// edge, pulled slightly off the wall.
    fn gate_band(self, size: Vec2<f32>) -> (Vec2<f32>, Vec2<f32>) {
        match self {
            Edge::North => (
                Vec2::new(size.x / 3.0 + 0.1, 0.25),
                Vec2::new(2.0 * size.x / 3.0 - 0.1, size.y / 5.0),
            ),
            Edge::East => (
                Vec2::new(4.0 * size.x / 5.0, size.y / 3.0 + 0.1),
                Vec2::new(size.x - 0.25, 2.0 * size.y / 3.0 - 0.1),
            ),
            Edge::South => (
                Vec2::new(size.x / 3.0 + 0.1, 4.0 * size.y / 5.0),
                Vec2::new(2.0 * size.x / 3.0 - 0.1, size.y - 0.25),
            ),
            Edge::West => (
                Vec2::new(0.25, size.y / 3.0 + 0.1),
                Vec2::new(size.x / 5.0, 2.0 * size.y / 3.0 - 0.1),
            ),
        }
    }
}

fn neighbor_of(sector: &Sector, edge: Edge) -> Option<SectorId> {
    match edge {
        Edge::North => sector.neighbors.north,
        Edge::East => sector.neighbors.east,
        Edge::South => sector.neighbors.south,
        Edge::West => sector.neighbors.west,
    }
}

fn gate_of(gates: &SectorGates, edge: Edge) -> Option<JumpgateId> {
    match edge {
        Edge::North => gates.north,
        Edge::East => gates.east,
        Edge::South => gates.south,
        Edge::West => gates.west,
    }
}

fn set_gate(gates: &mut SectorGates, edge: Edge, id: JumpgateId) {
    match edge {
        Edge::North => gates.north = Some(id),
        Edge::East => gates.east = Some(id),
        Edge::South => gates.south = Some(id),
        Edge::West => gates.west = Some(id),
    }
}

pub fn generate(
    config: &WorldConfig,
    coordinator: &SaveCoordinator,
    mutator: &mut Mutator,
    rng: &mut SubsystemRng,
    namer: &mut ShipNamer,
    id_gen: &mut EntityIdGen,
) -> SimResult<World> {
    config.validate()?;

    let size = Vec2::new(config.sector_width, config.sector_height);
    let mut sectors = init_sectors(config, size, coordinator, id_gen);
    let jumpgates = if config.use_jumpgates {
        init_jumpgates(&mut sectors, size, rng, id_gen)
    } else {
        Vec::new()
    };
    let stations = init_stations(&mut sectors, &jumpgates, config, rng, id_gen);

    let mut world = World {
        coordinator: coordinator.clone(),
        rows: config.sector_rows,
        cols: config.sector_cols,
        sectors,
        jumpgates,
        stations,
        ships: Vec::new(),
        player_ship: ShipId(0),
    };

    init_ships(&mut world, config, coordinator, mutator, rng, namer, id_gen);

    log::info!(
        "world generated: {}x{} sectors, {} jumpgates, {} stations, {} ships",
        world.rows,
        world.cols,
        world.jumpgates.len(),
        world.stations.len(),
        world.ships.len()
    );
    Ok(world)
}

fn init_sectors(
    config: &WorldConfig,
    size: Vec2<f32>,
    coordinator: &SaveCoordinator,
    id_gen: &mut EntityIdGen,
) -> Vec<Sector> {
    let rows = config.sector_rows;
    let cols = config.sector_cols;
    let mut sectors = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        for col in 0..cols {
            let name = format!("{}{:02}", (b'A' + col as u8) as char, row + 1);
            sectors.push(Sector {
                id: id_gen.next_id(),
                row,
                col,
                name,
                size,
                neighbors: Default::default(),
                gates: Default::default(),
                stations: Vec::new(),
                ships: SnapCell::new(BTreeSet::new(), coordinator),
            });
        }
    }

    for row in 0..rows {
        for col in 0..cols {
            let at = |r: usize, c: usize| SectorId((r * cols + c) as u32);
            let n = &mut sectors[row * cols + col].neighbors;
            n.north = (row > 0).then(|| at(row - 1, col));
            n.south = (row + 1 < rows).then(|| at(row + 1, col));
            n.west = (col > 0).then(|| at(row, col - 1));
            n.east = (col + 1 < cols).then(|| at(row, col + 1));
        }
    }
    sectors
}

fn add_gate_pair(
    sectors: &mut [Sector],
    gates: &mut Vec<Jumpgate>,
    idx: usize,
    edge: Edge,
    size: Vec2<f32>,
    rng: &mut SubsystemRng,
    id_gen: &mut EntityIdGen,
) -> bool {
    let neighbor_id = match neighbor_of(&sectors[idx], edge) {
        Some(n) => n,
        None => return false,
    };
    if gate_of(&sectors[idx].gates, edge).is_some()
        || gate_of(&sectors[neighbor_id.0 as usize].gates, edge.opposite()).is_some()
    {
        return false;
    }

    let (lmin, lmax) = edge.gate_band(size);
    let (rmin, rmax) = edge.opposite().gate_band(size);
    let local_pos = world::random_position(lmin, lmax, rng);
    let remote_pos = world::random_position(rmin, rmax, rng);

    let local_id = JumpgateId(gates.len() as u32);
    let remote_id = JumpgateId(gates.len() as u32 + 1);
    gates.push(Jumpgate {
        id: id_gen.next_id(),
        sector: SectorId(idx as u32),
        position: local_pos,
        target: remote_id,
    });
    gates.push(Jumpgate {
        id: id_gen.next_id(),
        sector: neighbor_id,
        position: remote_pos,
        target: local_id,
    });
    set_gate(&mut sectors[idx].gates, edge, local_id);
    set_gate(
        &mut sectors[neighbor_id.0 as usize].gates,
        edge.opposite(),
        remote_id,
    );
    true
}

/// Place paired gates on shared edges. Each sector rolls how many routes it
/// wants and populates its south/west edges (the grid is walked row-major,
/// so north/east were the neighbor's turn); any sector that ends up isolated
/// is joined through whichever neighbor has the fewest gates.
fn init_jumpgates(
    sectors: &mut [Sector],
    size: Vec2<f32>,
    rng: &mut SubsystemRng,
    id_gen: &mut EntityIdGen,
) -> Vec<Jumpgate> {
    let mut gates: Vec<Jumpgate> = Vec::with_capacity(sectors.len() * 2);

    for idx in 0..sectors.len() {
        let neighbor_count = sectors[idx].neighbors.count();
        if neighbor_count == 0 {
            continue;
        }
        let mut want = 1 + rng.next_u64_below(neighbor_count as u64) as i64
            - sectors[idx].gates.count() as i64;

        loop {
            let south_open = neighbor_of(&sectors[idx], Edge::South).is_some()
                && gate_of(&sectors[idx].gates, Edge::South).is_none();
            let west_open = neighbor_of(&sectors[idx], Edge::West).is_some()
                && gate_of(&sectors[idx].gates, Edge::West).is_none();
            if want <= 0 || (!south_open && !west_open) {
                break;
            }
            if south_open
                && rng.chance(0.5)
                && add_gate_pair(sectors, &mut gates, idx, Edge::South, size, rng, id_gen)
            {
                want -= 1;
            }
            if want > 0
                && west_open
                && rng.chance(0.5)
                && add_gate_pair(sectors, &mut gates, idx, Edge::West, size, rng, id_gen)
            {
                want -= 1;
            }
        }

        // An unlucky walk can leave a sector with no gate at all; join it
        // through the least-connected neighbor.
        if sectors[idx].gates.count() == 0 {
            let mut best: Option<(Edge, usize)> = None;
            for edge in [Edge::North, Edge::East, Edge::South, Edge::West] {
                if let Some(n) = neighbor_of(&sectors[idx], edge) {
                    let count = sectors[n.0 as usize].gates.count();
                    if best.map_or(true, |(_, c)| count < c) {
                        best = Some((edge, count));
                    }
                }
            }
            if let Some((edge, _)) = best {
                add_gate_pair(sectors, &mut gates, idx, edge, size, rng, id_gen);
            }
        }
    }

    gates
}

fn init_stations(
    sectors: &mut [Sector],
    jumpgates: &[Jumpgate],
    config: &WorldConfig,
    rng: &mut SubsystemRng,
    id_gen: &mut EntityIdGen,
) -> Vec<Station> {
    let mut stations: Vec<Station> = Vec::new();

    for idx in 0..sectors.len() {
        let t = rng.next_f32_range(0.0, 1.0 + config.no_stations_frequency as f32);
        if t <= config.no_stations_frequency as f32 {
            continue;
        }

        // The roll that cleared the no-station band also sizes the cluster.
        let mut count = 1usize;
        for i in (2..=config.max_stations_per_sector).rev() {
            if t > config.no_stations_frequency as f32 + 1.0 - 1.0 / i as f32 {
                count = i;
                break;
            }
        }

        let size = sectors[idx].size;
        let gate_positions: Vec<Vec2<f32>> = sectors[idx]
            .gates
            .all()
            .into_iter()
            .map(|g| jumpgates[g.0 as usize].position)
            .collect();

        let mut placed: Vec<Vec2<f32>> = Vec::with_capacity(count);
        for _ in 0..count {
            let mut chosen: Option<Vec2<f32>> = None;
            for _ in 0..STATION_PLACEMENT_TRIES {
                let pos = world::random_position(
                    Vec2::new(STATION_CLEARANCE, STATION_CLEARANCE),
                    Vec2::new(size.x - STATION_CLEARANCE, size.y - STATION_CLEARANCE),
                    rng,
                );
                let clear = gate_positions
                    .iter()
                    .chain(placed.iter())
                    .all(|&p| (p - pos).magnitude() >= STATION_CLEARANCE);
                if clear {
                    chosen = Some(pos);
                    break;
                }
            }
            if let Some(pos) = chosen {
                let station_id = StationId(stations.len() as u32);
                stations.push(Station {
                    id: id_gen.next_id(),
                    sector: SectorId(idx as u32),
                    position: pos,
                });
                sectors[idx].stations.push(station_id);
                placed.push(pos);
            }
        }
    }

    stations
}

fn init_ships(
    world: &mut World,
    config: &WorldConfig,
    coordinator: &SaveCoordinator,
    mutator: &mut Mutator,
    rng: &mut SubsystemRng,
    namer: &mut ShipNamer,
    id_gen: &mut EntityIdGen,
) {
    let mut memberships: HashMap<SectorId, BTreeSet<ShipId>> = HashMap::new();

    for i in 0..config.ship_count {
        let is_player = i == 0;
        let sector_id = world.random_sector(rng);
        let kind = world::random_ship_kind(rng);
        let code = random_code(rng);
        let name = namer.next_name(kind);
        let pos = world.random_position_in_sector(sector_id, config.wall_buffer, rng);
        let misc_chance = if is_player {
            0.0
        } else {
            config.misc_destination_chance
        };
        let dest = world.random_destination(sector_id, config.use_jumpgates, misc_chance, &[], rng);
        let mut dir = (world.destination_position(&dest) - pos).normalized();
        if dir.magnitude() == 0.0 {
            dir = world::random_direction(rng);
        }

        let faction = if is_player {
            Faction::Player
        } else {
            roll_faction(config, rng)
        };

        let ship = Ship {
            id: SnapCell::new(id_gen.next_id(), coordinator),
            kind: SnapCell::new(kind, coordinator),
            faction: SnapCell::new(faction, coordinator),
            code: SnapCell::new(code, coordinator),
            name: SnapCell::new(name, coordinator),
            sector: HandleCell::new(sector_id, coordinator),
            position: SnapVec2::new(pos, coordinator),
            direction: SnapVec2::new(dir, coordinator),
            speed: SnapCell::new(kind.speed(), coordinator),
            max_hull: SnapCell::new(kind.hull(), coordinator),
            current_hull: SnapCell::new(kind.hull(), coordinator),
            destination: HandleCell::new(Some(dest), coordinator),
            target: HandleCell::new(None, coordinator),
            docked: SnapCell::new(false, coordinator),
            timeout: SnapCell::new(0.0, coordinator),
            weapons: build_mounts(kind.fixed_loadout(), FIXED_MOUNTS, false, coordinator, id_gen),
            turrets: build_mounts(
                kind.turret_loadout()
                    .iter()
                    .map(|&k| (k, WeaponPosition::Bow))
                    .collect(),
                TURRET_MOUNTS,
                true,
                coordinator,
                id_gen,
            ),
        };
        world.ships.push(ship);
        memberships
            .entry(sector_id)
            .or_default()
            .insert(ShipId(i as u32));
    }

    for (sector_id, members) in memberships {
        world.sector(sector_id).ships.set(members, mutator);
    }
}

fn roll_faction(config: &WorldConfig, rng: &mut SubsystemRng) -> Faction {
    let roll = rng.next_f64();
    if roll < config.player_frequency {
        Faction::Player
    } else if roll < config.player_frequency + config.friend_frequency {
        Faction::Friend
    } else if roll < config.player_frequency + config.friend_frequency + config.enemy_frequency {
        Faction::Foe
    } else {
        Faction::Neutral
    }
}

fn build_mounts(
    loadout: Vec<(WeaponKind, WeaponPosition)>,
    capacity: usize,
    turret: bool,
    coordinator: &SaveCoordinator,
    id_gen: &mut EntityIdGen,
) -> Vec<WeaponMount> {
    debug_assert!(loadout.len() <= capacity, "loadout exceeds mount capacity");
    let mut mounts = Vec::with_capacity(capacity);
    for slot in 0..capacity {
        let (kind, position) = match loadout.get(slot) {
            Some(&(k, p)) => (Some(k), p),
            None => (None, WeaponPosition::Bow),
        };
        mounts.push(WeaponMount {
            id: SnapCell::new(id_gen.next_id(), coordinator),
            turret,
            kind: SnapCell::new(kind, coordinator),
            position: SnapCell::new(position, coordinator),
            cooldown: SnapCell::new(0.0, coordinator),
            target: HandleCell::new(None, coordinator),
        });
    }
    mounts
}

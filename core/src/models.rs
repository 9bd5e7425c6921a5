//! The entity model: sectors, jumpgates, stations, ships, weapon mounts.
//!
//! Cross-references are arena ids (`SectorId`, `ShipId`, ...), never
//! pointers. Every field the simulation mutates lives in a snapshot cell;
//! data fixed at worldgen (layout, placement) stays plain. Entities are
//! never torn down mid-run — respawn rewrites a ship through its existing
//! cells, so no cell is ever destroyed while a save window is open.

use crate::snapshot::{HandleCell, SaveCoordinator, SnapCell, SnapVec2};
use crate::types::{EntityId, JumpgateId, SectorId, ShipId, StationId};
use crate::vec2::Vec2;
use std::collections::BTreeSet;

/// World units per raw stat point; keeps the stat tables in round numbers.
pub const DISTANCE_MULTIPLIER: f32 = 0.002;

/// Longest weapon range — anything farther can be skipped outright.
pub const MAX_TO_HIT_RANGE: f32 = 2000.0 * DISTANCE_MULTIPLIER;

pub const TURRET_RANGE_SCALE:  f32 = 0.5;
pub const TURRET_DAMAGE_SCALE: f32 = 0.7;

/// Fixed mount capacity per ship; the largest loadout (frigate) sets it.
pub const FIXED_MOUNTS:  usize = 4;
pub const TURRET_MOUNTS: usize = 4;

// ── Ship kinds ─────────────────────────────────────────────────

/// Ship kinds in order of target importance, least to greatest,
/// all civilian kinds first. The derived ordering is load-bearing
/// for target selection — append with care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShipKind {
    Courier,
    Transport,
    Scout,
    Corvette,
    Frigate,
}

pub const SHIP_KINDS: [ShipKind; 5] = [
    ShipKind::Courier,
    ShipKind::Transport,
    ShipKind::Scout,
    ShipKind::Corvette,
    ShipKind::Frigate,
];

impl ShipKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Courier   => "Courier",
            Self::Transport => "Transport",
            Self::Scout     => "Scout",
            Self::Corvette  => "Corvette",
            Self::Frigate   => "Frigate",
        }
    }

    /// Label padded to the widest kind, for column-aligned status lines.
    pub fn padded_label(self) -> &'static str {
        match self {
            Self::Courier   => "Courier  ",
            Self::Transport => "Transport",
            Self::Scout     => "Scout    ",
            Self::Corvette  => "Corvette ",
            Self::Frigate   => "Frigate  ",
        }
    }

    pub fn speed(self) -> f32 {
        let raw: f32 = match self {
            Self::Courier   => 600.0,
            Self::Transport => 300.0,
            Self::Scout     => 500.0,
            Self::Corvette  => 400.0,
            Self::Frigate   => 200.0,
        };
        raw * DISTANCE_MULTIPLIER
    }

    pub fn hull(self) -> u32 {
        match self {
            Self::Courier   => 300,
            Self::Transport => 800,
            Self::Scout     => 500,
            Self::Corvette  => 1200,
            Self::Frigate   => 1800,
        }
    }

    /// How easy this kind is to hit.
    pub fn accuracy_multiplier(self) -> f32 {
        match self {
            Self::Courier   => 0.75,
            Self::Transport => 1.0,
            Self::Scout     => 0.6,
            Self::Corvette  => 1.2,
            Self::Frigate   => 1.8,
        }
    }

    /// Military kinds pick a primary target; civilians only defend with
    /// turrets.
    pub fn is_military(self) -> bool {
        self >= Self::Scout
    }

    /// Frigates mount their fixed weapons broadside instead of forward.
    pub fn is_side_fire(self) -> bool {
        matches!(self, Self::Frigate)
    }

    /// Fixed weapon loadout with mount positions. Side-fire kinds carry
    /// their base battery doubled, half to starboard and half to port.
    pub fn fixed_loadout(self) -> Vec<(WeaponKind, WeaponPosition)> {
        let base: &[WeaponKind] = match self {
            Self::Scout    => &[WeaponKind::Pulse, WeaponKind::Pulse],
            Self::Corvette => &[WeaponKind::Pulse, WeaponKind::Pulse, WeaponKind::Cannon],
            Self::Frigate  => &[WeaponKind::Cannon, WeaponKind::Cannon],
            _ => &[],
        };
        if self.is_side_fire() {
            let mut loadout = Vec::with_capacity(base.len() * 2);
            for &kind in base {
                loadout.push((kind, WeaponPosition::Starboard));
            }
            for &kind in base {
                loadout.push((kind, WeaponPosition::Port));
            }
            loadout
        } else {
            base.iter().map(|&k| (k, WeaponPosition::Bow)).collect()
        }
    }

    pub fn turret_loadout(self) -> &'static [WeaponKind] {
        match self {
            Self::Courier   => &[WeaponKind::Pulse],
            Self::Transport => &[WeaponKind::Pulse, WeaponKind::Pulse],
            Self::Corvette  => &[WeaponKind::Pulse, WeaponKind::Pulse],
            Self::Frigate   => &[
                WeaponKind::Pulse,
                WeaponKind::Pulse,
                WeaponKind::Beam,
                WeaponKind::Beam,
            ],
            Self::Scout => &[],
        }
    }
}

// ── Factions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Neutral,
    Player,
    Friend,
    Foe,
}

impl Faction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Player  => "Player",
            Self::Friend  => "Friend",
            Self::Foe     => "Foe",
        }
    }

    /// Neutral ships stay out of the combat system entirely; player and
    /// friendly ships never fight each other.
    pub fn hostile_to(self, other: Faction) -> bool {
        match (self, other) {
            (Self::Neutral, _) | (_, Self::Neutral) => false,
            (a, b) if a == b => false,
            (Self::Player, Self::Friend) | (Self::Friend, Self::Player) => false,
            _ => true,
        }
    }
}

// ── Weapons ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    Pulse,
    Cannon,
    Beam,
}

impl WeaponKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pulse  => "Pulse",
            Self::Cannon => "Cannon",
            Self::Beam   => "Beam",
        }
    }

    pub fn range(self) -> f32 {
        let raw: f32 = match self {
            Self::Pulse  => 1000.0,
            Self::Cannon => 2000.0,
            Self::Beam   => 750.0,
        };
        raw * DISTANCE_MULTIPLIER
    }

    /// Seconds between shots. Beams have no cycle — they burn continuously.
    pub fn cooldown(self) -> f32 {
        match self {
            Self::Pulse  => 1.0 / 3.0,
            Self::Cannon => 1.0,
            Self::Beam   => 0.0,
        }
    }

    /// Damage per shot, or per second for damage-over-time weapons.
    pub fn damage(self) -> f32 {
        match self {
            Self::Pulse  => 20.0,
            Self::Cannon => 60.0,
            Self::Beam   => 20.0,
        }
    }

    pub fn accuracy(self) -> f32 {
        match self {
            Self::Pulse  => 0.8,
            Self::Cannon => 0.5,
            Self::Beam   => 0.95,
        }
    }

    pub fn is_damage_over_time(self) -> bool {
        matches!(self, Self::Beam)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponPosition {
    Bow,
    Port,
    Starboard,
}

impl WeaponPosition {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bow       => "Bow",
            Self::Port      => "Port",
            Self::Starboard => "Starboard",
        }
    }
}

// ── Destinations ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DestinationObject {
    Jumpgate(JumpgateId),
    Station(StationId),
}

/// Where a ship is headed: a fixed point, or an object whose position wins
/// when set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub sector: SectorId,
    pub position: Vec2<f32>,
    pub object: Option<DestinationObject>,
}

// ── Sectors and fixtures ───────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct SectorNeighbors {
    pub north: Option<SectorId>,
    pub east:  Option<SectorId>,
    pub south: Option<SectorId>,
    pub west:  Option<SectorId>,
}

impl SectorNeighbors {
    pub fn count(&self) -> usize {
        self.all().len()
    }

    pub fn all(&self) -> Vec<SectorId> {
        [self.north, self.east, self.south, self.west]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SectorGates {
    pub north: Option<JumpgateId>,
    pub east:  Option<JumpgateId>,
    pub south: Option<JumpgateId>,
    pub west:  Option<JumpgateId>,
}

impl SectorGates {
    pub fn count(&self) -> usize {
        self.all().len()
    }

    pub fn all(&self) -> Vec<JumpgateId> {
        [self.north, self.east, self.south, self.west]
            .into_iter()
            .flatten()
            .collect()
    }
}

pub struct Sector {
    pub id: EntityId,
    pub row: usize,
    pub col: usize,
    /// "A01" style: column letter, row number.
    pub name: String,
    pub size: Vec2<f32>,
    pub neighbors: SectorNeighbors,
    pub gates: SectorGates,
    pub stations: Vec<StationId>,
    /// Which ships are currently in this sector. A `BTreeSet` so every walk
    /// of the membership is in id order.
    pub ships: SnapCell<BTreeSet<ShipId>>,
}

pub struct Jumpgate {
    pub id: EntityId,
    pub sector: SectorId,
    pub position: Vec2<f32>,
    /// The paired gate this one leads to.
    pub target: JumpgateId,
}

pub struct Station {
    pub id: EntityId,
    pub sector: SectorId,
    pub position: Vec2<f32>,
}

// ── Ships ──────────────────────────────────────────────────────

/// One weapon hardpoint. Slots are allocated once per ship at worldgen and
/// rewritten on respawn; `kind: None` marks an empty slot. A rearmed slot is
/// a new entity, so the display id is a cell too.
pub struct WeaponMount {
    pub id: SnapCell<EntityId>,
    pub turret: bool,
    pub kind: SnapCell<Option<WeaponKind>>,
    pub position: SnapCell<WeaponPosition>,
    pub cooldown: SnapCell<f32>,
    pub target: HandleCell<Option<ShipId>>,
}

impl WeaponMount {
    pub fn empty(id: EntityId, turret: bool, coordinator: &SaveCoordinator) -> Self {
        Self {
            id: SnapCell::new(id, coordinator),
            turret,
            kind: SnapCell::new(None, coordinator),
            position: SnapCell::new(WeaponPosition::Bow, coordinator),
            cooldown: SnapCell::new(0.0, coordinator),
            target: HandleCell::new(None, coordinator),
        }
    }
}

pub struct Ship {
    /// Display id; a respawned ship is a new entity and gets a fresh one.
    pub id: SnapCell<EntityId>,
    pub kind: SnapCell<ShipKind>,
    pub faction: SnapCell<Faction>,
    pub code: SnapCell<String>,
    pub name: SnapCell<String>,
    pub sector: HandleCell<SectorId>,
    pub position: SnapVec2<f32>,
    pub direction: SnapVec2<f32>,
    pub speed: SnapCell<f32>,
    pub max_hull: SnapCell<u32>,
    pub current_hull: SnapCell<u32>,
    pub destination: HandleCell<Option<Destination>>,
    pub target: HandleCell<Option<ShipId>>,
    pub docked: SnapCell<bool>,
    /// Seconds left of whatever delay the ship is under (docked, dead).
    pub timeout: SnapCell<f32>,
    pub weapons: Vec<WeaponMount>,
    pub turrets: Vec<WeaponMount>,
}

impl Ship {
    pub fn is_dead(&self, view: crate::snapshot::Perspective<'_>) -> bool {
        self.current_hull.get(view) == 0
    }

    pub fn hull_fraction(&self, view: crate::snapshot::Perspective<'_>) -> f32 {
        let max = self.max_hull.get(view);
        if max == 0 {
            return 0.0;
        }
        self.current_hull.get(view) as f32 / max as f32
    }

    /// Active fixed mounts followed by active turrets.
    pub fn armed_mounts(&self, view: crate::snapshot::Perspective<'_>) -> Vec<&WeaponMount> {
        self.weapons
            .iter()
            .chain(self.turrets.iter())
            .filter(|m| m.kind.get(view).is_some())
            .collect()
    }
}

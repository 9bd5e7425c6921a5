//! Savegame dumps — the whole world as tagged-attribute text.
//!
//! Every mutable field is read through the caller's [`Perspective`], so the
//! same code path produces the live dump (mutator role, between ticks) and
//! the background snapshot dump (reader role, inside a save window). The
//! snapshot machinery knows nothing about this format; it is layered
//! entirely on top of cell reads.

use crate::models::{Sector, Ship, Station, WeaponMount};
use crate::snapshot::Perspective;
use crate::types::EntityId;
use crate::vec2::Vec2;
use crate::world::World;

const INDENT: &str = "  ";

type Attrs = Vec<(&'static str, String)>;

pub struct SaveSerializer;

impl SaveSerializer {
    pub fn new() -> Self {
        Self
    }

    // ── Low-level pieces ───────────────────────────────────────

    fn open(&self, tag: &str, attrs: &Attrs, self_close: bool) -> String {
        let mut out = String::new();
        out.push('<');
        out.push_str(tag);
        for (name, value) in attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push_str(if self_close { "/>" } else { ">" });
        out
    }

    fn close(&self, tag: &str) -> String {
        format!("</{tag}>")
    }

    fn id(&self, id: EntityId) -> String {
        format!("[0x{:04x}]", id.0)
    }

    fn number<T: std::fmt::Display>(&self, v: T) -> String {
        format!("{v}")
    }

    fn boolean(&self, v: bool) -> String {
        if v { "true" } else { "false" }.to_string()
    }

    fn vector2(&self, v: Vec2<f32>) -> String {
        format!("({}, {})", v.x, v.y)
    }

    fn rowcol(&self, row: usize, col: usize) -> String {
        format!("({row}, {col})")
    }

    // ── Entities ───────────────────────────────────────────────

    pub fn sector(
        &self,
        world: &World,
        sector: &Sector,
        view: Perspective<'_>,
        indent: &str,
    ) -> String {
        let subindent = format!("{indent}{INDENT}");
        let attrs: Attrs = vec![
            ("id", self.id(sector.id)),
            ("rowcol", self.rowcol(sector.row, sector.col)),
            ("name", sector.name.clone()),
            ("size", self.vector2(sector.size)),
        ];

        let mut out = String::new();
        out.push_str(indent);
        out.push_str(&self.open("sector", &attrs, false));
        out.push('\n');

        let gates = sector.gates.all();
        if !gates.is_empty() {
            let inner = format!("{subindent}{INDENT}");
            out.push_str(&subindent);
            out.push_str(&self.open(
                "jumpgates",
                &vec![("count", self.number(gates.len()))],
                false,
            ));
            out.push('\n');
            for gate_id in gates {
                out.push_str(&self.jumpgate(world, sector, gate_id, &inner));
                out.push('\n');
            }
            out.push_str(&subindent);
            out.push_str(&self.close("jumpgates"));
            out.push('\n');
        }

        if !sector.stations.is_empty() {
            let inner = format!("{subindent}{INDENT}");
            out.push_str(&subindent);
            out.push_str(&self.open(
                "stations",
                &vec![("count", self.number(sector.stations.len()))],
                false,
            ));
            out.push('\n');
            for &station_id in &sector.stations {
                out.push_str(&self.station(world.station(station_id), &inner));
                out.push('\n');
            }
            out.push_str(&subindent);
            out.push_str(&self.close("stations"));
            out.push('\n');
        }

        let ships = sector.ships.read(view);
        if !ships.is_empty() {
            let inner = format!("{subindent}{INDENT}");
            out.push_str(&subindent);
            out.push_str(&self.open("ships", &vec![("count", self.number(ships.len()))], false));
            out.push('\n');
            for &ship_id in ships.iter() {
                out.push_str(&self.ship(world, world.ship(ship_id), view, &inner));
                out.push('\n');
            }
            out.push_str(&subindent);
            out.push_str(&self.close("ships"));
            out.push('\n');
        }

        out.push_str(indent);
        out.push_str(&self.close("sector"));
        out
    }

    fn jumpgate(
        &self,
        world: &World,
        sector: &Sector,
        gate_id: crate::types::JumpgateId,
        indent: &str,
    ) -> String {
        let gate = world.jumpgate(gate_id);
        let nesw = if sector.gates.north == Some(gate_id) {
            "north"
        } else if sector.gates.east == Some(gate_id) {
            "east"
        } else if sector.gates.south == Some(gate_id) {
            "south"
        } else if sector.gates.west == Some(gate_id) {
            "west"
        } else {
            ""
        };
        let attrs: Attrs = vec![
            ("id", self.id(gate.id)),
            ("nesw", nesw.to_string()),
            ("position", self.vector2(gate.position)),
            ("target", self.id(world.jumpgate(gate.target).id)),
        ];
        format!("{indent}{}", self.open("jumpgate", &attrs, true))
    }

    fn station(&self, station: &Station, indent: &str) -> String {
        let attrs: Attrs = vec![
            ("id", self.id(station.id)),
            ("position", self.vector2(station.position)),
        ];
        format!("{indent}{}", self.open("station", &attrs, true))
    }

    pub fn ship(
        &self,
        world: &World,
        ship: &Ship,
        view: Perspective<'_>,
        indent: &str,
    ) -> String {
        let subindent = format!("{indent}{INDENT}");
        let mut attrs: Attrs = vec![
            ("id", self.id(ship.id.get(view))),
            ("type", ship.kind.get(view).label().to_string()),
            ("faction", ship.faction.get(view).label().to_string()),
            ("code", ship.code.read(view).clone()),
            ("name", ship.name.read(view).clone()),
            ("max-hull", self.number(ship.max_hull.get(view))),
            ("current-hull", self.number(ship.current_hull.get(view))),
            ("position", self.vector2(ship.position.get(view))),
            ("direction", self.vector2(ship.direction.get(view))),
            ("speed", self.number(ship.speed.get(view))),
        ];

        if let Some(dest) = ship.destination.get(view) {
            if let Some(object) = dest.object {
                let object_id = match object {
                    crate::models::DestinationObject::Jumpgate(g) => world.jumpgate(g).id,
                    crate::models::DestinationObject::Station(s) => world.station(s).id,
                };
                attrs.push(("destination-object", self.id(object_id)));
            }
            attrs.push(("destination-sector", self.id(world.sector(dest.sector).id)));
            attrs.push(("destination-position", self.vector2(dest.position)));
        }
        if let Some(target) = ship.target.get(view) {
            attrs.push(("target", self.id(world.ship(target).id.get(view))));
        }
        if ship.docked.get(view) {
            attrs.push(("docked", self.boolean(true)));
        }
        let timeout = ship.timeout.get(view);
        if timeout > 0.0 {
            attrs.push(("timeout", self.number(timeout)));
        }

        let mut out = String::new();
        out.push_str(indent);
        out.push_str(&self.open("ship", &attrs, false));
        out.push('\n');

        for (tag, mounts) in [("weapons", &ship.weapons), ("turrets", &ship.turrets)] {
            let active: Vec<&WeaponMount> =
                mounts.iter().filter(|m| m.kind.get(view).is_some()).collect();
            if active.is_empty() {
                continue;
            }
            let inner = format!("{subindent}{INDENT}");
            out.push_str(&subindent);
            out.push_str(&self.open(tag, &vec![("count", self.number(active.len()))], false));
            out.push('\n');
            for mount in active {
                out.push_str(&self.mount(world, mount, view, &inner));
                out.push('\n');
            }
            out.push_str(&subindent);
            out.push_str(&self.close(tag));
            out.push('\n');
        }

        out.push_str(indent);
        out.push_str(&self.close("ship"));
        out
    }

    fn mount(
        &self,
        world: &World,
        mount: &WeaponMount,
        view: Perspective<'_>,
        indent: &str,
    ) -> String {
        let mut attrs: Attrs = vec![("id", self.id(mount.id.get(view)))];
        if let Some(kind) = mount.kind.get(view) {
            attrs.push(("type", kind.label().to_string()));
        }
        if let Some(target) = mount.target.get(view) {
            attrs.push(("target", self.id(world.ship(target).id.get(view))));
        }
        let position = mount.position.get(view);
        if position != crate::models::WeaponPosition::Bow {
            attrs.push(("weapon-position", position.label().to_string()));
        }
        let cooldown = mount.cooldown.get(view);
        if cooldown > 0.0 {
            attrs.push(("cooldown", self.number(cooldown)));
        }
        format!("{indent}{}", self.open("weapon", &attrs, true))
    }

    /// The whole world: counts header, then every sector in grid order.
    pub fn savegame(&self, world: &World, view: Perspective<'_>) -> String {
        let indent = "";
        let subindent = INDENT;
        let mut out = String::new();

        out.push_str(indent);
        out.push_str(&self.open("savegame", &Vec::new(), false));
        out.push('\n');
        out.push_str(subindent);
        out.push_str(&self.open(
            "sectors",
            &vec![("count", self.number(world.sectors.len()))],
            true,
        ));
        out.push('\n');
        out.push_str(subindent);
        out.push_str(&self.open(
            "jumpgates",
            &vec![("count", self.number(world.jumpgates.len()))],
            true,
        ));
        out.push('\n');
        out.push_str(subindent);
        out.push_str(&self.open(
            "stations",
            &vec![("count", self.number(world.stations.len()))],
            true,
        ));
        out.push('\n');
        out.push_str(subindent);
        out.push_str(&self.open(
            "ships",
            &vec![("count", self.number(world.ships.len()))],
            true,
        ));
        out.push('\n');

        for sector in &world.sectors {
            out.push_str(&self.sector(world, sector, view, subindent));
            out.push('\n');
        }

        out.push_str(indent);
        out.push_str(&self.close("savegame"));
        out.push('\n');
        out
    }
}

impl Default for SaveSerializer {
    fn default() -> Self {
        Self::new()
    }
}

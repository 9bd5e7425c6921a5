//! ANSI status display: ship roster for the player's sector, a sector map,
//! and a world overview. All reads go through the caller's perspective, so
//! the display never interferes with an open save window.

use parallax_core::models::{Faction, Ship};
use parallax_core::snapshot::Perspective;
use parallax_core::types::ShipId;
use parallax_core::world::World;

const LEFT_PADDING: usize = 6;

const COLOR_NEUTRAL: u8 = 37; // white
const COLOR_PLAYER: u8 = 36; // cyan
const COLOR_FRIEND: u8 = 32; // green
const COLOR_FOE: u8 = 31; // red

fn faction_color(faction: Faction) -> u8 {
    match faction {
        Faction::Neutral => COLOR_NEUTRAL,
        Faction::Player => COLOR_PLAYER,
        Faction::Friend => COLOR_FRIEND,
        Faction::Foe => COLOR_FOE,
    }
}

fn begin_color(color: u8, use_color: bool) -> String {
    if use_color {
        format!("\x1b[0;{color}m")
    } else {
        String::new()
    }
}

fn end_color(use_color: bool) -> &'static str {
    if use_color {
        "\x1b[0m"
    } else {
        ""
    }
}

fn hull_bars(fraction: f32) -> String {
    let mut bars = String::with_capacity(5);
    for threshold in [0.0, 0.2, 0.4, 0.6, 0.8] {
        bars.push(if fraction > threshold { '|' } else { ' ' });
    }
    bars
}

fn ship_line(world: &World, ship: &Ship, view: Perspective<'_>, use_color: bool) -> String {
    let mut out = String::new();
    let faction = ship.faction.get(view);
    out.push_str(&begin_color(faction_color(faction), use_color));

    out.push(' ');
    out.push_str(ship.code.read(view));
    out.push(' ');
    out.push_str(&hull_bars(ship.hull_fraction(view)));

    let sector = world.sector(ship.sector.get(view));
    let loc = ship.position.get(view) - sector.size / 2.0;
    let dir = ship.direction.get(view);
    out.push_str(&format!(
        " [{}{:.0},{}{:.0}]",
        if loc.x >= 0.0 { " " } else { "" },
        loc.x,
        if -loc.y >= 0.0 { " " } else { "" },
        -loc.y
    ));
    out.push(' ');
    out.push(if dir.y <= -0.3 {
        'N'
    } else if dir.y >= 0.3 {
        'S'
    } else {
        ' '
    });
    out.push(if dir.x <= -0.3 {
        'W'
    } else if dir.x >= 0.3 {
        'E'
    } else {
        ' '
    });
    out.push(' ');
    out.push_str(ship.kind.get(view).padded_label());

    if let Some(target_id) = ship.target.get(view) {
        let target = world.ship(target_id);
        if target.sector.get(view) == ship.sector.get(view) {
            out.push_str(" -> ");
            out.push_str(&begin_color(
                faction_color(target.faction.get(view)),
                use_color,
            ));
            out.push_str(target.kind.get(view).padded_label());
            out.push(' ');
            out.push_str(target.code.read(view));
            out.push(' ');
            out.push_str(&hull_bars(target.hull_fraction(view)));
        }
    }

    out.push_str(end_color(use_color));
    out
}

fn sector_map(world: &World, view: Perspective<'_>, player: ShipId) -> Vec<String> {
    let player_ship = world.ship(player);
    let sector = world.sector(player_ship.sector.get(view));
    let cols = sector.size.x as usize + 1;
    let rows = sector.size.y as usize + 1;
    let inner_width = cols * 3;

    let mut grid: Vec<Vec<u8>> = Vec::with_capacity(rows + 2);
    {
        let mut header = vec![b' '; LEFT_PADDING];
        header.extend_from_slice(format!("+-[ {} ]", sector.name).as_bytes());
        while header.len() < LEFT_PADDING + inner_width + 1 {
            header.push(b'-');
        }
        header.push(b'+');
        grid.push(header);
    }
    for _ in 0..rows {
        let mut line = vec![b' '; LEFT_PADDING];
        line.push(b'|');
        line.extend(std::iter::repeat(b' ').take(inner_width));
        line.push(b'|');
        grid.push(line);
    }
    {
        let mut footer = vec![b' '; LEFT_PADDING];
        footer.push(b'+');
        footer.extend(std::iter::repeat(b'-').take(inner_width));
        footer.push(b'+');
        grid.push(footer);
    }

    for &ship_id in sector.ships.read(view).iter() {
        let ship = world.ship(ship_id);
        let pos = ship.position.get(view);
        let col = (pos.x + 0.5).floor().clamp(0.0, (cols - 1) as f32) as usize;
        let row = (pos.y + 0.5).floor().clamp(0.0, (rows - 1) as f32) as usize;
        let cell = LEFT_PADDING + 1 + col * 3 + 1;
        let line = &mut grid[row + 1];

        let glyph = if ship_id == player {
            let dir = ship.direction.get(view);
            let mut glyph = 'v';
            let mut strongest = dir.y.max(0.0);
            if dir.x > 0.0 && dir.x > strongest {
                strongest = dir.x;
                glyph = '>';
            }
            if dir.y < 0.0 && -dir.y > strongest {
                strongest = -dir.y;
                glyph = '^';
            }
            if dir.x < 0.0 && -dir.x > strongest {
                glyph = '<';
            }
            glyph
        } else {
            '.'
        };
        if line[cell] == b' ' || ship_id == player {
            line[cell] = glyph as u8;
        }
    }

    grid.into_iter()
        .map(|line| String::from_utf8_lossy(&line).into_owned())
        .collect()
}

fn world_map(world: &World, view: Perspective<'_>, player: ShipId) -> Vec<String> {
    let player_sector = world.ship(player).sector.get(view);
    let mut out = Vec::with_capacity(world.rows + 2);

    let mut header = String::from("    ");
    for col in 0..world.cols {
        header.push_str(&format!("    {}  ", (b'A' + col as u8) as char));
    }
    out.push(header);
    out.push(format!("   .{}", "-".repeat(world.cols * 7)));

    for row in 0..world.rows {
        let mut line = format!("{:02} |", row + 1);
        for col in 0..world.cols {
            let sector_id = world.sector_id_at(row, col);
            let is_player_sector = sector_id == player_sector;
            let count = world.sector(sector_id).ships.read(view).len();
            line.push(if is_player_sector { '[' } else { ' ' });
            if count > 0 {
                line.push_str(&format!("{count:4}"));
            } else {
                line.push_str("    ");
            }
            line.push_str(if is_player_sector { " ]" } else { "  " });
        }
        out.push(line);
    }
    out
}

/// The full frame: roster, sector map, world map.
pub fn render(world: &World, view: Perspective<'_>, use_color: bool) -> String {
    let player = world.player_ship;
    let player_sector = world.ship(player).sector.get(view);
    let mut out = String::new();

    for &ship_id in world.sector(player_sector).ships.read(view).iter() {
        out.push(if ship_id == player { '>' } else { ' ' });
        out.push_str(&ship_line(world, world.ship(ship_id), view, use_color));
        out.push('\n');
    }
    out.push('\n');
    for line in sector_map(world, view, player) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
    for line in world_map(world, view, player) {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

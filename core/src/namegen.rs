//! Deterministic ship names and registry codes.
//!
//! Names are per-class serials ("S001", "C002", ...) handed out by a counter
//! the caller owns, so worldgen and respawn share one sequence per class.
//! Codes are the `AAA-000` registry format. All randomness comes from the
//! caller's SubsystemRng.

use crate::models::ShipKind;
use crate::rng::SubsystemRng;

/// Per-class serial counters for ship names.
#[derive(Debug, Default)]
pub struct ShipNamer {
    courier:   u32,
    transport: u32,
    scout:     u32,
    corvette:  u32,
    frigate:   u32,
}

impl ShipNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_name(&mut self, kind: ShipKind) -> String {
        let (prefix, counter) = match kind {
            ShipKind::Courier   => ("Z", &mut self.courier),
            ShipKind::Transport => ("T", &mut self.transport),
            ShipKind::Scout     => ("S", &mut self.scout),
            ShipKind::Corvette  => ("C", &mut self.corvette),
            ShipKind::Frigate   => ("F", &mut self.frigate),
        };
        *counter += 1;
        format!("{prefix}{:03}", *counter)
    }
}

/// Random registry code, e.g. "KQX-407".
pub fn random_code(rng: &mut SubsystemRng) -> String {
    let mut code = String::with_capacity(7);
    for _ in 0..3 {
        code.push((b'A' + rng.next_u64_below(26) as u8) as char);
    }
    code.push('-');
    for _ in 0..3 {
        code.push((b'0' + rng.next_u64_below(10) as u8) as char);
    }
    code
}

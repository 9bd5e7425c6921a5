//! The event bus — what subsystems report back to the engine.
//!
//! RULE: Subsystems communicate ONLY through events and the world's cells.
//! A subsystem may never call another subsystem's functions directly.

use crate::types::{EntityId, SectorId, ShipId, StationId, Tick};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are added over time — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        seed: u64,
        ship_count: usize,
    },

    // ── Movement events ────────────────────────────
    ShipDocked {
        tick: Tick,
        ship: ShipId,
        station: StationId,
    },
    ShipUndocked {
        tick: Tick,
        ship: ShipId,
    },
    ShipJumped {
        tick: Tick,
        ship: ShipId,
        from: SectorId,
        to: SectorId,
    },

    // ── Combat events ──────────────────────────────
    ShipDestroyed {
        tick: Tick,
        ship: ShipId,
        by: ShipId,
    },

    // ── Respawn events ─────────────────────────────
    ShipRespawned {
        tick: Tick,
        ship: ShipId,
        station: StationId,
        new_id: EntityId,
    },
}

/// Extract a stable string name from a SimEvent variant.
pub fn event_type_name(event: &SimEvent) -> &'static str {
    match event {
        SimEvent::TickStarted { .. }   => "tick_started",
        SimEvent::TickCompleted { .. } => "tick_completed",
        SimEvent::RunInitialized { .. } => "run_initialized",
        SimEvent::ShipDocked { .. }    => "ship_docked",
        SimEvent::ShipUndocked { .. }  => "ship_undocked",
        SimEvent::ShipJumped { .. }    => "ship_jumped",
        SimEvent::ShipDestroyed { .. } => "ship_destroyed",
        SimEvent::ShipRespawned { .. } => "ship_respawned",
    }
}

/// An event as recorded in the engine's in-memory log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub tick: Tick,
    pub subsystem: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

//! The simulation engine — the heart of Parallax.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Respawn subsystem
//!   2. Movement subsystem
//!   3. Targeting subsystem
//!   4. Combat subsystem
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - All randomness flows through per-slot RNG streams.
//!   - All state changes go through the world's snapshot cells, so a
//!     background save can read the world while the engine keeps ticking.
//!   - All events are recorded in the in-memory event log.

use crate::clock::SimClock;
use crate::combat_subsystem::CombatSubsystem;
use crate::config::WorldConfig;
use crate::error::SimResult;
use crate::event::{event_type_name, EventLogEntry, SimEvent};
use crate::movement_subsystem::MovementSubsystem;
use crate::namegen::ShipNamer;
use crate::respawn_subsystem::RespawnSubsystem;
use crate::rng::{RngBank, SubsystemRng, SubsystemSlot};
use crate::snapshot::{Mutator, Perspective, SaveCoordinator};
use crate::subsystem::SimSubsystem;
use crate::targeting_subsystem::TargetingSubsystem;
use crate::types::{EntityIdGen, Tick};
use crate::world::World;
use crate::worldgen;

pub struct SimEngine {
    pub clock: SimClock,
    seed: u64,
    mutator: Mutator,
    coordinator: SaveCoordinator,
    subsystems: Vec<(SubsystemSlot, SubsystemRng, Box<dyn SimSubsystem>)>,
    event_log: Vec<EventLogEntry>,
}

impl SimEngine {
    /// Build a fully wired engine and the world it runs. The world is
    /// returned separately so the caller can lend it to a save reader while
    /// the engine keeps mutating it.
    pub fn build(seed: u64, config: &WorldConfig) -> SimResult<(SimEngine, World)> {
        config.validate()?;

        let (coordinator, mut mutator) = SaveCoordinator::new();
        let bank = RngBank::new(seed);
        let mut namer = ShipNamer::new();
        let mut id_gen = EntityIdGen::new();

        let mut gen_rng = bank.for_subsystem(SubsystemSlot::WorldGen);
        let world = worldgen::generate(
            config,
            &coordinator,
            &mut mutator,
            &mut gen_rng,
            &mut namer,
            &mut id_gen,
        )?;

        let mut engine = SimEngine {
            clock: SimClock::new(),
            seed,
            mutator,
            coordinator,
            subsystems: Vec::new(),
            event_log: Vec::new(),
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(
            SubsystemSlot::Respawn,
            &bank,
            Box::new(RespawnSubsystem::new(config.clone(), namer, id_gen)),
        );
        engine.register(
            SubsystemSlot::Movement,
            &bank,
            Box::new(MovementSubsystem::new(config.clone())),
        );
        engine.register(SubsystemSlot::Targeting, &bank, Box::new(TargetingSubsystem::new()));
        engine.register(
            SubsystemSlot::Combat,
            &bank,
            Box::new(CombatSubsystem::new(config.clone())),
        );

        Ok((engine, world))
    }

    /// Register a subsystem with its own RNG stream. Call in the documented
    /// execution order.
    pub fn register(&mut self, slot: SubsystemSlot, bank: &RngBank, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push((slot, bank.for_subsystem(slot), subsystem));
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn coordinator(&self) -> &SaveCoordinator {
        &self.coordinator
    }

    /// The mutator-side view, for dumps and displays between ticks.
    pub fn live_view(&self) -> Perspective<'_> {
        Perspective::Live(&self.mutator)
    }

    /// The write token, for driving `end_save`.
    pub fn mutator_mut(&mut self) -> &mut Mutator {
        &mut self.mutator
    }

    pub fn event_log(&self) -> &[EventLogEntry] {
        &self.event_log
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self, world: &World) -> SimResult<Vec<SimEvent>> {
        assert!(!self.clock.paused, "tick() called on paused engine");

        let current_tick = self.clock.advance();
        let mut tick_events: Vec<SimEvent> = vec![SimEvent::TickStarted { tick: current_tick }];

        // Execute each subsystem in registration order.
        // Each subsystem sees all events emitted so far this tick.
        for (_slot, rng, subsystem) in &mut self.subsystems {
            let new_events =
                subsystem.update(current_tick, world, &mut self.mutator, &tick_events, rng)?;

            for event in &new_events {
                self.event_log.push(EventLogEntry {
                    tick: current_tick,
                    subsystem: subsystem.name().to_string(),
                    event_type: event_type_name(event).to_string(),
                    payload: serde_json::to_string(event)?,
                });
            }

            tick_events.extend(new_events);
        }

        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        Ok(tick_events)
    }

    /// Run n ticks in a loop. Used for testing and headless runs.
    pub fn run_ticks(&mut self, n: u64, world: &World) -> SimResult<()> {
        // Record RunInitialized at tick 0 so seed differences are observable.
        if self.clock.current_tick == 0 {
            let init_event = SimEvent::RunInitialized {
                seed: self.seed,
                ship_count: world.ships.len(),
            };
            self.event_log.push(EventLogEntry {
                tick: 0,
                subsystem: "engine".to_string(),
                event_type: event_type_name(&init_event).to_string(),
                payload: serde_json::to_string(&init_event)?,
            });
        }
        self.clock.resume();
        for _ in 0..n {
            self.tick(world)?;
        }
        self.clock.pause();
        Ok(())
    }

    /// Event log entries for one tick, in emission order.
    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.event_log.iter().filter(|e| e.tick == tick).collect()
    }
}

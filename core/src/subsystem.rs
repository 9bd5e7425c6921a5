//! Subsystem trait and contract.
//!
//! RULE: Every subsystem implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.
//!
//! Subsystems touch the world only through its cells — they run on the
//! mutator thread and carry the single write token, so the save reader can
//! walk the same world concurrently.

use crate::error::SimResult;
use crate::event::SimEvent;
use crate::rng::SubsystemRng;
use crate::snapshot::Mutator;
use crate::types::Tick;
use crate::world::World;
use std::any::Any;

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:      the current tick number
    /// - `world`:     the shared entity arenas
    /// - `mutator`:   the write token; all cell writes go through it
    /// - `events_in`: events emitted by earlier subsystems this tick
    /// - `rng`:       this subsystem's deterministic RNG stream
    ///
    /// Returns new events to add to the tick's event log.
    fn update(
        &mut self,
        tick: Tick,
        world: &World,
        mutator: &mut Mutator,
        events_in: &[SimEvent],
        rng: &mut SubsystemRng,
    ) -> SimResult<Vec<SimEvent>>;

    /// For downcasting in tests and tooling only.
    /// Production sim code never uses this.
    fn as_any(&self) -> &dyn Any;
}

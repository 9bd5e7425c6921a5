//! The save-window mechanism — point-in-time dumps of a live world.
//!
//! One mutator thread keeps simulating while a single background reader
//! walks the whole entity graph and writes it out. No copy of the world is
//! taken up front and neither side ever waits on the other. Each mutable
//! field lives in a cell with two views:
//!
//!   - `live` — what the simulation reads and writes,
//!   - `snap` — what the reader sees inside an open save window.
//!
//! Outside a window both views are the same storage. The first write to a
//! cell inside a window forks them: `snap` keeps the value the field had
//! when the window opened, `live` moves on. Closing the window finalizes
//! every cell, collapsing the fork.
//!
//! RULES:
//!   - All writes go through the single [`Mutator`] token.
//!   - The `snap` view is only reachable through the [`SaveWindow`] returned
//!     by [`SaveCoordinator::begin_save`]; possession of the window IS the
//!     reader authorization.
//!   - At most one window is open at a time.
//!   - Cells are never destroyed while diverged — entity lifecycles reuse
//!     cells instead of replacing them.

mod cell;
mod coordinator;
mod handle;
mod vector2;

pub use cell::SnapCell;
pub use coordinator::{Mutator, Perspective, SaveCoordinator, SaveWindow};
pub use handle::HandleCell;
pub use vector2::SnapVec2;

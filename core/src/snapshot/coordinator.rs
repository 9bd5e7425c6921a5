//! Save-window state machine and the live-cell registry.
//!
//! The coordinator owns exactly one piece of shared state: the "save in
//! progress" flag, published with release ordering when a window opens, plus
//! the registry of every cell currently alive. Closing a window sweeps the
//! registry, finalizing each cell exactly once, and only then flips the flag
//! back — so a write can never observe "no window" while any cell is still
//! diverged.

use crate::error::{SimError, SimResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Cells register themselves type-erased so the end-of-save sweep does not
/// need to know the shape of the entity graph.
pub(crate) trait FinalizeCell: Send + Sync {
    /// Collapse the live/snap fork, if any. Idempotent.
    fn finalize_slots(&self);
    /// Whether this cell currently holds two distinct values.
    fn is_diverged(&self) -> bool;
}

struct CoordinatorShared {
    id: u64,
    saving: AtomicBool,
    next_key: AtomicU64,
    cells: Mutex<HashMap<u64, Weak<dyn FinalizeCell>>>,
}

static NEXT_COORDINATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide (per world) save-window coordinator. Cheap to clone; every
/// cell carries a handle for registration and for the fork decision on write.
#[derive(Clone)]
pub struct SaveCoordinator {
    shared: Arc<CoordinatorShared>,
}

/// The write capability. Exactly one exists per coordinator and it is not
/// clonable: holding `&mut Mutator` is what makes a write exclusive, and
/// holding `&Mutator` is what keeps a live read stable. The borrow checker
/// enforces the single-writer discipline the snapshot contract relies on.
pub struct Mutator {
    coordinator_id: u64,
}

impl Mutator {
    pub(crate) fn coordinator_id(&self) -> u64 {
        self.coordinator_id
    }
}

/// An open save window. Possession authorizes `snap` reads; handing a
/// `&SaveWindow` to the reader thread (via spawn or channel) carries the
/// happens-before edge the reader needs. Consumed by
/// [`SaveCoordinator::end_save`].
#[must_use = "a save window must be closed with end_save"]
pub struct SaveWindow {
    shared: Arc<CoordinatorShared>,
}

impl Drop for SaveWindow {
    fn drop(&mut self) {
        // end_save clears the flag before the window is dropped; seeing it
        // still set means the window was leaked and cells stay diverged.
        if self.shared.saving.load(Ordering::Acquire) {
            log::error!("save window dropped without end_save; cells remain diverged");
        }
    }
}

/// The role a read happens under, passed explicitly down the call stack.
/// `Live` reads require the mutator token, `Snap` reads require the open
/// window — so a snap read can never outlive its window and a live read can
/// never overlap a write through the same token.
#[derive(Clone, Copy)]
pub enum Perspective<'a> {
    Live(&'a Mutator),
    Snap(&'a SaveWindow),
}

impl SaveCoordinator {
    /// Create a coordinator and its unique write token.
    pub fn new() -> (SaveCoordinator, Mutator) {
        let id = NEXT_COORDINATOR_ID.fetch_add(1, Ordering::Relaxed);
        let coordinator = SaveCoordinator {
            shared: Arc::new(CoordinatorShared {
                id,
                saving: AtomicBool::new(false),
                next_key: AtomicU64::new(0),
                cells: Mutex::new(HashMap::new()),
            }),
        };
        (coordinator, Mutator { coordinator_id: id })
    }

    pub(crate) fn id(&self) -> u64 {
        self.shared.id
    }

    /// Whether a save window is currently open.
    pub fn is_saving(&self) -> bool {
        self.shared.saving.load(Ordering::Acquire)
    }

    /// Open a save window. Fails without touching any state if one is
    /// already open.
    pub fn begin_save(&self) -> SimResult<SaveWindow> {
        let flipped = self.shared.saving.compare_exchange(
            false,
            true,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if flipped.is_err() {
            return Err(SimError::SaveAlreadyActive);
        }
        log::debug!("save window opened ({} cells registered)", self.cell_count());
        Ok(SaveWindow {
            shared: Arc::clone(&self.shared),
        })
    }

    /// Close a save window: finalize every registered cell, then — and only
    /// then — clear the "save in progress" flag. Requires the mutator token;
    /// the reader must already be done because the window is consumed here.
    pub fn end_save(&self, window: SaveWindow, _mutator: &mut Mutator) -> SimResult<()> {
        assert!(
            Arc::ptr_eq(&window.shared, &self.shared),
            "save window belongs to a different coordinator"
        );
        if !self.shared.saving.load(Ordering::Acquire) {
            return Err(SimError::SaveNotActive);
        }

        // Strong refs first so finalize runs without the registry lock held.
        let cells: Vec<Arc<dyn FinalizeCell>> = {
            let map = self
                .shared
                .cells
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            map.values().filter_map(Weak::upgrade).collect()
        };

        let mut diverged = 0usize;
        for cell in &cells {
            if cell.is_diverged() {
                diverged += 1;
            }
            cell.finalize_slots();
        }

        self.shared.saving.store(false, Ordering::Release);
        log::debug!(
            "save window closed; {diverged} of {} cells had diverged",
            cells.len()
        );
        Ok(())
    }

    /// Number of currently registered cells. Registration exactly tracks
    /// cell lifetimes, so this is also the number of live cells.
    pub fn cell_count(&self) -> usize {
        self.shared
            .cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn register(&self, cell: Weak<dyn FinalizeCell>) -> u64 {
        let key = self.shared.next_key.fetch_add(1, Ordering::Relaxed);
        self.shared
            .cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, cell);
        key
    }

    pub(crate) fn unregister(&self, key: u64) {
        self.shared
            .cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
    }
}

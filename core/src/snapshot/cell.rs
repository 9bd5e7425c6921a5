//! Owned-value snapshot cell.

use super::coordinator::{FinalizeCell, Mutator, Perspective, SaveCoordinator};
use std::cell::UnsafeCell;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::{Arc, Weak};

/// The two storage slots. When the cell is clean both pointers address the
/// same heap allocation; a fork inside a save window gives `live` a fresh
/// allocation while `snap` keeps the pre-window one.
///
/// SAFETY: access is role-gated by the owning [`SnapCell`] —
///   - the pointer words and the `live` allocation are only written while
///     `&mut Mutator` is held (one writer, ever),
///   - the reader only dereferences `snap`, whose pointer word and pointee
///     are never written while a window is open (writes fork instead),
///   - `finalize_slots` runs from `end_save`, which holds the mutator token
///     and has already consumed the window.
struct CellSlots<T> {
    live: UnsafeCell<*mut T>,
    snap: UnsafeCell<*mut T>,
}

unsafe impl<T: Send + Sync> Send for CellSlots<T> {}
unsafe impl<T: Send + Sync> Sync for CellSlots<T> {}

impl<T: Send + Sync> FinalizeCell for CellSlots<T> {
    fn finalize_slots(&self) {
        unsafe {
            let live = *self.live.get();
            let snap = *self.snap.get();
            if snap != live {
                drop(Box::from_raw(snap));
                *self.snap.get() = live;
            }
        }
    }

    fn is_diverged(&self) -> bool {
        unsafe { *self.live.get() != *self.snap.get() }
    }
}

/// A value-holding cell exposing a live view to the mutator and a stable
/// pre-window view to the save reader. The unit of snapshot consistency.
pub struct SnapCell<T: Send + Sync + 'static> {
    slots: Arc<CellSlots<T>>,
    coordinator: SaveCoordinator,
    key: u64,
}

impl<T: Send + Sync + 'static> SnapCell<T> {
    /// One backing allocation; both views reference it.
    pub fn new(value: T, coordinator: &SaveCoordinator) -> Self {
        let boxed = Box::into_raw(Box::new(value));
        let slots = Arc::new(CellSlots {
            live: UnsafeCell::new(boxed),
            snap: UnsafeCell::new(boxed),
        });
        let weak: Weak<dyn FinalizeCell> =
            Arc::downgrade(&(slots.clone() as Arc<dyn FinalizeCell>));
        let key = coordinator.register(weak);
        Self {
            slots,
            coordinator: coordinator.clone(),
            key,
        }
    }

    /// Replace the value. Forks at most once per save window; never blocks.
    pub fn set(&self, value: T, mutator: &mut Mutator) {
        debug_assert_eq!(
            mutator.coordinator_id(),
            self.coordinator.id(),
            "mutator token from a different coordinator"
        );
        unsafe {
            let live = *self.slots.live.get();
            let snap = *self.slots.snap.get();
            if live == snap && self.coordinator.is_saving() {
                // First write inside the window: the reader keeps the old
                // allocation behind `snap`.
                *self.slots.live.get() = Box::into_raw(Box::new(value));
            } else {
                *live = value;
            }
        }
    }

    /// Resolve a view. Never allocates, never blocks. The returned borrow
    /// pins the role value it came from, so the storage cannot be retired
    /// underneath it.
    pub fn read<'a>(&'a self, view: Perspective<'a>) -> &'a T {
        unsafe {
            match view {
                Perspective::Live(_) => &**self.slots.live.get(),
                Perspective::Snap(_) => &**self.slots.snap.get(),
            }
        }
    }

    /// Copy out a view.
    pub fn get(&self, view: Perspective<'_>) -> T
    where
        T: Copy,
    {
        *self.read(view)
    }

    /// Collapse the fork, if any. Idempotent; normally invoked for every
    /// cell by `SaveCoordinator::end_save`.
    pub fn finalize(&self, _mutator: &mut Mutator) {
        self.slots.finalize_slots();
    }

    /// Whether live and snap currently point at distinct storage.
    pub fn is_diverged(&self) -> bool {
        self.slots.is_diverged()
    }

    // ── Compound mutation: read-modify-write through the mutator's view ──

    pub fn add_assign(&self, rhs: T, mutator: &mut Mutator)
    where
        T: Copy + Add<Output = T>,
    {
        let v = self.get(Perspective::Live(mutator));
        self.set(v + rhs, mutator);
    }

    pub fn sub_assign(&self, rhs: T, mutator: &mut Mutator)
    where
        T: Copy + Sub<Output = T>,
    {
        let v = self.get(Perspective::Live(mutator));
        self.set(v - rhs, mutator);
    }

    pub fn mul_assign(&self, rhs: T, mutator: &mut Mutator)
    where
        T: Copy + Mul<Output = T>,
    {
        let v = self.get(Perspective::Live(mutator));
        self.set(v * rhs, mutator);
    }

    pub fn div_assign(&self, rhs: T, mutator: &mut Mutator)
    where
        T: Copy + Div<Output = T>,
    {
        let v = self.get(Perspective::Live(mutator));
        self.set(v / rhs, mutator);
    }
}

impl<T: Send + Sync + 'static> Drop for SnapCell<T> {
    fn drop(&mut self) {
        self.coordinator.unregister(self.key);
        unsafe {
            let live = *self.slots.live.get();
            let snap = *self.slots.snap.get();
            // A diverged cell still owes its snapshot value to an open
            // window; tearing it down here is an entity-lifecycle bug.
            assert!(
                live == snap,
                "snapshot cell destroyed while diverged (entity torn down during an open save window)"
            );
            drop(Box::from_raw(live));
        }
    }
}

//! Snapshot cell for entity handles.
//!
//! Same consistency contract as [`SnapCell`](super::SnapCell), but the value
//! is a small `Copy` handle (an arena id, an optional target, a travel
//! destination), so forking copies the handle into an inline slot instead of
//! allocating a second backing object.

use super::coordinator::{FinalizeCell, Mutator, Perspective, SaveCoordinator};
use std::cell::UnsafeCell;
use std::sync::{Arc, Weak};

/// Inline dual slot plus the divergence flag.
///
/// SAFETY: same role gating as the owned cell — all writes hold
/// `&mut Mutator`; inside a window only `live` and `diverged` are written
/// while the reader touches only `snap`; outside a window the reader role
/// cannot exist, so mirroring a write into both slots is unobserved.
struct HandleSlots<T> {
    live: UnsafeCell<T>,
    snap: UnsafeCell<T>,
    diverged: UnsafeCell<bool>,
}

unsafe impl<T: Copy + Send + Sync> Send for HandleSlots<T> {}
unsafe impl<T: Copy + Send + Sync> Sync for HandleSlots<T> {}

impl<T: Copy + Send + Sync> FinalizeCell for HandleSlots<T> {
    fn finalize_slots(&self) {
        unsafe {
            if *self.diverged.get() {
                *self.snap.get() = *self.live.get();
                *self.diverged.get() = false;
            }
        }
    }

    fn is_diverged(&self) -> bool {
        unsafe { *self.diverged.get() }
    }
}

/// Reference/shared-handle cell variant. No allocation, ever.
pub struct HandleCell<T: Copy + Send + Sync + 'static> {
    slots: Arc<HandleSlots<T>>,
    coordinator: SaveCoordinator,
    key: u64,
}

impl<T: Copy + Send + Sync + 'static> HandleCell<T> {
    pub fn new(value: T, coordinator: &SaveCoordinator) -> Self {
        let slots = Arc::new(HandleSlots {
            live: UnsafeCell::new(value),
            snap: UnsafeCell::new(value),
            diverged: UnsafeCell::new(false),
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

    /// Replace the handle. Only the handle is copied, never the referent.
    pub fn set(&self, value: T, mutator: &mut Mutator) {
        debug_assert_eq!(
            mutator.coordinator_id(),
            self.coordinator.id(),
            "mutator token from a different coordinator"
        );
        unsafe {
            if self.coordinator.is_saving() {
                *self.slots.diverged.get() = true;
                *self.slots.live.get() = value;
            } else {
                debug_assert!(!*self.slots.diverged.get());
                *self.slots.live.get() = value;
                *self.slots.snap.get() = value;
            }
        }
    }

    pub fn get(&self, view: Perspective<'_>) -> T {
        unsafe {
            match view {
                Perspective::Live(_) => *self.slots.live.get(),
                Perspective::Snap(_) => *self.slots.snap.get(),
            }
        }
    }

    pub fn finalize(&self, _mutator: &mut Mutator) {
        self.slots.finalize_slots();
    }

    pub fn is_diverged(&self) -> bool {
        self.slots.is_diverged()
    }
}

impl<T: Copy + Send + Sync + 'static> Drop for HandleCell<T> {
    fn drop(&mut self) {
        self.coordinator.unregister(self.key);
        assert!(
            !self.slots.is_diverged(),
            "handle cell destroyed while diverged (entity torn down during an open save window)"
        );
    }
}

//! Cell-level contract: two views, one-time forking, idempotent finalize,
//! exact registry tracking.

use parallax_core::error::SimError;
use parallax_core::snapshot::{HandleCell, Perspective, SaveCoordinator, SnapCell};
use parallax_core::types::ShipId;

#[test]
fn scenario_a_reader_sees_the_begin_save_value() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(5u32, &coordinator);

    let window = coordinator.begin_save().expect("open window");

    cell.set(7, &mut mutator);
    assert_eq!(cell.get(Perspective::Snap(&window)), 5, "first write must fork");
    assert_eq!(cell.get(Perspective::Live(&mutator)), 7);

    cell.set(9, &mut mutator);
    assert_eq!(
        cell.get(Perspective::Snap(&window)),
        5,
        "later writes in the same window mutate live in place"
    );

    coordinator.end_save(window, &mut mutator).expect("close window");
    assert_eq!(cell.get(Perspective::Live(&mutator)), 9);
    assert!(!cell.is_diverged(), "finalize must collapse the fork");
}

#[test]
fn untouched_cells_never_fork() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let touched = SnapCell::new(1u32, &coordinator);
    let untouched = SnapCell::new(2u32, &coordinator);

    let window = coordinator.begin_save().expect("open window");
    touched.set(10, &mut mutator);

    assert!(touched.is_diverged());
    assert!(!untouched.is_diverged(), "a cell never written stays clean");
    assert_eq!(untouched.get(Perspective::Snap(&window)), 2);

    coordinator.end_save(window, &mut mutator).expect("close window");
}

#[test]
fn forking_is_bounded_to_once_per_window() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(0u64, &coordinator);

    let window = coordinator.begin_save().expect("open window");
    for i in 1..=1000u64 {
        cell.set(i, &mut mutator);
    }
    // A thousand writes, one divergence, the original value intact.
    assert!(cell.is_diverged());
    assert_eq!(cell.get(Perspective::Snap(&window)), 0);
    assert_eq!(cell.get(Perspective::Live(&mutator)), 1000);
    coordinator.end_save(window, &mut mutator).expect("close window");
}

#[test]
fn finalize_is_idempotent() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(3u32, &coordinator);

    let window = coordinator.begin_save().expect("open window");
    cell.set(4, &mut mutator);
    assert!(cell.is_diverged());

    cell.finalize(&mut mutator);
    assert!(!cell.is_diverged());
    cell.finalize(&mut mutator); // second call is a no-op
    assert!(!cell.is_diverged());
    assert_eq!(cell.get(Perspective::Live(&mutator)), 4);

    coordinator.end_save(window, &mut mutator).expect("close window");
    assert_eq!(cell.get(Perspective::Live(&mutator)), 4);
}

#[test]
fn compound_mutation_uses_the_mutator_view() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(10i64, &coordinator);

    let window = coordinator.begin_save().expect("open window");
    cell.add_assign(5, &mut mutator);
    cell.mul_assign(2, &mut mutator);
    cell.sub_assign(6, &mut mutator);
    cell.div_assign(4, &mut mutator);

    assert_eq!(cell.get(Perspective::Live(&mutator)), 6, "((10+5)*2-6)/4");
    assert_eq!(cell.get(Perspective::Snap(&window)), 10);
    coordinator.end_save(window, &mut mutator).expect("close window");
}

#[test]
fn owned_cells_hold_non_copy_values() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new("ABC-123".to_string(), &coordinator);

    let window = coordinator.begin_save().expect("open window");
    cell.set("XYZ-999".to_string(), &mut mutator);

    assert_eq!(cell.read(Perspective::Snap(&window)), "ABC-123");
    assert_eq!(cell.read(Perspective::Live(&mutator)), "XYZ-999");
    coordinator.end_save(window, &mut mutator).expect("close window");
    assert_eq!(cell.read(Perspective::Live(&mutator)), "XYZ-999");
}

#[test]
fn handle_cells_follow_the_same_contract_without_allocating() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell: HandleCell<Option<ShipId>> = HandleCell::new(Some(ShipId(1)), &coordinator);

    // Outside a window both views track writes.
    cell.set(Some(ShipId(2)), &mut mutator);
    assert!(!cell.is_diverged());

    let window = coordinator.begin_save().expect("open window");
    cell.set(None, &mut mutator);
    cell.set(Some(ShipId(3)), &mut mutator);

    assert!(cell.is_diverged());
    assert_eq!(cell.get(Perspective::Snap(&window)), Some(ShipId(2)));
    assert_eq!(cell.get(Perspective::Live(&mutator)), Some(ShipId(3)));

    coordinator.end_save(window, &mut mutator).expect("close window");
    assert!(!cell.is_diverged());
    assert_eq!(cell.get(Perspective::Live(&mutator)), Some(ShipId(3)));
}

#[test]
fn registry_tracks_every_cell_exactly_once() {
    let (coordinator, _mutator) = SaveCoordinator::new();
    assert_eq!(coordinator.cell_count(), 0);

    let a = SnapCell::new(1u8, &coordinator);
    let b = SnapCell::new(2u8, &coordinator);
    let c: HandleCell<u8> = HandleCell::new(3, &coordinator);
    assert_eq!(coordinator.cell_count(), 3);

    drop(b);
    assert_eq!(coordinator.cell_count(), 2);
    drop(a);
    drop(c);
    assert_eq!(coordinator.cell_count(), 0, "no stale entries after teardown");
}

#[test]
fn scenario_c_double_begin_is_a_usage_error_and_changes_nothing() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(41u32, &coordinator);

    let window = coordinator.begin_save().expect("open window");
    cell.set(42, &mut mutator);

    let second = coordinator.begin_save();
    assert!(matches!(second, Err(SimError::SaveAlreadyActive)));

    // The failed begin left both the window and the cells alone.
    assert!(coordinator.is_saving());
    assert!(cell.is_diverged());
    assert_eq!(cell.get(Perspective::Snap(&window)), 41);
    assert_eq!(cell.get(Perspective::Live(&mutator)), 42);

    coordinator.end_save(window, &mut mutator).expect("close window");
    assert!(!coordinator.is_saving());

    // Idle again: a new window opens normally.
    let window = coordinator.begin_save().expect("reopen");
    coordinator.end_save(window, &mut mutator).expect("close again");
}

#[test]
#[should_panic(expected = "different coordinator")]
fn windows_cannot_cross_coordinators() {
    let (coordinator_a, mut mutator_a) = SaveCoordinator::new();
    let (coordinator_b, _mutator_b) = SaveCoordinator::new();

    let window_b = coordinator_b.begin_save().expect("open window");
    let _ = coordinator_a.end_save(window_b, &mut mutator_a);
}

#[test]
#[should_panic(expected = "destroyed while diverged")]
fn dropping_a_diverged_cell_fails_fast() {
    let (coordinator, mut mutator) = SaveCoordinator::new();
    let cell = SnapCell::new(1u32, &coordinator);
    let _window = coordinator.begin_save().expect("open window");
    cell.set(2, &mut mutator);
    drop(cell);
}

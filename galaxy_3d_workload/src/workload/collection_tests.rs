/// Tests for Collection
///
/// These tests validate id allocation and recycling, queueing, frame cuts,
/// frame processing, and configuration.

use super::*;
use glam::Vec3;
use crate::workload::{NoOpProxyIndex, Sphere};

// ============================================================================
// Helper Functions
// ============================================================================

fn sphere(x: f32, radius: f32) -> Sphere {
    Sphere::new(Vec3::new(x, 0.0, 0.0), radius)
}

fn reset_one(collection: &Collection, sphere: Sphere) -> ProxyId {
    let id = collection.allocate_id();
    let mut t = Transaction::new();
    t.reset(id, sphere);
    collection.enqueue_transaction_owned(t);
    id
}

// ============================================================================
// Tests: Creation & Configuration
// ============================================================================

#[test]
fn test_new_collection_baseline() {
    let collection = Collection::new();
    assert_eq!(collection.num_allocated_proxies(), 1);
    assert_eq!(collection.frame_number(), 0);
    assert_eq!(collection.num_pending_transactions(), 0);
    assert_eq!(collection.num_pending_frames(), 0);
    assert_eq!(collection.max_proxies(), MAXIMUM_INDEX);
}

#[test]
fn test_with_config_rejects_too_small_capacity() {
    for max_proxies in [-5, 0, 1] {
        let result = Collection::with_config(CollectionConfig {
            max_proxies,
            ..CollectionConfig::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}

#[test]
fn test_with_config_accepts_bounds() {
    let collection = Collection::with_config(CollectionConfig {
        max_proxies: 4,
        initial_queue_capacity: 16,
    })
    .unwrap();
    assert_eq!(collection.max_proxies(), 4);
}

// ============================================================================
// Tests: Ids
// ============================================================================

#[test]
fn test_first_allocated_id_is_one() {
    let collection = Collection::new();
    assert_eq!(collection.allocate_id(), ProxyId::new(1));
    assert_eq!(collection.allocate_id(), ProxyId::new(2));
}

#[test]
fn test_is_allocated_id() {
    let collection = Collection::new();
    let a = collection.allocate_id();

    assert!(collection.is_allocated_id(a));
    assert!(!collection.is_allocated_id(ProxyId::INVALID));
    assert!(!collection.is_allocated_id(ProxyId::new(99)));

    collection.release_id(a);
    assert!(!collection.is_allocated_id(a));
}

#[test]
fn test_try_allocate_id_reports_exhaustion() {
    let collection = Collection::with_config(CollectionConfig {
        max_proxies: 3,
        ..CollectionConfig::default()
    })
    .unwrap();

    assert_eq!(collection.try_allocate_id(), Ok(ProxyId::new(1)));
    assert_eq!(collection.try_allocate_id(), Ok(ProxyId::new(2)));
    assert_eq!(
        collection.try_allocate_id(),
        Err(Error::CapacityExhausted { max: 3 })
    );
}

#[test]
fn test_release_id_recycles_unused_id() {
    let collection = Collection::new();
    let a = collection.allocate_id();
    collection.release_id(a);
    assert_eq!(collection.allocate_id(), a);
}

#[test]
fn test_release_live_id_is_refused() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    assert!(!collection.release_id(a));
    assert!(collection.is_allocated_id(a));
    assert_ne!(collection.allocate_id(), a);
}

#[test]
fn test_release_id_after_removal_is_double_free() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    let mut t = Transaction::new();
    t.remove(a);
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    // Already recycled by the frame
    assert!(!collection.release_id(a));
    assert_eq!(collection.allocate_id(), a);
    assert_eq!(collection.allocate_id(), ProxyId::new(2));
}

#[test]
fn test_release_invalid_id_is_noop() {
    let collection = Collection::new();
    assert!(!collection.release_id(ProxyId::INVALID));
    // Reserved id 0 must never be handed out
    assert_eq!(collection.allocate_id(), ProxyId::new(1));
}

// ============================================================================
// Tests: Queue & Frames
// ============================================================================

#[test]
fn test_enqueue_copy_and_owned() {
    let collection = Collection::new();
    let mut t = Transaction::new();
    t.reset(ProxyId::new(1), sphere(0.0, 1.0));

    collection.enqueue_transaction(&t);
    assert_eq!(t.len(), 1);
    collection.enqueue_transaction_owned(t);

    assert_eq!(collection.num_pending_transactions(), 2);
}

#[test]
fn test_enqueue_frame_numbers_increase() {
    let collection = Collection::new();
    assert_eq!(collection.enqueue_frame(), 1);
    assert_eq!(collection.enqueue_frame(), 2);
    assert_eq!(collection.frame_number(), 2);
    assert_eq!(collection.num_pending_frames(), 2);
}

#[test]
fn test_enqueue_frame_drains_pending_queue() {
    let collection = Collection::new();
    reset_one(&collection, sphere(0.0, 1.0));
    reset_one(&collection, sphere(1.0, 1.0));

    collection.enqueue_frame();

    assert_eq!(collection.num_pending_transactions(), 0);
    assert_eq!(collection.num_pending_frames(), 1);
}

#[test]
fn test_transactions_after_cut_go_to_next_frame() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();

    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();
    let b = reset_one(&collection, sphere(1.0, 1.0));

    let report = collection.process_transaction_queue(&mut store, None);
    assert_eq!(report.num_frames(), 1);
    assert!(store.contains(a));
    assert!(!store.contains(b));

    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);
    assert!(store.contains(b));
}

// ============================================================================
// Tests: Processing
// ============================================================================

#[test]
fn test_process_applies_frames_in_order() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let id = collection.allocate_id();

    let mut first = Transaction::new();
    first.reset(id, sphere(1.0, 1.0));
    collection.enqueue_transaction_owned(first);
    collection.enqueue_frame();

    let mut second = Transaction::new();
    second.update(id, sphere(2.0, 1.0));
    collection.enqueue_transaction_owned(second);
    collection.enqueue_frame();

    let report = collection.process_transaction_queue(&mut store, None);

    assert_eq!(report.num_frames(), 2);
    assert_eq!(report.last_frame(), Some(2));
    assert_eq!(store.sphere(id), Some(&sphere(2.0, 1.0)));
    assert_eq!(store.last_processed_frame(), 2);
    assert_eq!(collection.num_pending_frames(), 0);
}

#[test]
fn test_process_with_nothing_cut_is_noop() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    reset_one(&collection, sphere(0.0, 1.0));

    let report = collection.process_transaction_queue(&mut store, None);

    assert_eq!(report, ProcessReport::default());
    assert!(store.is_empty());
    assert_eq!(collection.num_pending_transactions(), 1);
}

#[test]
fn test_num_allocated_proxies_tracks_store() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    reset_one(&collection, sphere(1.0, 1.0));
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);
    assert_eq!(collection.num_allocated_proxies(), 3);

    let mut t = Transaction::new();
    t.remove(a);
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);
    assert_eq!(collection.num_allocated_proxies(), 2);
}

#[test]
fn test_removed_ids_are_recycled_after_processing() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    let mut t = Transaction::new();
    t.remove(a);
    collection.enqueue_transaction_owned(t);

    // Not recycled before the removal is applied
    assert_ne!(collection.allocate_id(), a);

    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    assert!(!collection.is_allocated_id(a));
    assert_eq!(collection.allocate_id(), a);
}

#[test]
fn test_id_recreated_in_same_frame_is_not_recycled() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));

    let mut t = Transaction::new();
    t.remove(a);
    t.reset(a, sphere(5.0, 1.0));
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    assert!(store.contains(a));
    assert!(collection.is_allocated_id(a));
    assert_ne!(collection.allocate_id(), a);
}

#[test]
fn test_stale_remove_does_not_free_id() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();

    // Allocated but its reset is not processed yet
    let pending = collection.allocate_id();
    let mut t = Transaction::new();
    t.remove(pending);
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();
    let report = collection.process_transaction_queue(&mut store, None);

    assert_eq!(report.totals().ignored, 1);
    assert!(collection.is_allocated_id(pending));
}

#[test]
fn test_remove_then_reset_in_later_frame_keeps_id_live() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();

    let mut destroy = Transaction::new();
    destroy.remove(a);
    collection.enqueue_transaction_owned(destroy);
    collection.enqueue_frame();

    let mut recreate = Transaction::new();
    recreate.reset(a, sphere(2.0, 1.0));
    collection.enqueue_transaction_owned(recreate);
    collection.enqueue_frame();

    let report = collection.process_transaction_queue(&mut store, None);

    assert_eq!(report.num_frames(), 3);
    assert_eq!(store.sphere(a), Some(&sphere(2.0, 1.0)));
    assert!(collection.is_allocated_id(a));
    assert_ne!(collection.allocate_id(), a);
}

#[test]
fn test_reset_after_recycle_takes_id_back() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    let mut destroy = Transaction::new();
    destroy.remove(a);
    collection.enqueue_transaction_owned(destroy);
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);
    assert!(!collection.is_allocated_id(a));

    let mut recreate = Transaction::new();
    recreate.reset(a, sphere(3.0, 1.0));
    collection.enqueue_transaction_owned(recreate);
    collection.enqueue_frame();
    collection.process_transaction_queue(&mut store, None);

    assert!(store.contains(a));
    assert!(collection.is_allocated_id(a));
    assert_eq!(collection.allocate_id(), ProxyId::new(2));
}

#[test]
fn test_reset_of_unissued_id_is_ignored() {
    let collection = Collection::with_config(CollectionConfig {
        max_proxies: 16,
        ..CollectionConfig::default()
    })
    .unwrap();
    let mut store = ProxyStore::new();

    let mut t = Transaction::new();
    t.reset(ProxyId::new(10_000_000), sphere(0.0, 1.0));
    t.reset(ProxyId::new(u32::MAX), sphere(0.0, 1.0));
    // Within the bound but not handed out yet
    t.reset(ProxyId::new(3), sphere(0.0, 1.0));
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();

    let report = collection.process_transaction_queue(&mut store, None);

    assert_eq!(report.totals().ignored, 3);
    assert_eq!(report.totals().resets, 0);
    assert!(store.is_empty());
    assert_eq!(store.num_slots(), 0);
    assert_eq!(collection.num_allocated_proxies(), 1);
}

#[test]
fn test_process_with_index_over_several_frames() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let mut index = NoOpProxyIndex::new();
    let a = reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();

    let mut t = Transaction::new();
    t.update(a, sphere(1.0, 1.0));
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();

    let mut t = Transaction::new();
    t.remove(a);
    collection.enqueue_transaction_owned(t);
    collection.enqueue_frame();

    let report = collection.process_transaction_queue(&mut store, Some(&mut index));

    assert_eq!(report.num_frames(), 3);
    assert_eq!(report.totals().total(), 3);
    assert_eq!(report.totals().ignored, 0);
}

#[test]
fn test_process_with_index() {
    let collection = Collection::new();
    let mut store = ProxyStore::new();
    let mut index = NoOpProxyIndex::new();
    reset_one(&collection, sphere(0.0, 1.0));
    collection.enqueue_frame();

    let report = collection.process_transaction_queue(&mut store, Some(&mut index));
    assert_eq!(report.totals().resets, 1);
}

#[test]
fn test_report_totals_sum_frames() {
    let report = ProcessReport {
        frames: vec![
            FrameStats { frame: 1, resets: 2, removes: 0, updates: 1, ignored: 0 },
            FrameStats { frame: 2, resets: 0, removes: 1, updates: 0, ignored: 3 },
        ],
    };
    let totals = report.totals();
    assert_eq!(totals.frame, 2);
    assert_eq!(totals.total(), 7);
    assert_eq!(report.last_frame(), Some(2));
}

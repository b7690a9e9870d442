//! Lock-free index allocation with LIFO recycling

use std::sync::atomic::{AtomicI32, Ordering};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use crate::error::{Error, Result};

/// Allocator index type
pub type Index = i32;

/// Default upper bound on the number of indices an allocator may issue
pub const MAXIMUM_INDEX: Index = 1 << 30;

/// Sentinel returned by [`IndexAllocator::allocate_index`] on exhaustion
pub const INVALID_INDEX: Index = -1;

/// Free stack plus a membership set so a double free cannot duplicate an index
#[derive(Default)]
struct FreeIndices {
    stack: Vec<Index>,
    members: FxHashSet<Index>,
}

/// Thread-safe allocator of reusable `i32` indices.
///
/// New indices come from a monotonic atomic counter; freed indices go to a
/// LIFO free stack and are handed out again before the counter advances, so
/// the backing storage indexed by them stays as small as the live set.
///
/// The counter path is lock-free. Only recycling (push/pop on the free
/// stack) takes a short lock. The two paths are individually atomic but not
/// transactional with each other: counts are a recent snapshot under
/// concurrent use.
///
/// # Example
///
/// ```
/// use galaxy_3d_workload::galaxy3d::utils::IndexAllocator;
///
/// let alloc = IndexAllocator::new();
/// let a = alloc.allocate_index(); // 0
/// let _b = alloc.allocate_index(); // 1
/// alloc.free_index(a);
/// assert_eq!(alloc.allocate_index(), 0); // recycled
/// ```
pub struct IndexAllocator {
    max_num_indices: Index,
    next_new_index: AtomicI32,
    /// Mirrors `free_indices.stack.len()` so the empty check needs no lock
    num_free_indices: AtomicI32,
    free_indices: Mutex<FreeIndices>,
}

impl IndexAllocator {
    /// Create an allocator bounded by [`MAXIMUM_INDEX`]
    pub fn new() -> Self {
        Self::with_max_indices(MAXIMUM_INDEX)
    }

    /// Create an allocator that never issues more than `max_num_indices` indices
    pub fn with_max_indices(max_num_indices: Index) -> Self {
        Self {
            max_num_indices: max_num_indices.max(0),
            next_new_index: AtomicI32::new(0),
            num_free_indices: AtomicI32::new(0),
            free_indices: Mutex::new(FreeIndices::default()),
        }
    }

    /// Configured upper bound
    pub fn max_num_indices(&self) -> Index {
        self.max_num_indices
    }

    /// Allocate an index, recycling the most recently freed one first.
    ///
    /// Exhaustion is a fatal configuration error: it is logged, trips a
    /// debug assertion, and yields [`INVALID_INDEX`] in release builds.
    pub fn allocate_index(&self) -> Index {
        match self.try_allocate_index() {
            Ok(index) => index,
            Err(err) => {
                crate::engine_error!("galaxy3d::IndexAllocator", "{}", err);
                debug_assert!(false, "{}", err);
                INVALID_INDEX
            }
        }
    }

    /// Allocate an index, reporting exhaustion as [`Error::CapacityExhausted`]
    pub fn try_allocate_index(&self) -> Result<Index> {
        if let Some(index) = self.pop_free_index() {
            return Ok(index);
        }

        let max = self.max_num_indices;
        self.next_new_index
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < max).then_some(next + 1)
            })
            .map_err(|_| Error::CapacityExhausted { max })
    }

    fn pop_free_index(&self) -> Option<Index> {
        if self.num_free_indices.load(Ordering::Acquire) == 0 {
            return None;
        }

        let mut free = self.free_indices.lock();
        let index = free.stack.pop()?;
        free.members.remove(&index);
        self.num_free_indices.fetch_sub(1, Ordering::AcqRel);
        Some(index)
    }

    /// Return an index to the pool for reuse.
    ///
    /// Out-of-range indices and indices already in the pool are ignored.
    /// Returns whether `index` was added to the pool.
    pub fn free_index(&self, index: Index) -> bool {
        if !self.check_index(index) {
            return false;
        }

        let inserted = {
            let mut free = self.free_indices.lock();
            let inserted = free.members.insert(index);
            if inserted {
                free.stack.push(index);
                self.num_free_indices.fetch_add(1, Ordering::AcqRel);
            }
            inserted
        };

        if !inserted {
            crate::engine_trace!("galaxy3d::IndexAllocator", "Index {} is already free", index);
        }
        inserted
    }

    /// Take `index` back out of the free pool so it is live again.
    ///
    /// Returns whether `index` was in the pool.
    pub fn claim_index(&self, index: Index) -> bool {
        if self.num_free_indices.load(Ordering::Acquire) == 0 {
            return false;
        }

        let mut free = self.free_indices.lock();
        if !free.members.remove(&index) {
            return false;
        }
        if let Some(position) = free.stack.iter().rposition(|&i| i == index) {
            free.stack.remove(position);
        }
        self.num_free_indices.fetch_sub(1, Ordering::AcqRel);
        true
    }

    /// Whether `index` was ever issued (`0 <= index < next new index`)
    pub fn check_index(&self, index: Index) -> bool {
        index >= 0 && index < self.next_new_index.load(Ordering::Acquire)
    }

    /// Whether `index` was issued and is not currently in the free pool
    pub fn is_live_index(&self, index: Index) -> bool {
        self.check_index(index) && !self.free_indices.lock().members.contains(&index)
    }

    /// Number of live indices (issued minus free)
    pub fn num_indices(&self) -> Index {
        self.num_allocated_indices() - self.num_free_indices()
    }

    /// Number of indices waiting in the free pool
    pub fn num_free_indices(&self) -> Index {
        self.num_free_indices.load(Ordering::Acquire)
    }

    /// Number of indices ever issued by the counter (high water mark)
    pub fn num_allocated_indices(&self) -> Index {
        self.next_new_index.load(Ordering::Acquire)
    }

    /// Forget every issued index
    pub fn clear(&self) {
        let mut free = self.free_indices.lock();
        free.stack.clear();
        free.members.clear();
        self.num_free_indices.store(0, Ordering::Release);
        self.next_new_index.store(0, Ordering::Release);
    }
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "index_allocator_tests.rs"]
mod tests;

/// Collection — the producer/consumer hand-off for proxy transactions.
///
/// Any thread may allocate ids, build transactions and enqueue them. A
/// designated owner cuts frames at its tick boundary; the single consumer
/// drains the cut frames and applies them to its [`ProxyStore`].
///
/// Lock layout:
/// - `transaction_queue`: pending transactions, held only for a push or a swap
/// - `frame_cut`: serializes frame cuts so frame numbers follow queue order
/// - `transaction_frames`: cut-but-unprocessed frames
/// - `consumer`: serializes `process_transaction_queue` callers
/// - `live_ids`: ids live as of the last processed frame
///
/// Producers never wait on a merge or on frame application.

use std::mem;
use std::sync::atomic::{AtomicU32, Ordering};
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::utils::{Index, IndexAllocator, MAXIMUM_INDEX};
use crate::engine_bail;
use super::proxy::ProxyId;
use super::proxy_index::ProxyIndex;
use super::proxy_store::{FrameChanges, FrameStats, ProxyStore};
use super::transaction::Transaction;

/// Number of ids reserved at construction (id 0)
const RESERVED_IDS: u32 = 1;

/// Collection configuration
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    /// Upper bound on ids the allocator may issue, reserved id 0 included
    pub max_proxies: Index,
    /// Initial capacity of the pending transaction queue
    pub initial_queue_capacity: usize,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            max_proxies: MAXIMUM_INDEX,
            initial_queue_capacity: 0,
        }
    }
}

/// Summary of one `process_transaction_queue` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Per-frame statistics, in frame order
    pub frames: Vec<FrameStats>,
}

impl ProcessReport {
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of the last frame applied, if any
    pub fn last_frame(&self) -> Option<u32> {
        self.frames.last().map(|stats| stats.frame)
    }

    /// Statistics summed over every frame (`frame` is the last frame applied)
    pub fn totals(&self) -> FrameStats {
        self.frames.iter().fold(FrameStats::default(), |acc, stats| FrameStats {
            frame: stats.frame,
            resets: acc.resets + stats.resets,
            removes: acc.removes + stats.removes,
            updates: acc.updates + stats.updates,
            ignored: acc.ignored + stats.ignored,
        })
    }
}

/// Frames cut but not yet processed
#[derive(Default)]
struct TransactionFrames {
    frames: Vec<(u32, Transaction)>,
    frame_number: u32,
}

pub struct Collection {
    id_allocator: IndexAllocator,
    /// Reserved ids plus live proxies, as of the last processed frame
    num_allocated_items: AtomicU32,
    transaction_queue: Mutex<Vec<Transaction>>,
    frame_cut: Mutex<()>,
    transaction_frames: Mutex<TransactionFrames>,
    consumer: Mutex<()>,
    live_ids: Mutex<FxHashSet<ProxyId>>,
}

impl Collection {
    /// Create a collection with the default configuration
    pub fn new() -> Self {
        Self::build(CollectionConfig::default())
    }

    /// Create a collection from `config`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_proxies` leaves no room for a
    /// single id beside the reserved id 0.
    pub fn with_config(config: CollectionConfig) -> Result<Self> {
        if config.max_proxies <= RESERVED_IDS as Index {
            engine_bail!("galaxy3d::Collection", Error::InvalidConfig(format!(
                "max_proxies must be greater than {}, got {}",
                RESERVED_IDS, config.max_proxies
            )));
        }
        Ok(Self::build(config))
    }

    fn build(config: CollectionConfig) -> Self {
        let id_allocator = IndexAllocator::with_max_indices(config.max_proxies);
        // Reserve id 0 so the first id handed out is 1
        for _ in 0..RESERVED_IDS {
            id_allocator.allocate_index();
        }

        crate::engine_info!("galaxy3d::Collection",
            "Collection created (max {} proxies)", config.max_proxies);

        Self {
            id_allocator,
            num_allocated_items: AtomicU32::new(RESERVED_IDS),
            transaction_queue: Mutex::new(Vec::with_capacity(config.initial_queue_capacity)),
            frame_cut: Mutex::new(()),
            transaction_frames: Mutex::new(TransactionFrames::default()),
            consumer: Mutex::new(()),
            live_ids: Mutex::new(FxHashSet::default()),
        }
    }

    // ===== IDS =====

    /// Allocate a new proxy id; callable from any thread.
    ///
    /// Returns [`ProxyId::INVALID`] if the allocator is exhausted (which also
    /// trips a debug assertion; see [`IndexAllocator::allocate_index`]).
    pub fn allocate_id(&self) -> ProxyId {
        ProxyId::from_index(self.id_allocator.allocate_index())
    }

    /// Allocate a new proxy id, reporting exhaustion as an error
    pub fn try_allocate_id(&self) -> Result<ProxyId> {
        self.id_allocator.try_allocate_index().map(ProxyId::from_index)
    }

    /// Give back an id that was allocated but never reset.
    ///
    /// Ids of proxies that were created are recycled automatically when a
    /// processed frame removes them. An id whose proxy is live as of the last
    /// processed frame is refused. Returns whether the id went back to the pool.
    pub fn release_id(&self, id: ProxyId) -> bool {
        if !id.is_valid() {
            return false;
        }
        if self.live_ids.lock().contains(&id) {
            crate::engine_warn!("galaxy3d::Collection",
                "Refusing to release id {}: its proxy is live", id);
            return false;
        }
        self.id_allocator.free_index(id.index())
    }

    /// Whether `id` is currently allocated by this collection
    pub fn is_allocated_id(&self, id: ProxyId) -> bool {
        id.is_valid() && self.id_allocator.is_live_index(id.index())
    }

    /// Reserved ids plus live proxies, as of the last processed frame
    pub fn num_allocated_proxies(&self) -> u32 {
        self.num_allocated_items.load(Ordering::Acquire)
    }

    /// Configured upper bound on ids
    pub fn max_proxies(&self) -> Index {
        self.id_allocator.max_num_indices()
    }

    // ===== PRODUCERS =====

    /// Queue a copy of `transaction`
    pub fn enqueue_transaction(&self, transaction: &Transaction) {
        self.enqueue_transaction_owned(transaction.clone());
    }

    /// Queue `transaction`, taking ownership
    pub fn enqueue_transaction_owned(&self, transaction: Transaction) {
        self.transaction_queue.lock().push(transaction);
    }

    /// Number of transactions waiting for the next frame cut
    pub fn num_pending_transactions(&self) -> usize {
        self.transaction_queue.lock().len()
    }

    // ===== FRAMES =====

    /// Cut a frame: merge every pending transaction, in enqueue order, into
    /// one and queue it for processing. Returns the new frame number
    /// (the first frame is 1).
    pub fn enqueue_frame(&self) -> u32 {
        let _cut = self.frame_cut.lock();

        let pending = mem::take(&mut *self.transaction_queue.lock());
        let num_transactions = pending.len();

        let mut merged = Transaction::new();
        merged.reserve(&pending);
        merged.merge_all_owned(pending);

        let mut frames = self.transaction_frames.lock();
        frames.frame_number += 1;
        let frame_number = frames.frame_number;

        crate::engine_debug!("galaxy3d::Collection",
            "Frame {} cut: {} transactions, {} operations",
            frame_number, num_transactions, merged.len());

        frames.frames.push((frame_number, merged));
        frame_number
    }

    /// Number of the last cut frame (0 before the first cut)
    pub fn frame_number(&self) -> u32 {
        self.transaction_frames.lock().frame_number
    }

    /// Number of cut frames waiting for `process_transaction_queue`
    pub fn num_pending_frames(&self) -> usize {
        self.transaction_frames.lock().frames.len()
    }

    // ===== CONSUMER =====

    /// Apply every cut frame, in frame order, to `store`.
    ///
    /// The frame list is drained under its lock and applied after the lock is
    /// released, so producers and frame cuts proceed meanwhile. Concurrent
    /// callers are serialized.
    ///
    /// Resets of ids this collection never issued are ignored. Ids of proxies
    /// removed by the drained frames (and not recreated by a later one) return
    /// to the allocator once every frame is applied. A reset that recreates an
    /// id recycled by an earlier call takes it back out of the free pool.
    pub fn process_transaction_queue(
        &self,
        store: &mut ProxyStore,
        mut index: Option<&mut dyn ProxyIndex>,
    ) -> ProcessReport {
        let _consumer = self.consumer.lock();

        let frames = mem::take(&mut self.transaction_frames.lock().frames);

        let mut report = ProcessReport { frames: Vec::with_capacity(frames.len()) };
        let mut changes = FrameChanges::default();
        let mut removed = Vec::new();
        let is_issued = |id: ProxyId| id.is_valid() && self.id_allocator.check_index(id.index());

        for (frame_number, frame) in frames {
            changes.clear();
            let stats = store.apply_frame(
                frame_number,
                &frame,
                index.as_mut().map(|index| &mut **index as &mut dyn ProxyIndex),
                &is_issued,
                &mut changes,
            );

            for &id in &changes.created {
                if self.id_allocator.claim_index(id.index()) {
                    crate::engine_debug!("galaxy3d::Collection",
                        "Frame {}: proxy {} recreated, id taken back from the free pool",
                        frame_number, id);
                }
            }
            self.refresh_live_ids(store, &changes);
            removed.extend_from_slice(&changes.removed);

            let live = u32::try_from(store.len()).unwrap_or(u32::MAX - RESERVED_IDS);
            self.num_allocated_items.store(RESERVED_IDS + live, Ordering::Release);

            crate::engine_debug!("galaxy3d::Collection",
                "Frame {} applied: {} resets, {} removes, {} updates, {} ignored",
                stats.frame, stats.resets, stats.removes, stats.updates, stats.ignored);

            report.frames.push(stats);
        }

        removed.sort_unstable();
        removed.dedup();
        for id in removed {
            if !store.contains(id) {
                self.id_allocator.free_index(id.index());
            }
        }

        report
    }

    fn refresh_live_ids(&self, store: &ProxyStore, changes: &FrameChanges) {
        let mut live_ids = self.live_ids.lock();
        for &id in changes.created.iter().chain(&changes.removed) {
            if store.contains(id) {
                live_ids.insert(id);
            } else {
                live_ids.remove(&id);
            }
        }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;

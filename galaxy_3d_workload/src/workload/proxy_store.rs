/// ProxyStore — the authoritative set of live proxies.
///
/// Proxies are stored densely, indexed by their id, so recycled ids reuse
/// slots instead of growing the storage. The store is only mutated by the
/// frame processor, one consolidated transaction at a time; readers see it
/// between frames and never in a partially applied state.

use crate::utils::MAXIMUM_INDEX;
use super::proxy::{Proxy, ProxyId, Sphere};
use super::proxy_index::ProxyIndex;
use super::transaction::{Operation, Transaction};

/// Outcome of applying one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number
    pub frame: u32,
    /// Resets applied (creations and payload replacements)
    pub resets: usize,
    /// Removes that destroyed a live proxy
    pub removes: usize,
    /// Updates applied to a live proxy
    pub updates: usize,
    /// Operations targeting an absent or invalid id, dropped silently
    pub ignored: usize,
}

impl FrameStats {
    /// Every operation the frame carried, applied or ignored
    pub fn total(&self) -> usize {
        self.resets + self.removes + self.updates + self.ignored
    }
}

/// Ids whose liveness changed while a frame was applied
#[derive(Debug, Default)]
pub(crate) struct FrameChanges {
    /// Ids that went from absent to live
    pub created: Vec<ProxyId>,
    /// Ids whose live proxy was destroyed
    pub removed: Vec<ProxyId>,
}

impl FrameChanges {
    pub fn clear(&mut self) {
        self.created.clear();
        self.removed.clear();
    }
}

pub struct ProxyStore {
    /// Slot `i` holds the proxy with id `i`; slot 0 is never used
    proxies: Vec<Option<Proxy>>,
    num_live: usize,
    last_processed_frame: u32,
}

impl ProxyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty store with room for ids below `capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            proxies: Vec::with_capacity(capacity),
            num_live: 0,
            last_processed_frame: 0,
        }
    }

    // ===== QUERIES =====

    /// The live proxy with this id, if any
    pub fn proxy(&self, id: ProxyId) -> Option<&Proxy> {
        self.proxies.get(id.slot()).and_then(Option::as_ref)
    }

    /// The sphere of the live proxy with this id, if any
    pub fn sphere(&self, id: ProxyId) -> Option<&Sphere> {
        self.proxy(id).map(|proxy| &proxy.sphere)
    }

    pub fn contains(&self, id: ProxyId) -> bool {
        self.proxy(id).is_some()
    }

    /// Number of live proxies
    pub fn len(&self) -> usize {
        self.num_live
    }

    pub fn is_empty(&self) -> bool {
        self.num_live == 0
    }

    /// Iterate over live proxies in id order
    pub fn iter(&self) -> impl Iterator<Item = (ProxyId, &Proxy)> + '_ {
        self.proxies.iter().enumerate().filter_map(|(slot, proxy)| {
            let proxy = proxy.as_ref()?;
            Some((ProxyId::new(u32::try_from(slot).ok()?), proxy))
        })
    }

    /// Number of the last frame applied (0 before the first one)
    pub fn last_processed_frame(&self) -> u32 {
        self.last_processed_frame
    }

    /// Drop every proxy, notifying `index`
    pub fn clear(&mut self, index: Option<&mut dyn ProxyIndex>) {
        self.proxies.clear();
        self.num_live = 0;
        if let Some(index) = index {
            index.clear();
        }
    }

    // ===== FRAME PROCESSING =====

    /// Apply one consolidated transaction.
    ///
    /// Entries are replayed in the order they were recorded (across all three
    /// kinds), so for any id the last recorded operation decides its fate:
    /// - reset creates the proxy or replaces its sphere (last reset wins)
    /// - remove destroys it
    /// - update replaces the sphere of a live proxy
    ///
    /// Updates and removes that find no live proxy are ignored, as is any
    /// operation on [`ProxyId::INVALID`]. Resets of ids at or above
    /// [`MAXIMUM_INDEX`] are ignored too, which bounds the storage.
    pub fn process_transaction_frame(
        &mut self,
        frame_number: u32,
        frame: &Transaction,
        index: Option<&mut dyn ProxyIndex>,
    ) -> FrameStats {
        self.apply_frame(frame_number, frame, index, &Self::in_id_range, &mut FrameChanges::default())
    }

    fn in_id_range(id: ProxyId) -> bool {
        (1..MAXIMUM_INDEX).contains(&id.index())
    }

    /// Same as `process_transaction_frame`, applying only the resets whose id
    /// passes `accepts_reset` and reporting the ids created and destroyed
    pub(crate) fn apply_frame(
        &mut self,
        frame_number: u32,
        frame: &Transaction,
        mut index: Option<&mut dyn ProxyIndex>,
        accepts_reset: &dyn Fn(ProxyId) -> bool,
        changes: &mut FrameChanges,
    ) -> FrameStats {
        let mut stats = FrameStats { frame: frame_number, ..FrameStats::default() };

        for operation in frame.operations() {
            match operation {
                Operation::Reset(id, sphere) if accepts_reset(id) => {
                    let slot = self.slot_mut(id);
                    let existed = slot.is_some();
                    *slot = Some(Proxy { sphere, frame: frame_number });
                    if !existed {
                        self.num_live += 1;
                        changes.created.push(id);
                    }
                    if let Some(index) = index.as_deref_mut() {
                        if existed {
                            index.update(id, &sphere);
                        } else {
                            index.insert(id, &sphere);
                        }
                    }
                    stats.resets += 1;
                }
                Operation::Remove(id) => {
                    match self.proxies.get_mut(id.slot()).and_then(Option::take) {
                        Some(_) => {
                            self.num_live -= 1;
                            if let Some(index) = index.as_deref_mut() {
                                index.remove(id);
                            }
                            changes.removed.push(id);
                            stats.removes += 1;
                        }
                        None => {
                            crate::engine_trace!("galaxy3d::ProxyStore",
                                "Frame {}: ignoring remove of absent proxy {}", frame_number, id);
                            stats.ignored += 1;
                        }
                    }
                }
                Operation::Update(id, sphere) => {
                    match self.proxies.get_mut(id.slot()).and_then(Option::as_mut) {
                        Some(proxy) => {
                            proxy.sphere = sphere;
                            proxy.frame = frame_number;
                            if let Some(index) = index.as_deref_mut() {
                                index.update(id, &sphere);
                            }
                            stats.updates += 1;
                        }
                        None => {
                            crate::engine_trace!("galaxy3d::ProxyStore",
                                "Frame {}: ignoring update of absent proxy {}", frame_number, id);
                            stats.ignored += 1;
                        }
                    }
                }
                Operation::Reset(id, _) => {
                    crate::engine_trace!("galaxy3d::ProxyStore",
                        "Frame {}: ignoring reset of unknown proxy {}", frame_number, id);
                    stats.ignored += 1;
                }
            }
        }

        self.last_processed_frame = frame_number;
        stats
    }

    /// Number of slots backing the store (highest id ever reset, plus one)
    #[cfg(test)]
    pub(crate) fn num_slots(&self) -> usize {
        self.proxies.len()
    }

    /// Slot for `id`, growing the storage as needed
    fn slot_mut(&mut self, id: ProxyId) -> &mut Option<Proxy> {
        let slot = id.slot();
        if slot >= self.proxies.len() {
            self.proxies.resize(slot + 1, None);
        }
        &mut self.proxies[slot]
    }
}

impl Default for ProxyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "proxy_store_tests.rs"]
mod tests;

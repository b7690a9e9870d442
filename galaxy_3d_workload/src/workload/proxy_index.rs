/// Spatial index collaborator notified by the frame processor.
///
/// The workload does not implement any spatial query itself. Whatever
/// structure answers queries (octree, BVH, grid...) implements this trait
/// and receives the consolidated changes of each processed frame.
///
/// Ownership: the caller creates and owns the index and passes it to
/// `Collection::process_transaction_queue` by mutable reference.

use super::proxy::{ProxyId, Sphere};

pub trait ProxyIndex: Send + Sync {
    /// A proxy came into existence with `sphere`.
    fn insert(&mut self, id: ProxyId, sphere: &Sphere);

    /// An existing proxy's sphere changed (reset of a live id, or update).
    fn update(&mut self, id: ProxyId, sphere: &Sphere);

    /// A proxy was destroyed.
    fn remove(&mut self, id: ProxyId);

    /// Remove every proxy from the index.
    fn clear(&mut self);
}

/// No-op index, for consumers that only need the proxy store.
pub struct NoOpProxyIndex;

impl NoOpProxyIndex {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpProxyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyIndex for NoOpProxyIndex {
    fn insert(&mut self, _id: ProxyId, _sphere: &Sphere) {}

    fn update(&mut self, _id: ProxyId, _sphere: &Sphere) {}

    fn remove(&mut self, _id: ProxyId) {}

    fn clear(&mut self) {}
}

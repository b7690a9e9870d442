//! Workload module
//!
//! Deferred mutation of spatial proxies: producers record changes in
//! transactions, the collection batches them into frames, and the single
//! consumer applies each frame to its proxy store.

mod proxy;
mod transaction;
mod proxy_index;
mod proxy_store;
mod collection;

pub use proxy::{ProxyId, Sphere, Proxy};
pub use transaction::Transaction;
pub use proxy_index::{ProxyIndex, NoOpProxyIndex};
pub use proxy_store::{ProxyStore, FrameStats};
pub use collection::{Collection, CollectionConfig, ProcessReport};

/*!
# Galaxy 3D Workload

Frame-synchronized transaction queue for the spatial proxies of the
Galaxy3D engine.

Many threads propose creation, movement/resizing or destruction of proxies
(bounding spheres identified by a reusable integer id). A single consumer
applies those changes at discrete frame boundaries, so readers of the
spatial index never observe a partially updated state.

## Architecture

- **IndexAllocator**: lock-free id issue with LIFO recycling of freed ids
- **Transaction**: a batch of reset/update/remove operations with deterministic merge
- **Collection**: thread-safe queue that cuts pending transactions into frames
- **ProxyStore**: the authoritative proxy set, updated one frame at a time
- **ProxyIndex**: trait for the spatial index notified of every applied change

## Example

```
use galaxy_3d_workload::galaxy3d::workload::{Collection, ProxyStore, Sphere, Transaction};
use galaxy_3d_workload::glam::Vec3;

let collection = Collection::new();
let mut store = ProxyStore::new();

let id = collection.allocate_id();
let mut transaction = Transaction::new();
transaction.reset(id, Sphere::new(Vec3::ZERO, 1.0));
collection.enqueue_transaction_owned(transaction);

assert_eq!(collection.enqueue_frame(), 1);
collection.process_transaction_queue(&mut store, None);
assert!(store.contains(id));
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod utils;
pub mod workload;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facade
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Utilities sub-module
    pub mod utils {
        pub use crate::utils::*;
    }

    // Workload sub-module
    pub mod workload {
        pub use crate::workload::*;
    }
}

// Re-export math library at crate root
pub use glam;

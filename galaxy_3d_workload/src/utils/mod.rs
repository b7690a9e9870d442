//! Shared utilities

mod index_allocator;

pub use index_allocator::{IndexAllocator, Index, MAXIMUM_INDEX, INVALID_INDEX};

//! # lrucache
//!
//! Fixed-capacity in-memory LRU cache.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to arena slot (O(1))
//! - **LRU List**: Doubly-linked list over arena slots, bounded by two
//!   sentinels, for O(1) promotion and eviction
//!
//! The cache is single-threaded: `get` reorders entries and takes `&mut self`,
//! so callers sharing a cache across threads must wrap it in a lock.
//!
//! Logging goes through `tracing`; install a subscriber to see cache
//! construction/reset (`debug`) and evictions (`trace`).

#![warn(missing_docs)]

mod error;
mod lru;
mod stats;

pub use error::{Error, Result};
pub use lru::{Iter, LruCache};
pub use stats::CacheStats;

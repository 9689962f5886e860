//! # lrucache
//!
//! Fixed-capacity LRU (Least Recently Used) cache.
//!
//! ## Architecture
//! - **HashMap**: AHash index from key to slot (O(1))
//! - **LRU List**: Doubly-linked list over a slot arena for eviction (O(1))
//! - **Shared**: One mutex around the cache for use across threads
//!
//! ## Semantics
//! - `get` and `put` promote the key to most recently used
//! - Inserting a new key into a full cache evicts the least recently used entry
//! - A miss is `None`, never a sentinel value
//! - Capacity zero is valid: the cache stays empty and every `get` misses
//!
//! ```
//! use lrucache::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");
//! cache.put("c", 3); // evicts "b"
//!
//! assert_eq!(cache.get(&"b"), None);
//! let order: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
//! assert_eq!(order, vec!["a", "c"]);
//! ```

#![warn(missing_docs)]

mod error;
mod lru;
mod shared;
mod stats;

pub use error::{Error, Result};
pub use lru::{Iter, LruCache, PresenceCache};
pub use shared::SharedLruCache;
pub use stats::CacheStats;

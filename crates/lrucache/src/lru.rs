//! LRU (Least Recently Used) cache implementation
//!
//! Entries live in a slot arena and are linked into a doubly-linked list by
//! slot index: `head` is the most recently used entry, `tail` the least
//! recently used one. The key index maps every key to its slot, so lookup,
//! promotion and eviction are all O(1).

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use ahash::RandomState;

use crate::error::{Error, Result};

/// Upper bound on slots reserved up front; larger caches grow on demand
const MAX_PREALLOC: usize = 4096;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU cache with fixed capacity
///
/// A capacity of zero is allowed: every insertion is handed straight back
/// as evicted, so the cache stays empty and every lookup misses.
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Option<Node<K, V>>>,
    head: Option<usize>,
    tail: Option<usize>,
    free_list: Vec<usize>,
    capacity: usize,
}

/// Presence-only cache: records which keys were seen recently
pub type PresenceCache<K> = LruCache<K, ()>;

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    pub fn new(capacity: usize) -> Self {
        let reserve = capacity.min(MAX_PREALLOC);

        Self {
            map: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
            nodes: Vec::with_capacity(reserve),
            head: None,
            tail: None,
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Create a new LRU cache from any integer capacity
    ///
    /// # Errors
    /// * `Error::InvalidCapacity` - the value is negative or does not fit in `usize`
    pub fn try_new<C>(capacity: C) -> Result<Self>
    where
        C: TryInto<usize> + fmt::Display,
    {
        let rendered = capacity.to_string();
        match capacity.try_into() {
            Ok(capacity) => Ok(Self::new(capacity)),
            Err(_) => Err(Error::InvalidCapacity(rendered)),
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Get a mutable reference to a value, marking it most recently used
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].as_mut().map(|node| &mut node.value)
    }

    /// Get a value without changing its recency
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    /// Check whether a key is cached without changing its recency
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Mark a key most recently used; returns false if it is not cached
    pub fn touch(&mut self, key: &K) -> bool {
        match self.map.get(key) {
            Some(&idx) => {
                self.move_to_front(idx);
                true
            }
            None => false,
        }
    }

    /// Insert a key-value pair into the cache
    ///
    /// Returns the previous value when the key was already cached. Inserting
    /// a new key into a full cache evicts the least recently used entry.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.map.get(&key).copied() {
            Some(idx) => self.replace(idx, key, value).map(|(_, old)| old),
            None => {
                self.insert_new(key, value);
                None
            }
        }
    }

    /// Insert a key-value pair and return whatever entry it displaced
    ///
    /// # Returns
    /// * `Some((key, old))` - the key was cached and its value was replaced
    /// * `Some((lru_key, lru_value))` - a new key evicted the LRU entry
    /// * `Some((key, value))` - capacity is zero, the entry was rejected
    /// * `None` - a new key fit without eviction
    pub fn push(&mut self, key: K, value: V) -> Option<(K, V)> {
        match self.map.get(&key).copied() {
            Some(idx) => self.replace(idx, key, value),
            None => self.insert_new(key, value),
        }
    }

    /// Remove a key from the cache
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = *self.map.get(key)?;
        self.detach(idx).map(|(_, value)| value)
    }

    /// Remove and return the least recently used entry
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.detach(idx)
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
    }

    fn replace(&mut self, idx: usize, key: K, value: V) -> Option<(K, V)> {
        let old = match &mut self.nodes[idx] {
            Some(node) => std::mem::replace(&mut node.value, value),
            None => return None,
        };
        self.move_to_front(idx);
        Some((key, old))
    }

    fn insert_new(&mut self, key: K, value: V) -> Option<(K, V)> {
        if self.capacity == 0 {
            return Some((key, value));
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.alloc_node();
        self.nodes[idx] = Some(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.link_front(idx);
        self.map.insert(key, idx);

        evicted
    }

    fn detach(&mut self, idx: usize) -> Option<(K, V)> {
        self.unlink(idx);
        let node = self.nodes[idx].take()?;
        self.map.remove(&node.key);
        self.free_node(idx);
        Some((node.key, node.value))
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at front
        }

        self.unlink(idx);
        self.link_front(idx);
    }

    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = old_head;
        }

        if let Some(head_idx) = old_head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = if let Some(node) = &self.nodes[idx] {
            (node.prev, node.next)
        } else {
            return;
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}

impl<K, V> LruCache<K, V> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Alias for [`LruCache::len`]
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries held at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Least recently used entry (the next eviction victim), without touching it
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.entry_at(self.tail)
    }

    /// Most recently used entry, without touching it
    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.entry_at(self.head)
    }

    /// Iterate entries from least to most recently used
    ///
    /// Iteration never changes recency. Use `.rev()` for MRU to LRU.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            front: self.tail,
            back: self.head,
            remaining: self.map.len(),
        }
    }

    fn entry_at(&self, idx: Option<usize>) -> Option<(&K, &V)> {
        let node = self.nodes[idx?].as_ref()?;
        Some((&node.key, &node.value))
    }
}

impl<K, V> LruCache<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Owned copy of the contents, least to most recently used
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("entries", &Entries(self))
            .finish()
    }
}

struct Entries<'a, K, V>(&'a LruCache<K, V>);

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entries<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Iterator over cache entries, least to most recently used
pub struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.nodes[self.front?].as_ref()?;
        self.front = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.nodes[self.back?].as_ref()?;
        self.back = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

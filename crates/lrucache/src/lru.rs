//! LRU (Least Recently Used) cache implementation
//!
//! Nodes live in an arena (`Vec`) and link to each other by slot index, so
//! the recency list needs no shared ownership. Slots 0 and 1 are the `HEAD`
//! and `TAIL` sentinels: `HEAD.next` is the most recently used entry and
//! `TAIL.prev` the least recently used one. Freed slots are recycled through
//! a free list.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::stats::CacheStats;

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Upper bound on slots reserved up front, so huge capacities stay lazy.
const MAX_PREALLOC: usize = 4096;

/// Node in the LRU doubly-linked list
struct Node<K, V> {
    /// `None` for sentinels and free slots
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            prev: HEAD,
            next: TAIL,
        }
    }
}

/// LRU cache with fixed capacity
///
/// `get` and `put` run in O(1). A `put` of a new key into a full cache
/// silently evicts the least recently used entry.
///
/// ```
/// use lrucache::{Error, LruCache};
///
/// let mut cache = LruCache::new(2)?;
/// cache.put(1, "one");
/// cache.put(2, "two");
/// assert_eq!(cache.get(&1), Ok(&"one"));
///
/// cache.put(3, "three"); // evicts 2
/// assert_eq!(cache.get(&2), Err(Error::KeyNotFound));
/// # Ok::<(), Error>(())
/// ```
pub struct LruCache<K, V, S = RandomState> {
    map: HashMap<K, usize, S>,
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// # Errors
    /// * `Error::ZeroCapacity` - if `capacity` is 0
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_hasher(capacity, RandomState::new())
    }
}

impl<K, V, S> LruCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Create a new LRU cache whose index uses `hasher`
    ///
    /// # Errors
    /// * `Error::ZeroCapacity` - if `capacity` is 0
    pub fn with_hasher(capacity: usize, hasher: S) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        debug!("Creating LRU cache with capacity {}", capacity);

        let reserve = capacity.min(MAX_PREALLOC);
        let mut nodes = Vec::with_capacity(reserve + 2);
        nodes.push(Node::sentinel());
        nodes.push(Node::sentinel());

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(reserve, hasher),
            nodes,
            free_list: Vec::new(),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Get a value from the cache, marking it most recently used
    ///
    /// # Errors
    /// * `Error::KeyNotFound` - if `key` is not cached
    pub fn get(&mut self, key: &K) -> Result<&V> {
        let Some(&idx) = self.map.get(key) else {
            self.stats.record_miss();
            return Err(Error::KeyNotFound);
        };

        self.move_to_front(idx)?;
        self.stats.record_hit();
        self.value_at(idx).ok_or(Error::KeyNotFound)
    }

    /// Insert or update a key-value pair, marking it most recently used
    pub fn put(&mut self, key: K, value: V) {
        if let Some(&idx) = self.map.get(&key) {
            if let Some((_, slot)) = &mut self.nodes[idx].entry {
                *slot = value;
            }
            let moved = self.move_to_front(idx);
            debug_assert!(moved.is_ok(), "index points at vacant slot {idx}");
            return;
        }

        let idx = self.alloc_node(key.clone(), value);
        self.insert_front(idx);
        self.map.insert(key, idx);
        self.stats.record_insert();

        if self.map.len() > self.capacity {
            self.evict();
        }
    }

    /// Remove a key from the cache, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.release(idx).ok().map(|(_, value)| value)
    }

    /// Get a value without touching recency order or statistics
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.map.get(key).and_then(|&idx| self.value_at(idx))
    }

    /// Check whether `key` is cached, without touching recency order
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Drop every entry and reset statistics; capacity is kept
    pub fn reset(&mut self) {
        debug!("Resetting LRU cache, dropping {} entries", self.map.len());

        self.map.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free_list.clear();
        self.stats.reset();
    }

    fn evict(&mut self) {
        let lru = self.nodes[TAIL].prev;
        if let Ok((key, _)) = self.release(lru) {
            self.map.remove(&key);
            self.stats.record_eviction();
            trace!("Evicted least recently used entry from slot {}", lru);
        }
    }
}

impl<K, V, S> LruCache<K, V, S> {
    /// Get the current number of entries
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit/miss/insert/eviction counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The entry the next overflowing `put` would evict
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let idx = self.nodes[TAIL].prev;
        self.nodes[idx].entry.as_ref().map(|(key, value)| (key, value))
    }

    /// Iterate from most to least recently used without touching recency
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
            remaining: self.map.len(),
        }
    }

    fn value_at(&self, idx: usize) -> Option<&V> {
        self.nodes[idx].entry.as_ref().map(|(_, value)| value)
    }

    fn alloc_node(&mut self, key: K, value: V) -> usize {
        let node = Node {
            entry: Some((key, value)),
            prev: HEAD,
            next: TAIL,
        };

        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn move_to_front(&mut self, idx: usize) -> Result<()> {
        if self.nodes[HEAD].next == idx {
            return Ok(());
        }

        self.detach(idx)?;
        self.insert_front(idx);
        Ok(())
    }

    /// Unlink a live node from the list. The index is left alone.
    fn detach(&mut self, idx: usize) -> Result<()> {
        let (prev, next) = match self.nodes.get(idx) {
            Some(Node {
                entry: Some(_),
                prev,
                next,
            }) => (*prev, *next),
            _ => return Err(Error::KeyNotFound),
        };

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        Ok(())
    }

    /// Splice a node in right after `HEAD`. The index is left alone.
    fn insert_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;

        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = first;
        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    /// Detach a node, take its entry and recycle the slot.
    fn release(&mut self, idx: usize) -> Result<(K, V)> {
        self.detach(idx)?;
        let entry = self.nodes[idx].entry.take().ok_or(Error::KeyNotFound)?;
        self.free_list.push(idx);
        Ok(entry)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for LruCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S> IntoIterator for &'a LruCache<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }

        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        node.entry.as_ref().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Get(u8),
        Put(u8, u32),
        Remove(u8),
        Reset,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..16).prop_map(Op::Get),
            4 => (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            1 => (0u8..16).prop_map(Op::Remove),
            1 => Just(Op::Reset),
        ]
    }

    /// Naive reference: `entries[0]` is most recently used.
    struct Model {
        entries: Vec<(u8, u32)>,
        capacity: usize,
    }

    impl Model {
        fn touch(&mut self, key: u8) -> Option<u32> {
            let pos = self.entries.iter().position(|(k, _)| *k == key)?;
            let entry = self.entries.remove(pos);
            self.entries.insert(0, entry);
            Some(entry.1)
        }

        fn put(&mut self, key: u8, value: u32) {
            if self.touch(key).is_some() {
                self.entries[0].1 = value;
            } else {
                self.entries.insert(0, (key, value));
                if self.entries.len() > self.capacity {
                    self.entries.pop();
                }
            }
        }

        fn remove(&mut self, key: u8) -> Option<u32> {
            let pos = self.entries.iter().position(|(k, _)| *k == key)?;
            Some(self.entries.remove(pos).1)
        }
    }

    proptest! {
        /// The cache agrees with the reference model after every operation.
        #[test]
        fn prop_matches_reference_model(
            capacity in 1usize..8,
            ops in prop::collection::vec(op_strategy(), 0..200)
        ) {
            let mut cache = LruCache::new(capacity).unwrap();
            let mut model = Model { entries: Vec::new(), capacity };

            for op in ops {
                match op {
                    Op::Get(key) => {
                        prop_assert_eq!(cache.get(&key).ok().copied(), model.touch(key));
                    }
                    Op::Put(key, value) => {
                        cache.put(key, value);
                        model.put(key, value);
                        prop_assert_eq!(cache.iter().next(), Some((&key, &value)));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(cache.remove(&key), model.remove(key));
                    }
                    Op::Reset => {
                        cache.reset();
                        model.entries.clear();
                    }
                }

                let actual: Vec<(u8, u32)> = cache.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(&actual, &model.entries);
                prop_assert!(cache.len() <= capacity);
            }
        }

        /// `put` then `get` returns the stored value.
        #[test]
        fn prop_put_then_get(
            capacity in 1usize..16,
            prefill in prop::collection::vec((0u8..32, any::<u32>()), 0..32),
            key in 0u8..32,
            value in any::<u32>()
        ) {
            let mut cache = LruCache::new(capacity).unwrap();
            for (k, v) in prefill {
                cache.put(k, v);
            }

            cache.put(key, value);
            prop_assert_eq!(cache.get(&key), Ok(&value));
        }
    }
}

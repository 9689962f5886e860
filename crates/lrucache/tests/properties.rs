//! Behavioural properties of the LRU cache

use std::collections::VecDeque;

use lrucache::LruCache;

/// Deterministic xorshift stream so failures reproduce
struct Ops(u64);

impl Ops {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }
}

/// Reference model: a plain deque ordered LRU -> MRU
struct Model {
    entries: VecDeque<(u64, u64)>,
    capacity: usize,
}

impl Model {
    fn get(&mut self, key: u64) -> Option<u64> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        let entry = self.entries.remove(pos)?;
        self.entries.push_back(entry);
        Some(entry.1)
    }

    fn put(&mut self, key: u64, value: u64) {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        } else if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        if self.capacity > 0 {
            self.entries.push_back((key, value));
        }
    }
}

#[test]
fn test_sample_scenario() {
    let mut cache = LruCache::new(4);

    for (key, value) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
        cache.put(key, value);
    }
    cache.put(1, 15);
    cache.put(2, 25);
    assert_eq!(cache.size(), 4);

    // LRU order is now 3, 4, 1, 2
    cache.put(5, 50);

    assert_eq!(cache.snapshot(), vec![(4, 40), (1, 15), (2, 25), (5, 50)]);
    assert_eq!(cache.get(&3), None);
    assert_eq!(cache.get(&6), None);
    assert_eq!(cache.size(), 4);
}

#[test]
fn test_refreshed_key_survives_eviction() {
    for capacity in 1..8u32 {
        let mut cache = LruCache::new(capacity as usize);
        for key in 1..=capacity {
            cache.put(key, key * 10);
        }

        cache.get(&1);
        cache.put(capacity + 1, 0);

        if capacity == 1 {
            assert!(!cache.contains(&1));
        } else {
            assert!(cache.contains(&1), "capacity {}", capacity);
            assert!(!cache.contains(&2), "capacity {}", capacity);
        }
    }
}

#[test]
fn test_overwrite_preserves_size() {
    let mut cache = LruCache::new(3);
    cache.put("k", 1);
    cache.put("other", 2);

    cache.put("k", 2);

    assert_eq!(cache.size(), 2);
    assert_eq!(cache.get(&"k"), Some(&2));
}

#[test]
fn test_misses_do_not_change_eviction_order() {
    let mut cache = LruCache::new(3);
    cache.put(1, ());
    cache.put(2, ());
    cache.put(3, ());

    for absent in 10..100 {
        assert!(cache.get(&absent).is_none());
    }
    cache.put(4, ());

    assert_eq!(cache.peek_lru(), Some((&2, &())));
    assert!(!cache.contains(&1));
}

#[test]
fn test_zero_capacity_stays_empty() {
    let mut cache = LruCache::new(0);

    for key in 0..50 {
        cache.put(key, key);
        assert_eq!(cache.size(), 0);
        assert_eq!(cache.get(&key), None);
    }
}

#[test]
fn test_matches_reference_model() {
    for capacity in [0usize, 1, 2, 5, 16] {
        let mut cache = LruCache::new(capacity);
        let mut model = Model {
            entries: VecDeque::new(),
            capacity,
        };
        let mut ops = Ops(0x9E37_79B9_7F4A_7C15 ^ capacity as u64);

        for step in 0..5_000 {
            let roll = ops.next();
            let key = roll % 24;
            if roll % 3 == 0 {
                assert_eq!(cache.get(&key).copied(), model.get(key), "step {}", step);
            } else {
                cache.put(key, step);
                model.put(key, step);
            }

            assert!(cache.size() <= capacity);
            let expected: Vec<_> = model.entries.iter().copied().collect();
            assert_eq!(cache.snapshot(), expected, "step {}", step);
        }
    }
}

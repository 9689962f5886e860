//! Replays a sample put/get sequence

use lrucache::LruCache;

const OPERATIONS: [(u32, u32); 7] = [(1, 10), (2, 20), (3, 30), (4, 40), (1, 15), (2, 25), (5, 50)];

/// Run the sequence against a fresh cache and return the transcript
pub fn run(capacity: usize) -> Vec<String> {
    let mut cache = LruCache::new(capacity);
    let mut lines = Vec::new();

    for (key, value) in OPERATIONS {
        cache.put(key, value);
        lines.push(format!("put {} => {:<4} cache: {}", key, value, render(&cache)));
    }

    for key in [3, 6] {
        let found = match cache.get(&key) {
            Some(value) => value.to_string(),
            None => "(miss)".to_string(),
        };
        lines.push(format!("get {} => {}", key, found));
    }

    lines.push(format!("size => {}", cache.size()));
    lines
}

/// Contents from least to most recently used
fn render(cache: &LruCache<u32, u32>) -> String {
    let entries: Vec<String> = cache
        .iter()
        .map(|(key, value)| format!("({}, {})", key, value))
        .collect();
    format!("[{}]", entries.join(", "))
}

//! SharedLruCache under concurrent access

use std::sync::Arc;
use std::thread;

use lrucache::SharedLruCache;

#[test]
fn test_concurrent_capacity_bound() {
    let cache = Arc::new(SharedLruCache::new(64));
    let threads = 8;
    let gets_per_thread = 2_000u64;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..gets_per_thread {
                    let key = (i * 7 + t) % 200;
                    if cache.get(&key).is_none() {
                        cache.put(key, key * 2);
                    }
                    assert!(cache.len() <= 64);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.hits() + stats.misses(), threads * gets_per_thread);
    assert!(cache.len() <= 64);
    for (key, value) in cache.snapshot() {
        assert_eq!(value, key * 2);
    }
}

#[test]
fn test_concurrent_loader_agrees_on_one_value_per_key() {
    let cache = Arc::new(SharedLruCache::new(16));
    let loads = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let loads = Arc::clone(&loads);
            thread::spawn(move || {
                for key in 0..10u32 {
                    let value = cache.get_or_insert_with(key, || {
                        loads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                        format!("{}-{}", key, thread_id)
                    });
                    // Whichever loader stored first, every caller sees it
                    assert_eq!(Some(value), cache.peek(&key));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let loads = loads.load(std::sync::atomic::Ordering::SeqCst);
    assert!((10..=80).contains(&loads));
    assert_eq!(cache.stats().hits() + cache.stats().misses(), 80);
    assert_eq!(cache.stats().misses() as usize, loads);
    assert_eq!(cache.stats().inserts(), 10);
    assert_eq!(cache.len(), 10);
}

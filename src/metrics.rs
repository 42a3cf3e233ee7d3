/// Request counters shared between middleware and handlers
///
/// One `HitCounter` is created at startup and handed to whoever needs it;
/// clones share the same count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct HitCounter {
    hits: Arc<AtomicU64>,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one hit and return the new total
    pub fn increment(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_count() {
        let counter = HitCounter::new();
        let shared = counter.clone();

        counter.increment();
        shared.increment();

        assert_eq!(counter.get(), 2);
        counter.reset();
        assert_eq!(shared.get(), 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let counter = HitCounter::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.get(), 8000);
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Conversion counters
#[derive(Debug, Default)]
pub struct Metrics {
    conversion_time: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    remote_successes: AtomicU64,
    fallbacks: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_conversion(&self, duration: Duration) {
        self.conversion_time
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_success(&self) {
        self.remote_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn remote_successes(&self) -> u64 {
        self.remote_successes.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> String {
        format!(
            "Conversion Metrics:\n\
             Conversion Time: {}µs\n\
             Cache Hits: {}\n\
             Cache Misses: {}\n\
             Cache Hit Rate: {:.2}%\n\
             Remote Successes: {}\n\
             Fallbacks: {}",
            self.conversion_time.load(Ordering::Relaxed),
            self.cache_hits(),
            self.cache_misses(),
            self.cache_hit_rate() * 100.0,
            self.remote_successes(),
            self.fallbacks(),
        )
    }

    fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits() as f64;
        let misses = self.cache_misses() as f64;
        let total = hits + misses;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

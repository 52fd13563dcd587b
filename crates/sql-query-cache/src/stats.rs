//! Query cache statistics

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Point-in-time view of a scope's statistics
///
/// Serializes as `{"queryCount":..,"hitCount":..,"hitPercent":..}`, with
/// `hitPercent` omitted until at least one cacheable query was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCacheStatistics {
    /// Cacheable query attempts, hits and misses alike
    pub query_count: u64,
    /// Attempts answered from a pending or resolved entry
    pub hit_count: u64,
    /// `hit_count / query_count * 100`, present only when `query_count > 0`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_percent: Option<f64>,
}

/// Hit/attempt counters for one cache scope
///
/// Counters use sequentially consistent ordering: every hit is recorded after
/// its attempt, and [`snapshot`](Self::snapshot) reads hits before attempts,
/// so a snapshot never reports more hits than attempts.
#[derive(Debug, Default)]
pub struct StatisticsTracker {
    query_count: AtomicU64,
    hit_count: AtomicU64,
}

impl StatisticsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cacheable query attempt
    pub fn record_attempt(&self) {
        self.query_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a cache hit
    pub fn record_hit(&self) {
        self.hit_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count.load(Ordering::SeqCst)
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn snapshot(&self) -> QueryCacheStatistics {
        let hit_count = self.hit_count();
        let query_count = self.query_count();

        let hit_percent =
            (query_count > 0).then(|| hit_count as f64 / query_count as f64 * 100.0);

        QueryCacheStatistics {
            query_count,
            hit_count,
            hit_percent,
        }
    }
}

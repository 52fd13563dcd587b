//! Cache scope: the store and statistics of one enabled cache

use crate::key::QueryLabel;
use crate::stats::{QueryCacheStatistics, StatisticsTracker};
use crate::store::{SlotState, SlotStore};

/// State created when caching is enabled and dropped when it is disabled
///
/// A scope is bound to whatever owns it through a [`ScopeHandle`]: a
/// transaction, a request, or the whole process. Nothing in a scope is ever
/// evicted; dropping the scope releases every entry at once.
///
/// [`ScopeHandle`]: crate::ScopeHandle
pub struct CacheScope<T, E> {
    store: SlotStore<T, E>,
    stats: StatisticsTracker,
    log_query_text: bool,
}

impl<T, E> std::fmt::Debug for CacheScope<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheScope")
            .field("store", &self.store)
            .field("stats", &self.stats)
            .field("log_query_text", &self.log_query_text)
            .finish()
    }
}

impl<T, E> CacheScope<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: SlotStore::new(),
            stats: StatisticsTracker::new(),
            log_query_text: false,
        }
    }

    /// Log literal query text instead of fingerprints
    #[must_use]
    pub const fn with_query_text_logging(mut self, enabled: bool) -> Self {
        self.log_query_text = enabled;
        self
    }

    pub fn statistics(&self) -> QueryCacheStatistics {
        self.stats.snapshot()
    }

    /// Number of pending and resolved entries
    pub fn entry_count(&self) -> usize {
        self.store.len()
    }

    /// State of the entry stored under `sql`, if any
    pub fn slot_state(&self, sql: &str) -> Option<SlotState> {
        self.store.state(sql)
    }

    pub(crate) const fn store(&self) -> &SlotStore<T, E> {
        &self.store
    }

    pub(crate) const fn stats(&self) -> &StatisticsTracker {
        &self.stats
    }

    pub(crate) const fn label<'a>(&self, sql: &'a str) -> QueryLabel<'a> {
        QueryLabel::new(sql, self.log_query_text)
    }
}

impl<T, E> Default for CacheScope<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_scope_is_empty() {
        let scope: CacheScope<u32, String> = CacheScope::new();

        assert_eq!(scope.entry_count(), 0);
        assert_eq!(scope.slot_state("SELECT 1"), None);

        let stats = scope.statistics();
        assert_eq!(stats.query_count, 0);
        assert_eq!(stats.hit_count, 0);
        assert!(stats.hit_percent.is_none());
    }

    #[test]
    fn test_label_follows_logging_flag() {
        let hidden: CacheScope<u32, String> = CacheScope::new();
        let shown: CacheScope<u32, String> = CacheScope::new().with_query_text_logging(true);

        assert_ne!(hidden.label("SELECT 1").to_string(), "SELECT 1");
        assert_eq!(shown.label("SELECT 1").to_string(), "SELECT 1");
    }

    #[test]
    fn test_debug_impl() {
        let scope: CacheScope<u32, String> = CacheScope::default();
        let debug_str = format!("{scope:?}");

        assert!(debug_str.contains("CacheScope"));
        assert!(debug_str.contains("entry_count"));
        assert!(debug_str.contains("log_query_text"));
    }
}

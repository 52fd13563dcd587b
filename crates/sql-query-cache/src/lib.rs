//! Single-flight result cache for read-only SQL queries
//!
//! Sits in front of a query executor and serves repeated `SELECT` statements
//! from memory for the lifetime of a cache scope.
//!
//! # Behavior
//!
//! - Only statements whose text starts with the literal `SELECT` are cached.
//!   Keys are the exact query text.
//! - Concurrent identical queries share one execution. Every waiter sees the
//!   same result or the same error.
//! - A successful result is cloned once when it is stored. Hits hand out
//!   their own copies, so mutating a returned value never changes what later
//!   callers see. `T::clone` must therefore be a deep copy.
//! - Failed executions are not cached; the next identical query runs again.
//! - Nothing is evicted. A scope grows until it is disabled or dropped.
//!
//! # Scopes
//!
//! A [`CacheScope`] holds the entries and statistics. It is bound to a
//! [`ScopeHandle`]: implement the trait on a transaction to cache per unit
//! of work, or keep a [`QueryCache`] in a `static` for a process-wide cache.
//!
//! ```
//! use sql_query_cache::{QueryCache, query_cache_statistics};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct DbError(String);
//!
//! impl From<sql_query_cache::Error> for DbError {
//!     fn from(err: sql_query_cache::Error) -> Self {
//!         Self(err.to_string())
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: QueryCache<Vec<i64>, DbError> = QueryCache::new();
//! cache.enable();
//!
//! let first = cache.query("SELECT id FROM users", || async { Ok(vec![1, 2]) }).await;
//! let second = cache.query("SELECT id FROM users", || async { Ok(vec![3]) }).await;
//! assert_eq!(first, second);
//!
//! let stats = query_cache_statistics(&cache).unwrap();
//! assert_eq!(stats.hit_percent, Some(50.0));
//! # }
//! ```

mod completion;
pub mod config;
mod controller;
mod error;
mod gate;
mod key;
pub mod observability;
mod scope;
mod stats;
mod store;

pub use completion::{Completion, from_callback};
pub use config::{ObservabilityConfig, QueryCacheConfig, load_config, load_config_from_path};
pub use controller::{
    QueryCache, ScopeHandle, disable_query_cache, enable_query_cache, query_cache_statistics,
};
pub use error::{Error, Result};
pub use gate::{query_cache, query_cache_with_callback};
pub use key::{CACHEABLE_PREFIX, fingerprint, is_cacheable};
pub use scope::CacheScope;
pub use stats::{QueryCacheStatistics, StatisticsTracker};
pub use store::{QueryFuture, SlotState};

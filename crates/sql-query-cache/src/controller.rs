//! Cache lifecycle: binding scopes to units of work or to the process

use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::completion::Completion;
use crate::config::QueryCacheConfig;
use crate::error::Error;
use crate::gate::{query_cache, query_cache_with_callback};
use crate::scope::CacheScope;
use crate::stats::QueryCacheStatistics;
use crate::store::{QueryFuture, SlotState};

/// Owner of the current cache scope
///
/// Implement this on a transaction or request type to scope caching to that
/// unit of work. [`QueryCache`] is the ready-made implementation; keep one in
/// a `static` for a process-wide cache.
pub trait ScopeHandle<T, E> {
    /// The enabled scope, or `None` when caching is disabled
    fn get_scope(&self) -> Option<Arc<CacheScope<T, E>>>;

    /// Replace the current scope
    fn set_scope(&self, scope: Option<Arc<CacheScope<T, E>>>);

    /// Fresh scope to bind on enable
    fn new_scope(&self) -> CacheScope<T, E> {
        CacheScope::new()
    }
}

impl<T, E, H: ScopeHandle<T, E> + ?Sized> ScopeHandle<T, E> for Arc<H> {
    fn get_scope(&self) -> Option<Arc<CacheScope<T, E>>> {
        (**self).get_scope()
    }

    fn set_scope(&self, scope: Option<Arc<CacheScope<T, E>>>) {
        (**self).set_scope(scope);
    }

    fn new_scope(&self) -> CacheScope<T, E> {
        (**self).new_scope()
    }
}

/// Bind a fresh, empty scope with zeroed statistics to `handle`
///
/// The scope comes from [`ScopeHandle::new_scope`]. A previously enabled
/// scope is replaced along with its entries and statistics.
pub fn enable_query_cache<T, E, H>(handle: &H) -> Arc<CacheScope<T, E>>
where
    H: ScopeHandle<T, E> + ?Sized,
{
    let scope = Arc::new(handle.new_scope());
    let replaced = handle.get_scope().is_some();

    handle.set_scope(Some(Arc::clone(&scope)));
    tracing::debug!(cache.operation = "enable", cache.replaced = replaced);

    scope
}

/// Drop the scope bound to `handle`; later queries bypass the cache
pub fn disable_query_cache<T, E, H>(handle: &H)
where
    H: ScopeHandle<T, E> + ?Sized,
{
    if handle.get_scope().is_some() {
        tracing::debug!(cache.operation = "disable");
    }
    handle.set_scope(None);
}

/// Statistics of the scope bound to `handle`, `None` when caching is disabled
pub fn query_cache_statistics<T, E, H>(handle: &H) -> Option<QueryCacheStatistics>
where
    H: ScopeHandle<T, E> + ?Sized,
{
    handle.get_scope().map(|scope| scope.statistics())
}

/// Swappable cache scope holder
///
/// Usable as a process-wide singleton:
///
/// ```
/// use std::sync::LazyLock;
///
/// use sql_query_cache::QueryCache;
///
/// #[derive(Debug, Clone)]
/// struct DbError(String);
///
/// impl From<sql_query_cache::Error> for DbError {
///     fn from(err: sql_query_cache::Error) -> Self {
///         Self(err.to_string())
///     }
/// }
///
/// static QUERY_CACHE: LazyLock<QueryCache<Vec<String>, DbError>> = LazyLock::new(QueryCache::new);
///
/// QUERY_CACHE.enable();
/// assert!(QUERY_CACHE.is_enabled());
/// QUERY_CACHE.disable();
/// assert!(QUERY_CACHE.statistics().is_none());
/// ```
///
/// or embedded in a unit of work that creates and drops it.
pub struct QueryCache<T, E> {
    current: ArcSwapOption<CacheScope<T, E>>,
    log_query_text: bool,
}

impl<T, E> std::fmt::Debug for QueryCache<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("enabled", &self.current.load().is_some())
            .field("log_query_text", &self.log_query_text)
            .finish()
    }
}

impl<T, E> Default for QueryCache<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> QueryCache<T, E> {
    /// Disabled cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
            log_query_text: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.current.load().is_some()
    }
}

impl<T, E> QueryCache<T, E> {
    /// Cache configured from `config`, enabled immediately if `config.enabled`
    #[must_use]
    pub fn from_config(config: &QueryCacheConfig) -> Self {
        let cache = Self {
            current: ArcSwapOption::empty(),
            log_query_text: config.log_query_text,
        };

        if config.enabled {
            cache.enable();
        }

        cache
    }

    /// Start a fresh scope, discarding any previous one
    pub fn enable(&self) -> Arc<CacheScope<T, E>> {
        enable_query_cache(self)
    }

    pub fn disable(&self) {
        disable_query_cache(self);
    }

    pub fn statistics(&self) -> Option<QueryCacheStatistics> {
        query_cache_statistics(self)
    }

    /// Entry count of the current scope, `None` when disabled
    pub fn entry_count(&self) -> Option<usize> {
        self.current.load().as_ref().map(|scope| scope.entry_count())
    }

    /// State of the entry for `sql` in the current scope
    pub fn slot_state(&self, sql: &str) -> Option<SlotState> {
        self.current
            .load()
            .as_ref()
            .and_then(|scope| scope.slot_state(sql))
    }
}

impl<T, E> QueryCache<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<Error> + 'static,
{
    /// See [`query_cache`]
    pub fn query<F, Fut>(&self, sql: &str, run: F) -> QueryFuture<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        query_cache(self, sql, run)
    }

    /// See [`query_cache_with_callback`]
    pub fn query_with_callback<F>(&self, sql: &str, run: F) -> QueryFuture<T, E>
    where
        F: FnOnce(Completion<T, E>),
    {
        query_cache_with_callback(self, sql, run)
    }
}

impl<T, E> ScopeHandle<T, E> for QueryCache<T, E> {
    fn get_scope(&self) -> Option<Arc<CacheScope<T, E>>> {
        self.current.load_full()
    }

    fn set_scope(&self, scope: Option<Arc<CacheScope<T, E>>>) {
        self.current.store(scope);
    }

    fn new_scope(&self) -> CacheScope<T, E> {
        CacheScope::new().with_query_text_logging(self.log_query_text)
    }
}

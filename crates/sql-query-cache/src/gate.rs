//! Query gate: routes each statement through the cache or straight to the executor

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::oneshot;

use crate::completion::{Completion, from_callback};
use crate::controller::ScopeHandle;
use crate::error::Error;
use crate::key::is_cacheable;
use crate::scope::CacheScope;
use crate::store::{Lookup, PendingResult, QueryFuture};

/// Run `sql` through the cache bound to `handle`
///
/// With no enabled scope, or for statements that do not start with `SELECT`,
/// `run` is invoked once and its outcome is returned as is; statistics are
/// left untouched. Otherwise the attempt is counted and:
///
/// - a pending execution of the same text is shared (counted as a hit);
/// - a resolved entry is returned as a fresh, already completed future
///   (counted as a hit);
/// - on a miss `run` is invoked and its future is spawned on the tokio
///   runtime. A clone of a successful result is stored before any caller
///   observes it. A failure is passed to every waiting caller and leaves no
///   entry behind, so the next call executes again.
///
/// The lookup happens when this function is called, not when the returned
/// future is first polled. Dropping the returned future does not cancel a
/// spawned execution.
///
/// Outside a tokio runtime a miss is executed by the returned future itself.
/// Dropping that future before it completes discards the pending entry, and
/// callers sharing it receive [`Error::ExecutionAborted`].
pub fn query_cache<T, E, H, F, Fut>(handle: &H, sql: &str, run: F) -> QueryFuture<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<Error> + 'static,
    H: ScopeHandle<T, E> + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    match handle.get_scope() {
        Some(scope) if is_cacheable(sql) => execute_cached(&scope, sql, run),
        scope => {
            tracing::debug!(
                cache.result = "bypass",
                cache.enabled = scope.is_some(),
            );
            #[cfg(feature = "metrics")]
            crate::observability::record_query("bypass");

            run().boxed()
        }
    }
}

/// [`query_cache`] for executors that report through a completion callback
///
/// `run` receives a [`Completion`] and must call it exactly once, either
/// synchronously or later from another task. A dropped completion surfaces
/// as [`Error::CompletionDropped`].
pub fn query_cache_with_callback<T, E, H, F>(handle: &H, sql: &str, run: F) -> QueryFuture<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<Error> + 'static,
    H: ScopeHandle<T, E> + ?Sized,
    F: FnOnce(Completion<T, E>),
{
    query_cache(handle, sql, move || from_callback(run))
}

fn execute_cached<T, E, F, Fut>(scope: &Arc<CacheScope<T, E>>, sql: &str, run: F) -> QueryFuture<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<Error> + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    scope.stats().record_attempt();

    let (sender, receiver) = oneshot::channel();
    let lookup = scope
        .store()
        .lookup_or_insert_with(sql, move || pending_result(receiver));

    match lookup {
        Lookup::Pending(pending) => {
            scope.stats().record_hit();
            tracing::debug!(cache.result = "pending", cache.query = %scope.label(sql));
            #[cfg(feature = "metrics")]
            crate::observability::record_query("hit");

            pending.boxed()
        }
        Lookup::Resolved(value) => {
            scope.stats().record_hit();
            tracing::debug!(cache.result = "hit", cache.query = %scope.label(sql));
            #[cfg(feature = "metrics")]
            crate::observability::record_query("hit");

            futures::future::ready(Ok(T::clone(&value))).boxed()
        }
        Lookup::Inserted(pending) => {
            tracing::debug!(cache.result = "miss", cache.query = %scope.label(sql));
            #[cfg(feature = "metrics")]
            {
                crate::observability::record_query("miss");
                crate::observability::set_entry_count(scope.entry_count());
            }

            // Armed before `run` so a panicking executor cannot strand the slot.
            let guard = PendingGuard::new(Arc::clone(scope), sql);
            let execution = complete_execution(guard, run(), sender);

            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(execution);
                pending.boxed()
            } else {
                execution.then(move |()| pending).boxed()
            }
        }
    }
}

fn pending_result<T, E>(receiver: oneshot::Receiver<Result<T, E>>) -> PendingResult<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<Error> + 'static,
{
    async move {
        receiver
            .await
            .unwrap_or_else(|_| Err(Error::ExecutionAborted.into()))
    }
    .boxed()
    .shared()
}

async fn complete_execution<T, E, Fut>(
    guard: PendingGuard<T, E>,
    execution: Fut,
    sender: oneshot::Sender<Result<T, E>>,
) where
    T: Clone,
    Fut: Future<Output = Result<T, E>>,
{
    let result = execution.await;

    if let Ok(value) = &result {
        guard.resolve(value.clone());
    } else {
        tracing::warn!(cache.result = "error", cache.query = %guard.label());
        #[cfg(feature = "metrics")]
        crate::observability::record_execution_error();
        drop(guard);
    }

    // Every caller may have gone away; the result is cached regardless.
    let _ = sender.send(result);
}

/// Removes a pending slot unless its execution resolved it
struct PendingGuard<T, E> {
    scope: Arc<CacheScope<T, E>>,
    key: String,
    armed: bool,
}

impl<T, E> PendingGuard<T, E> {
    fn new(scope: Arc<CacheScope<T, E>>, key: &str) -> Self {
        Self {
            scope,
            key: key.to_owned(),
            armed: true,
        }
    }

    fn label(&self) -> String {
        self.scope.label(&self.key).to_string()
    }

    fn resolve(mut self, value: T) {
        self.scope.store().resolve(&self.key, value);
        self.armed = false;
        tracing::debug!(cache.operation = "resolve", cache.query = %self.scope.label(&self.key));
    }
}

impl<T, E> Drop for PendingGuard<T, E> {
    fn drop(&mut self) {
        if self.armed && self.scope.store().discard_pending(&self.key) {
            tracing::debug!(cache.operation = "discard", cache.query = %self.scope.label(&self.key));
            #[cfg(feature = "metrics")]
            crate::observability::set_entry_count(self.scope.entry_count());
        }
    }
}

//! Slot store holding pending executions and resolved results

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

/// Future returned to callers of the query gate
pub type QueryFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// In-flight execution shared by every caller of the same key
pub(crate) type PendingResult<T, E> = Shared<QueryFuture<T, E>>;

/// A single cache entry
///
/// A slot starts out `Pending` when the first caller misses and turns into
/// `Resolved` exactly once, when the execution succeeds. Failed executions
/// remove the slot instead.
pub(crate) enum CacheSlot<T, E> {
    Pending(PendingResult<T, E>),
    Resolved(Arc<T>),
}

/// Observable state of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Resolved,
}

impl<T, E> CacheSlot<T, E> {
    const fn state(&self) -> SlotState {
        match self {
            Self::Pending(_) => SlotState::Pending,
            Self::Resolved(_) => SlotState::Resolved,
        }
    }
}

/// Outcome of [`SlotStore::lookup_or_insert_with`]
pub(crate) enum Lookup<T, E> {
    /// Another caller is executing this key
    Pending(PendingResult<T, E>),
    /// The stored result; callers copy it after the lock is released
    Resolved(Arc<T>),
    /// No slot existed; the freshly created pending execution was stored
    Inserted(PendingResult<T, E>),
}

/// Key space shared by pending and resolved entries
///
/// Keys are compared by exact string equality. There is no eviction: entries
/// live as long as the store.
pub(crate) struct SlotStore<T, E> {
    slots: Mutex<HashMap<String, CacheSlot<T, E>>>,
}

impl<T, E> std::fmt::Debug for SlotStore<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotStore")
            .field("entry_count", &self.slots.lock().len())
            .finish_non_exhaustive()
    }
}

impl<T, E> SlotStore<T, E> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `key`, creating a pending slot with `make_pending` on a miss
    ///
    /// The check and the insert happen under one lock, so at most one
    /// execution is started per key while it is outstanding. `make_pending`
    /// runs with the lock held and must not touch this store.
    pub(crate) fn lookup_or_insert_with<F>(&self, key: &str, make_pending: F) -> Lookup<T, E>
    where
        F: FnOnce() -> PendingResult<T, E>,
    {
        let mut slots = self.slots.lock();

        match slots.get(key) {
            Some(CacheSlot::Pending(pending)) => Lookup::Pending(pending.clone()),
            Some(CacheSlot::Resolved(value)) => Lookup::Resolved(Arc::clone(value)),
            None => {
                let pending = make_pending();
                slots.insert(key.to_owned(), CacheSlot::Pending(pending.clone()));
                Lookup::Inserted(pending)
            }
        }
    }

    /// Replace the slot for `key` with a resolved value
    pub(crate) fn resolve(&self, key: &str, value: T) {
        self.slots
            .lock()
            .insert(key.to_owned(), CacheSlot::Resolved(Arc::new(value)));
    }

    /// Remove the slot for `key` if it is still pending
    pub(crate) fn discard_pending(&self, key: &str) -> bool {
        let mut slots = self.slots.lock();

        if matches!(slots.get(key), Some(CacheSlot::Pending(_))) {
            slots.remove(key);
            true
        } else {
            false
        }
    }

    pub(crate) fn state(&self, key: &str) -> Option<SlotState> {
        self.slots.lock().get(key).map(CacheSlot::state)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

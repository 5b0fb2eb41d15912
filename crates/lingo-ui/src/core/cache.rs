//! Server-state cache keyed by logical query identity.
//!
//! # Design
//! - `read` fetches at most once per key until the entry is invalidated;
//!   concurrent reads of an in-flight key observe its status instead of
//!   starting a second fetch.
//! - `invalidate` marks an entry stale but keeps its last value visible.
//!   A fetch that settles after an invalidation is stale on arrival, whether
//!   it succeeded or failed.
//! - `clear` drops everything and bumps an epoch so fetches that started
//!   before the clear cannot repopulate the cache when they land.
//! - Values are stored type-erased and cloned out on snapshot.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use crate::core::error::RequestError;

/// Cache key for the authenticated user's identity.
pub const SESSION_KEY: &str = "current-user";

/// Cache key invalidated after translate calls.
pub const TRANSLATIONS_KEY: &str = "translations";

/// Fetch status of one cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never read since creation or the last clear.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The last fetch succeeded.
    Succeeded,
    /// The last fetch failed.
    Failed,
}

/// Point-in-time view of one cache entry.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot<T> {
    /// Fetch status.
    pub status: QueryStatus,
    /// Last successfully fetched value, possibly stale.
    pub value: Option<T>,
    /// Failure captured by the last fetch.
    pub error: Option<RequestError>,
    /// Whether the value was invalidated since it was fetched.
    pub stale: bool,
}

impl<T> QuerySnapshot<T> {
    const fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            stale: false,
        }
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_fetching(&self) -> bool {
        matches!(self.status, QueryStatus::Fetching)
    }
}

struct CacheEntry {
    value: Option<Rc<dyn Any>>,
    status: QueryStatus,
    error: Option<RequestError>,
    stale: bool,
    fetch_id: u64,
    invalidations: u64,
}

impl CacheEntry {
    const fn empty() -> Self {
        Self {
            value: None,
            status: QueryStatus::Idle,
            error: None,
            stale: false,
            fetch_id: 0,
            invalidations: 0,
        }
    }

    const fn needs_fetch(&self) -> bool {
        match self.status {
            QueryStatus::Idle | QueryStatus::Failed => true,
            QueryStatus::Fetching => false,
            QueryStatus::Succeeded => self.stale,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct FetchTicket {
    fetch_id: u64,
    epoch: u64,
    invalidations: u64,
}

/// Key-value store of server-derived read results.
#[derive(Default)]
pub struct SessionCache {
    entries: RefCell<HashMap<String, CacheEntry>>,
    next_fetch_id: Cell<u64>,
    epoch: Cell<u64>,
}

impl SessionCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `key`, invoking `fetcher` only when no fresh value is held.
    ///
    /// Returns the entry's snapshot once this read settles. When another read
    /// of `key` is already in flight, returns immediately with a
    /// [`QueryStatus::Fetching`] snapshot without invoking `fetcher`.
    pub async fn read<T, F, Fut>(&self, key: &str, fetcher: F) -> QuerySnapshot<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let Some(ticket) = self.begin_fetch(key) else {
            return self.snapshot(key);
        };
        let outcome = fetcher().await;
        self.finish_fetch(key, ticket, outcome);
        self.snapshot(key)
    }

    /// Current view of `key` without fetching.
    #[must_use]
    pub fn snapshot<T: Clone + 'static>(&self, key: &str) -> QuerySnapshot<T> {
        let entries = self.entries.borrow();
        let Some(entry) = entries.get(key) else {
            return QuerySnapshot::idle();
        };
        QuerySnapshot {
            status: entry.status,
            value: entry
                .value
                .as_ref()
                .and_then(|value| value.downcast_ref::<T>())
                .cloned(),
            error: entry.error.clone(),
            stale: entry.stale,
        }
    }

    /// Mark `key` stale so the next read refetches; the value stays visible.
    ///
    /// Returns whether an entry existed.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        entry.stale = true;
        entry.invalidations += 1;
        tracing::debug!(%key, "cache entry invalidated");
        true
    }

    /// Remove every value and status.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.epoch.set(self.epoch.get() + 1);
        tracing::debug!(epoch = self.epoch.get(), "cache cleared");
    }

    /// Whether an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn begin_fetch(&self, key: &str) -> Option<FetchTicket> {
        let mut entries = self.entries.borrow_mut();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(CacheEntry::empty);
        if !entry.needs_fetch() {
            return None;
        }
        let fetch_id = self.next_fetch_id.get() + 1;
        self.next_fetch_id.set(fetch_id);
        entry.status = QueryStatus::Fetching;
        entry.fetch_id = fetch_id;
        tracing::debug!(%key, fetch_id, "cache fetch started");
        Some(FetchTicket {
            fetch_id,
            epoch: self.epoch.get(),
            invalidations: entry.invalidations,
        })
    }

    fn finish_fetch<T: 'static>(
        &self,
        key: &str,
        ticket: FetchTicket,
        outcome: Result<T, RequestError>,
    ) {
        if ticket.epoch != self.epoch.get() {
            tracing::debug!(%key, "discarding fetch that predates a cache clear");
            return;
        }
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.fetch_id != ticket.fetch_id {
            return;
        }
        match outcome {
            Ok(value) => {
                entry.value = Some(Rc::new(value));
                entry.status = QueryStatus::Succeeded;
                entry.error = None;
                entry.stale = entry.invalidations != ticket.invalidations;
            }
            Err(err) => {
                entry.status = QueryStatus::Failed;
                entry.error = Some(err);
                // A failure that raced an invalidation says nothing about
                // the new credential.
                entry.stale = entry.invalidations != ticket.invalidations;
            }
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.entries.borrow();
        let mut keys: Vec<&String> = entries.keys().collect();
        keys.sort();
        formatter
            .debug_struct("SessionCache")
            .field("keys", &keys)
            .field("epoch", &self.epoch.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ApiError;
    use std::cell::Cell;
    use tokio::sync::oneshot;

    async fn counted(calls: &Cell<u32>, value: &str) -> Result<String, RequestError> {
        calls.set(calls.get() + 1);
        Ok(value.to_string())
    }

    #[tokio::test]
    async fn read_fetches_once_until_invalidated() {
        let cache = SessionCache::new();
        let calls = Cell::new(0);

        let first = cache.read(SESSION_KEY, || counted(&calls, "alice")).await;
        let second = cache.read(SESSION_KEY, || counted(&calls, "bob")).await;

        assert_eq!(calls.get(), 1);
        assert_eq!(first.value.as_deref(), Some("alice"));
        assert_eq!(second.value.as_deref(), Some("alice"));
        assert_eq!(second.status, QueryStatus::Succeeded);
    }

    #[tokio::test]
    async fn invalidate_keeps_value_and_forces_refetch() {
        let cache = SessionCache::new();
        let calls = Cell::new(0);
        cache.read(SESSION_KEY, || counted(&calls, "alice")).await;

        assert!(cache.invalidate(SESSION_KEY));
        let stale: QuerySnapshot<String> = cache.snapshot(SESSION_KEY);
        assert!(stale.stale);
        assert_eq!(stale.value.as_deref(), Some("alice"));

        let refreshed = cache.read(SESSION_KEY, || counted(&calls, "bob")).await;
        assert_eq!(calls.get(), 2);
        assert_eq!(refreshed.value.as_deref(), Some("bob"));
        assert!(!refreshed.stale);
    }

    #[test]
    fn invalidating_a_missing_key_is_a_no_op() {
        let cache = SessionCache::new();
        assert!(!cache.invalidate(TRANSLATIONS_KEY));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_every_entry() {
        let cache = SessionCache::new();
        let calls = Cell::new(0);
        cache.read(SESSION_KEY, || counted(&calls, "alice")).await;
        cache.read(TRANSLATIONS_KEY, || counted(&calls, "x")).await;
        assert_eq!(cache.len(), 2);

        cache.clear();

        assert!(cache.is_empty());
        let snapshot: QuerySnapshot<String> = cache.snapshot(SESSION_KEY);
        assert_eq!(snapshot.status, QueryStatus::Idle);
        assert!(snapshot.value.is_none());
    }

    #[tokio::test]
    async fn failed_reads_record_the_error_and_retry_on_next_read() {
        let cache = SessionCache::new();
        let failed = cache
            .read(SESSION_KEY, || async {
                Err::<String, _>(RequestError::from(ApiError::from_response(401, "")))
            })
            .await;
        assert_eq!(failed.status, QueryStatus::Failed);
        assert!(failed.error.is_some());

        let calls = Cell::new(0);
        let retried = cache.read(SESSION_KEY, || counted(&calls, "alice")).await;
        assert_eq!(calls.get(), 1);
        assert_eq!(retried.status, QueryStatus::Succeeded);
        assert!(retried.error.is_none());
    }

    #[tokio::test]
    async fn in_flight_reads_are_shared() {
        let cache = SessionCache::new();
        let (release, gate) = oneshot::channel::<()>();
        let calls = Cell::new(0);

        let slow = cache.read(SESSION_KEY, || async {
            gate.await.ok();
            Ok::<_, RequestError>("alice".to_string())
        });
        let observe = async {
            tokio::task::yield_now().await;
            let snapshot = cache.read(SESSION_KEY, || counted(&calls, "bob")).await;
            assert!(snapshot.is_fetching());
            release.send(()).ok();
        };
        let (settled, ()) = tokio::join!(slow, observe);

        assert_eq!(calls.get(), 0);
        assert_eq!(settled.value.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn fetch_landing_after_clear_is_discarded() {
        let cache = SessionCache::new();
        let (release, gate) = oneshot::channel::<()>();

        let slow = cache.read(SESSION_KEY, || async {
            gate.await.ok();
            Ok::<_, RequestError>("previous-user".to_string())
        });
        let logout = async {
            tokio::task::yield_now().await;
            cache.clear();
            release.send(()).ok();
        };
        let (settled, ()) = tokio::join!(slow, logout);

        assert!(settled.value.is_none());
        assert_eq!(settled.status, QueryStatus::Idle);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidation_during_fetch_leaves_result_stale() {
        let cache = SessionCache::new();
        let (release, gate) = oneshot::channel::<()>();

        let slow = cache.read(SESSION_KEY, || async {
            gate.await.ok();
            Ok::<_, RequestError>("alice".to_string())
        });
        let login = async {
            tokio::task::yield_now().await;
            assert!(cache.invalidate(SESSION_KEY));
            release.send(()).ok();
        };
        let (settled, ()) = tokio::join!(slow, login);

        assert_eq!(settled.value.as_deref(), Some("alice"));
        assert!(settled.stale);
    }

    #[tokio::test]
    async fn failure_after_invalidation_is_stale_and_refetched() {
        let cache = SessionCache::new();
        let (release, gate) = oneshot::channel::<()>();

        let slow = cache.read(SESSION_KEY, || async {
            gate.await.ok();
            Err::<String, _>(RequestError::MissingCredential)
        });
        let login = async {
            tokio::task::yield_now().await;
            assert!(cache.invalidate(SESSION_KEY));
            release.send(()).ok();
        };
        let (settled, ()) = tokio::join!(slow, login);

        assert_eq!(settled.status, QueryStatus::Failed);
        assert!(settled.stale);

        let calls = Cell::new(0);
        let retried = cache.read(SESSION_KEY, || counted(&calls, "alice")).await;
        assert_eq!(calls.get(), 1);
        assert_eq!(retried.value.as_deref(), Some("alice"));
        assert!(!retried.stale);
    }

    #[test]
    fn snapshot_of_wrong_type_has_no_value() {
        let cache = SessionCache::new();
        let ticket = cache.begin_fetch("numbers").expect("first fetch");
        cache.finish_fetch("numbers", ticket, Ok::<u32, RequestError>(7));
        let snapshot: QuerySnapshot<String> = cache.snapshot("numbers");
        assert_eq!(snapshot.status, QueryStatus::Succeeded);
        assert!(snapshot.value.is_none());
    }
}

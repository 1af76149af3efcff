//! Keyed query cache with single-flight fetches.
//!
//! Each [`QueryKey`] has at most one entry holding the last fetched value, a
//! staleness marker, the last error and at most one in-flight fetch. Fetches
//! are shared futures driven by a spawned task, so every reader of a key
//! awaits the same remote call and the result is committed even when the
//! request that started it has gone away.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use super::invalidation::Mutation;
use super::keys::{KeyGroup, QueryData, QueryKey, QueryValue};
use crate::actor::{ActorError, FoodActor};

type FetchOutcome = Result<QueryValue, Arc<ActorError>>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// Result of a read, as seen by a page.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    /// Fetched value, the last known value, or `T::default()`.
    pub data: T,
    /// A fetch for this key is still running.
    pub loading: bool,
    /// The most recent fetch failed.
    pub error: Option<Arc<ActorError>>,
    /// The value came from the actor at least once.
    pub fetched: bool,
}

impl<T: Default> QueryState<T> {
    fn disabled() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            fetched: false,
        }
    }
}

impl<T> QueryState<T> {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

struct InFlight {
    id: u64,
    epoch: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct Entry {
    value: Option<QueryValue>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Bumped by every invalidation.
    epoch: u64,
    error: Option<Arc<ActorError>>,
    /// When the last fetch failed, and the epoch it started in.
    failed: Option<(Instant, u64)>,
    in_flight: Option<InFlight>,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.value.is_some()
            && !self.invalidated
            && self
                .updated_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }

    /// A failure with no invalidation since counts as the settled outcome
    /// until the freshness window passes.
    fn is_settled(&self, stale_time: Duration) -> bool {
        self.is_fresh(stale_time)
            || self
                .failed
                .is_some_and(|(at, epoch)| epoch == self.epoch && at.elapsed() < stale_time)
    }

    fn state<T: QueryData>(&self, loading: bool) -> QueryState<T> {
        let value = self.value.as_ref().and_then(T::from_value);
        QueryState {
            fetched: value.is_some(),
            data: value.unwrap_or_default(),
            loading,
            error: self.error.clone(),
        }
    }
}

/// Per-identity query cache.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    stale_time: Duration,
    next_fetch: AtomicU64,
}

impl ClientInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the outcome of fetch `id`, unless the entry was cleared or a
    /// newer fetch replaced it.
    fn commit(&self, key: &QueryKey, id: u64, outcome: &FetchOutcome) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        let started_epoch = match &entry.in_flight {
            Some(in_flight) if in_flight.id == id => in_flight.epoch,
            _ => return,
        };
        entry.in_flight = None;

        match outcome {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.updated_at = Some(Instant::now());
                entry.error = None;
                entry.failed = None;
                entry.invalidated = entry.epoch != started_epoch;
            }
            Err(error) => {
                tracing::warn!(%key, error = %error, "Query failed");
                entry.error = Some(Arc::clone(error));
                entry.failed = Some((Instant::now(), started_epoch));
            }
        }
    }
}

enum Lookup<T> {
    Fresh(QueryState<T>),
    Pending(SharedFetch, QueryState<T>),
}

impl QueryClient {
    #[must_use]
    pub fn new(stale_time: Duration) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                entries: Mutex::new(HashMap::new()),
                stale_time,
                next_fetch: AtomicU64::new(0),
            }),
        }
    }

    /// Read `key`, waiting for a fetch when the cached value is missing or
    /// stale.
    ///
    /// Without an actor the default value is returned, nothing is fetched and
    /// the cache is left alone. A failed fetch keeps the previous value and
    /// reports the error. Later reads get that same outcome without a new
    /// call until the key is invalidated or the freshness window passes.
    pub async fn query<T, F, Fut>(
        &self,
        actor: Option<Arc<dyn FoodActor>>,
        key: QueryKey,
        fetch: F,
    ) -> QueryState<T>
    where
        T: QueryData,
        F: FnOnce(Arc<dyn FoodActor>) -> Fut + Send,
        Fut: Future<Output = Result<T, ActorError>> + Send + 'static,
    {
        let Some(actor) = actor else {
            return QueryState::disabled();
        };

        let fetch = match self.lookup(&key, || fetch(actor)) {
            Lookup::Fresh(state) => return state,
            Lookup::Pending(fetch, _) => fetch,
        };

        match fetch.await {
            Ok(value) => {
                let data = T::from_value(&value);
                QueryState {
                    fetched: data.is_some(),
                    data: data.unwrap_or_default(),
                    loading: false,
                    error: None,
                }
            }
            Err(error) => {
                let mut state = self
                    .inner
                    .entries()
                    .get(&key)
                    .map_or_else(QueryState::disabled, |entry| entry.state::<T>(false));
                state.error = Some(error);
                state
            }
        }
    }

    /// Read `key` without waiting.
    ///
    /// Fresh values are returned directly. Otherwise a fetch is started (or
    /// joined) in the background and the last known value is reported with
    /// `loading` set.
    pub fn observe<T, F, Fut>(
        &self,
        actor: Option<Arc<dyn FoodActor>>,
        key: QueryKey,
        fetch: F,
    ) -> QueryState<T>
    where
        T: QueryData,
        F: FnOnce(Arc<dyn FoodActor>) -> Fut,
        Fut: Future<Output = Result<T, ActorError>> + Send + 'static,
    {
        let Some(actor) = actor else {
            return QueryState::disabled();
        };

        match self.lookup(&key, || fetch(actor)) {
            Lookup::Fresh(state) | Lookup::Pending(_, state) => state,
        }
    }

    /// Run one mutation and, on success, invalidate its declared groups.
    ///
    /// # Errors
    ///
    /// Returns [`ActorError::Unavailable`] without calling anything when no
    /// actor is available, or the actor's error. Failures leave the cache
    /// untouched.
    pub async fn mutate<R, F, Fut>(
        &self,
        actor: Option<Arc<dyn FoodActor>>,
        mutation: Mutation,
        call: F,
    ) -> Result<R, ActorError>
    where
        F: FnOnce(Arc<dyn FoodActor>) -> Fut + Send,
        Fut: Future<Output = Result<R, ActorError>> + Send,
    {
        let actor = actor.ok_or(ActorError::Unavailable)?;

        match call(actor).await {
            Ok(result) => {
                self.invalidate(mutation.invalidates());
                tracing::debug!(method = mutation.method(), "Mutation succeeded");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(method = mutation.method(), error = %e, "Mutation failed");
                Err(e)
            }
        }
    }

    /// Mark every entry in `groups` stale.
    ///
    /// A fetch already in flight for such an entry still completes, but its
    /// result is stored as stale.
    pub fn invalidate(&self, groups: &[KeyGroup]) {
        let mut entries = self.inner.entries();
        for (key, entry) in entries.iter_mut() {
            if groups.contains(&key.group()) {
                entry.invalidated = true;
                entry.epoch += 1;
                tracing::trace!(%key, "Invalidated");
            }
        }
    }

    /// Last known value of `key`, fresh or not.
    #[must_use]
    pub fn peek<T: QueryData>(&self, key: &QueryKey) -> Option<T> {
        self.inner
            .entries()
            .get(key)
            .and_then(|entry| entry.value.as_ref())
            .and_then(T::from_value)
    }

    /// Whether `key` must be refetched before its next use.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner
            .entries()
            .get(key)
            .is_none_or(|entry| !entry.is_settled(self.inner.stale_time))
    }

    /// Whether a fetch for `key` is running.
    #[must_use]
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner
            .entries()
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    /// Drop every entry. Fetches still running are discarded when they finish.
    pub fn clear(&self) {
        self.inner.entries().clear();
    }

    /// Fresh value, or the fetch to wait on (joining one already running).
    fn lookup<T, Fut>(&self, key: &QueryKey, start: impl FnOnce() -> Fut) -> Lookup<T>
    where
        T: QueryData,
        Fut: Future<Output = Result<T, ActorError>> + Send + 'static,
    {
        let mut entries = self.inner.entries();
        let entry = entries.entry(key.clone()).or_default();

        if entry.is_settled(self.inner.stale_time) {
            return Lookup::Fresh(entry.state(false));
        }

        if let Some(in_flight) = &entry.in_flight {
            tracing::trace!(%key, "Joining in-flight fetch");
            return Lookup::Pending(in_flight.fetch.clone(), entry.state(true));
        }

        let id = self.inner.next_fetch.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let owned_key = key.clone();
        let future = start();
        let fetch = async move {
            let outcome = future.await.map(QueryData::into_value).map_err(Arc::new);
            inner.commit(&owned_key, id, &outcome);
            outcome
        }
        .boxed()
        .shared();

        entry.in_flight = Some(InFlight {
            id,
            epoch: entry.epoch,
            fetch: fetch.clone(),
        });
        tokio::spawn(fetch.clone());
        tracing::trace!(%key, id, "Started fetch");

        Lookup::Pending(fetch, entry.state(true))
    }
}

use std::{
    fmt,
    future::Future,
    mem,
    sync::Arc,
    time::{Duration, Instant},
};

use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::Error;

/// Logical resources the store exposes to queries
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKey {
    Comments,
    CurrentUser,
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKey::Comments => "comments",
            ResourceKey::CurrentUser => "currentUser",
        })
    }
}

/// What observers of a query get to see
#[derive(Debug)]
pub enum QueryState<T> {
    Loading,
    Ready(Arc<T>),
    /// The first load failed, and no value was ever available
    Failed(Arc<Error>),
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Loading => QueryState::Loading,
            QueryState::Ready(v) => QueryState::Ready(v.clone()),
            QueryState::Failed(e) => QueryState::Failed(e.clone()),
        }
    }
}

impl<T> QueryState<T> {
    pub fn ready(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Ready(v) => Some(v),
            _ => None,
        }
    }
}

type Fetch<T> = Shared<BoxFuture<'static, Result<Arc<T>, Arc<Error>>>>;

enum Slot<T> {
    Empty,
    Fresh {
        value: Arc<T>,
        fetched_at: Instant,
    },
    Stale(Arc<T>),
    InFlight {
        fetch: Fetch<T>,
        generation: u64,
        previous: Option<Arc<T>>,
    },
    Failed(Arc<Error>),
}

impl<T> Slot<T> {
    fn value(&self) -> Option<Arc<T>> {
        match self {
            Slot::Fresh { value, .. } | Slot::Stale(value) => Some(value.clone()),
            Slot::InFlight { previous, .. } => previous.clone(),
            Slot::Empty | Slot::Failed(_) => None,
        }
    }
}

struct Inner<T> {
    slot: Slot<T>,
    generation: u64,
}

/// Cache entry for one resource key.
///
/// At most one fetch is outstanding at any time: callers arriving while a
/// fetch is in flight await that same fetch.
pub struct Query<T> {
    key: ResourceKey,
    max_age: Option<Duration>,
    inner: Mutex<Inner<T>>,
    state: watch::Sender<QueryState<T>>,
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new(key: ResourceKey, max_age: Option<Duration>) -> Query<T> {
        let (state, _) = watch::channel(QueryState::Loading);
        Query {
            key,
            max_age,
            inner: Mutex::new(Inner {
                slot: Slot::Empty,
                generation: 0,
            }),
            state,
        }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Last known value, fresh or not
    pub fn cached(&self) -> Option<Arc<T>> {
        self.inner.lock().slot.value()
    }

    pub fn is_fresh(&self) -> bool {
        match &self.inner.lock().slot {
            Slot::Fresh { fetched_at, .. } => !self.expired(*fetched_at),
            _ => false,
        }
    }

    fn expired(&self, fetched_at: Instant) -> bool {
        self.max_age
            .map_or(false, |max_age| fetched_at.elapsed() >= max_age)
    }

    /// Returns the fresh cached value, or joins the in-flight fetch, or
    /// starts a new fetch with `fetch`
    pub async fn get<F, Fut>(&self, fetch: F) -> Result<Arc<T>, Arc<Error>>
    where
        F: Send + FnOnce() -> Fut,
        Fut: 'static + Send + Future<Output = Result<T, Error>>,
    {
        let (fetch, generation) = {
            let mut inner = self.inner.lock();
            if let Slot::Fresh { value, fetched_at } = &inner.slot {
                if !self.expired(*fetched_at) {
                    tracing::trace!(key = %self.key, "serving from cache");
                    return Ok(value.clone());
                }
            }
            if let Slot::InFlight {
                fetch, generation, ..
            } = &inner.slot
            {
                tracing::debug!(key = %self.key, "joining in-flight fetch");
                (fetch.clone(), *generation)
            } else {
                let previous = inner.slot.value();
                inner.generation += 1;
                let generation = inner.generation;
                tracing::debug!(key = %self.key, generation, "starting fetch");
                let fetch = fetch()
                    .map(|res| res.map(Arc::new).map_err(Arc::new))
                    .boxed()
                    .shared();
                if previous.is_none() {
                    self.state.send_replace(QueryState::Loading);
                }
                inner.slot = Slot::InFlight {
                    fetch: fetch.clone(),
                    generation,
                    previous,
                };
                (fetch, generation)
            }
        };
        let res = fetch.await;
        self.settle(generation, &res);
        res
    }

    fn settle(&self, generation: u64, res: &Result<Arc<T>, Arc<Error>>) {
        let mut inner = self.inner.lock();
        let previous = match &inner.slot {
            Slot::InFlight {
                generation: g,
                previous,
                ..
            } if *g == generation => previous.clone(),
            // superseded by an invalidation, or already settled by another caller
            _ => return,
        };
        match (res, previous) {
            (Ok(value), _) => {
                tracing::debug!(key = %self.key, generation, "fetch succeeded");
                inner.slot = Slot::Fresh {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                };
                self.state.send_replace(QueryState::Ready(value.clone()));
            }
            (Err(err), Some(previous)) => {
                tracing::warn!(key = %self.key, %err, "refetch failed, keeping last good value");
                inner.slot = Slot::Stale(previous);
            }
            (Err(err), None) => {
                tracing::warn!(key = %self.key, %err, "fetch failed");
                inner.slot = Slot::Failed(err.clone());
                self.state.send_replace(QueryState::Failed(err.clone()));
            }
        }
    }

    /// Marks the cached value stale, so that the next `get` refetches.
    ///
    /// A fetch in flight at that point will not be cached when it completes.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock();
        tracing::debug!(key = %self.key, "invalidating");
        inner.slot = match mem::replace(&mut inner.slot, Slot::Empty) {
            Slot::Fresh { value, .. } | Slot::Stale(value) => Slot::Stale(value),
            Slot::InFlight {
                previous: Some(previous),
                ..
            } => Slot::Stale(previous),
            Slot::InFlight { previous: None, .. } | Slot::Empty | Slot::Failed(_) => Slot::Empty,
        };
    }
}

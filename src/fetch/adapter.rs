//! Generic asynchronous section loader
//!
//! A [`SectionLoad`] wraps one remote query and exposes its progress as a
//! [`FetchState`]: `loading`, `data`, `error`. State moves strictly from
//! `loading=true` to a single settled state carrying either data or an
//! error, never both and never a partial value in between.
//!
//! The load lives as long as the page render that created it. Dropping it
//! is the unmount: the query keeps running to completion, but its result is
//! discarded instead of published.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::cms::CmsError;

/// The shape a query result takes when nothing was loaded.
///
/// Implemented for `Vec<T>` (list queries, empty list) and `Option<T>`
/// (singleton queries, `None`).
pub trait Shape: Clone + Send + Sync + 'static {
    fn empty() -> Self;
    fn is_empty(&self) -> bool;
}

impl<T: Clone + Send + Sync + 'static> Shape for Vec<T> {
    fn empty() -> Self {
        Vec::new()
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T: Clone + Send + Sync + 'static> Shape for Option<T> {
    fn empty() -> Self {
        None
    }

    fn is_empty(&self) -> bool {
        self.is_none()
    }
}

/// A failed fetch, normalised to a displayable message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl From<CmsError> for FetchError {
    fn from(err: CmsError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// The tri-state result of a section load
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub loading: bool,
    pub data: T,
    pub error: Option<FetchError>,
}

impl<T: Shape> FetchState<T> {
    /// Nothing requested yet
    pub fn idle() -> Self {
        Self {
            loading: false,
            data: T::empty(),
            error: None,
        }
    }

    fn in_flight() -> Self {
        Self {
            loading: true,
            data: T::empty(),
            error: None,
        }
    }

    fn settled(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Self {
                loading: false,
                data,
                error: None,
            },
            Err(error) => Self {
                loading: false,
                data: T::empty(),
                error: Some(error),
            },
        }
    }
}

struct Shared<T> {
    state: watch::Sender<FetchState<T>>,
    /// Cleared on drop; publication checks it under the same lock
    alive: Mutex<bool>,
    in_flight: AtomicBool,
}

impl<T: Shape> Shared<T> {
    fn publish(&self, result: Result<T, FetchError>) {
        let alive = self.alive.lock().unwrap_or_else(PoisonError::into_inner);

        if *alive {
            if let Err(err) = &result {
                tracing::warn!("Section fetch failed: {}", err);
            }
            self.state.send_replace(FetchState::settled(result));
        } else {
            tracing::debug!("Discarding fetch result for a dropped section");
        }

        self.in_flight.store(false, Ordering::Release);
    }
}

/// One section's fetch, owned by the page render that started it
pub struct SectionLoad<T: Shape> {
    shared: Arc<Shared<T>>,
}

impl<T: Shape> SectionLoad<T> {
    /// Create an idle load
    pub fn new() -> Self {
        let (state, _) = watch::channel(FetchState::idle());
        Self {
            shared: Arc::new(Shared {
                state,
                alive: Mutex::new(true),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    /// Create a load and start `query` on it straight away
    pub fn spawn<F, Fut>(query: F) -> Self
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CmsError>> + Send + 'static,
    {
        let load = Self::new();
        load.start(query);
        load
    }

    /// Start `query` unless a request is already outstanding.
    ///
    /// Returns `false`, without calling `query`, when one is in flight. Must
    /// be called from within a tokio runtime.
    pub fn start<F, Fut>(&self, query: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CmsError>> + Send + 'static,
    {
        if self
            .shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Fetch already in flight; ignoring duplicate start");
            return false;
        }

        self.shared.state.send_replace(FetchState::in_flight());

        let request = query();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = request.await.map_err(FetchError::from);
            shared.publish(result);
        });

        true
    }

    /// Current state
    pub fn snapshot(&self) -> FetchState<T> {
        self.shared.state.borrow().clone()
    }

    /// Follow state changes as they happen
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.shared.state.subscribe()
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Wait until the load is no longer loading
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    /// Like [`settled`](Self::settled) but gives up after `deadline`,
    /// returning whatever state the load is in by then.
    pub async fn settle_within(&self, deadline: Duration) -> FetchState<T> {
        match tokio::time::timeout(deadline, self.settled()).await {
            Ok(state) => state,
            Err(_) => self.snapshot(),
        }
    }
}

impl<T: Shape> Default for SectionLoad<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Shape> Drop for SectionLoad<T> {
    fn drop(&mut self) {
        let mut alive = self
            .shared
            .alive
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        title: String,
    }

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_loading_then_data() {
        let load: SectionLoad<Vec<Item>> = SectionLoad::spawn(|| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(vec![item("1", "A")])
        });

        let first = load.snapshot();
        assert!(first.loading);
        assert!(first.data.is_empty());
        assert!(first.error.is_none());

        let state = load.settled().await;
        assert!(!state.loading);
        assert_eq!(state.data, vec![item("1", "A")]);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_failure_resets_data_to_empty_shape() {
        let list: SectionLoad<Vec<Item>> = SectionLoad::spawn(|| async {
            Err(CmsError::Status {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let state = list.settled().await;
        assert!(!state.loading);
        assert!(state.data.is_empty());
        assert_eq!(
            state.error.map(|e| e.message),
            Some("content store returned 500: boom".to_string())
        );

        let single: SectionLoad<Option<Item>> = SectionLoad::spawn(|| async {
            Err(CmsError::Url("bad".to_string()))
        });
        let state = single.settled().await;
        assert_eq!(state.data, None);
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn test_transitions_are_loading_then_settled() {
        let load: SectionLoad<Vec<Item>> = SectionLoad::new();
        let mut rx = load.subscribe();
        assert!(!rx.borrow_and_update().loading);

        load.start(|| async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(vec![item("1", "A")])
        });

        let mut seen = vec![rx.borrow_and_update().clone()];
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let done = !state.loading;
            seen.push(state);
            if done {
                break;
            }
        }

        assert_eq!(seen.len(), 2);
        assert!(seen[0].loading && seen[0].data.is_empty() && seen[0].error.is_none());
        assert!(!seen[1].loading && seen[1].data.len() == 1 && seen[1].error.is_none());
    }

    #[tokio::test]
    async fn test_second_start_while_in_flight_is_ignored() {
        let calls = Arc::new(AtomicUsize::new(0));
        let load: SectionLoad<Vec<Item>> = SectionLoad::new();

        let counter = Arc::clone(&calls);
        assert!(load.start(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                Ok(vec![item("1", "A")])
            }
        }));

        let counter = Arc::clone(&calls);
        assert!(!load.start(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(vec![item("2", "B")]) }
        }));

        let state = load.settled().await;
        assert_eq!(state.data, vec![item("1", "A")]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // once settled, a new cycle may start
        tokio::task::yield_now().await;
        assert!(!load.is_in_flight());
        assert!(load.start(|| async { Ok(vec![item("3", "C")]) }));
        assert_eq!(load.settled().await.data, vec![item("3", "C")]);
    }

    #[tokio::test]
    async fn test_no_update_after_drop() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let load: SectionLoad<Vec<Item>> = SectionLoad::spawn(move || async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(vec![item("1", "A")])
        });

        let mut rx = load.subscribe();
        assert!(rx.borrow_and_update().loading);
        drop(load);

        tokio::time::sleep(Duration::from_millis(150)).await;

        // the request itself ran to completion
        assert!(finished.load(Ordering::SeqCst));
        // but nothing was published after the drop
        assert!(!matches!(rx.has_changed(), Ok(true)));
        let last = rx.borrow().clone();
        assert!(last.loading);
        assert!(last.data.is_empty());
    }

    #[tokio::test]
    async fn test_settle_within_returns_loading_past_deadline() {
        let load: SectionLoad<Option<Item>> = SectionLoad::spawn(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(Some(item("1", "A")))
        });

        let state = load.settle_within(Duration::from_millis(20)).await;
        assert!(state.loading);
        assert_eq!(state.data, None);
    }

    #[tokio::test]
    async fn test_idle_load_is_already_settled() {
        let load: SectionLoad<Vec<Item>> = SectionLoad::new();
        let state = load.settled().await;
        assert_eq!(state, FetchState::idle());
    }
}

//! # Tally Runtime
//!
//! Runtime implementation for the Tally state-container architecture.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling for one screen.
//!
//! ## Core Components
//!
//! - **Store**: serializes message processing, publishes state snapshots,
//!   and spawns effect tasks
//! - **Effect execution**: each effect runs as an independent tokio task;
//!   follow-up messages re-enter the store like any other dispatch
//! - **Dispose**: structured cancellation of all in-flight and future
//!   effects for one store
//!
//! ## Example
//!
//! ```ignore
//! use tally_runtime::Store;
//!
//! let store = Store::new(FormState::default(), FormReducer, handler);
//!
//! // Dispatch a message
//! store.dispatch(FormMessage::SaveTapped).await?;
//!
//! // Observe state
//! let mut states = store.subscribe();
//! let is_saving = store.state(|s| s.is_saving).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tally_core::effect::EffectHandler;
use tally_core::reducer::Reducer;
use tokio::sync::{RwLock, watch};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Recoverable domain conditions never surface here; they travel as
    /// messages. These errors describe the store's own lifecycle.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The store has been disposed and no longer accepts messages
        ///
        /// Returned by `dispatch` after `dispose()` has been called.
        #[error("Store has been disposed")]
        Disposed,

        /// Timeout waiting for scheduled effects to complete
        ///
        /// Returned by [`EffectHandle::wait_with_timeout`](crate::EffectHandle::wait_with_timeout).
        #[error("Timeout waiting for effects to complete")]
        Timeout,
    }
}

pub use error::StoreError;

/// Handle for tracking completion of the effects scheduled by one dispatch
///
/// Returned by [`Store::dispatch`]. Waiting is optional — production callers
/// usually drop the handle, while tests use it to await quiescence instead
/// of sleeping.
///
/// Only the effects scheduled by that one reduction are tracked; follow-up
/// dispatches get handles of their own.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.dispatch(Message::Started).await?;
/// handle.wait_with_timeout(Duration::from_secs(1)).await?;
/// // The load effect has completed and its follow-up has been dispatched.
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle plus the tracking half used by effect tasks
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that is already complete
    ///
    /// Useful as a starting value when folding over dispatches in a loop.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        drop(tx);

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            // A closed channel means every tracking half was dropped,
            // which implies the counter has reached zero.
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete, up to `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires first.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context carried by each spawned effect task
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Effect started
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Effect completed
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the tracking counter on drop
///
/// Ensures the counter is decremented even if the effect task panics or is
/// cancelled by dispose.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (store-wide pending count)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - the runtime for one feature's reducer
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, EffectHandle,
        EffectHandler, EffectTracking, Ordering, Reducer, RwLock, StoreError, watch,
    };

    /// The Store - runtime coordinator for one screen's state machine
    ///
    /// The Store owns:
    /// 1. The current state (single source of truth, behind an `RwLock`)
    /// 2. The reducer (pure business logic)
    /// 3. The effect handler (injected repositories, I/O)
    /// 4. The observable state stream (`watch` channel, replay-latest)
    ///
    /// # Guarantees
    ///
    /// - Reductions are serialized: no two run concurrently against the same
    ///   store, even when `dispatch` is called from concurrent tasks
    /// - The new state is published before the reduction's effects are
    ///   scheduled
    /// - Effects run concurrently with each other and with later dispatches;
    ///   a follow-up message is reduced against whatever state is current
    ///   when it arrives
    /// - `dispose()` cancels in-flight and future effect work; messages from
    ///   cancelled effects are never observed
    ///
    /// # Type Parameters
    ///
    /// - `R`: reducer implementation
    /// - `H`: effect handler implementation
    pub struct Store<R, H>
    where
        R: Reducer,
        H: EffectHandler<Message = R::Message, Effect = R::Effect>,
    {
        state: Arc<RwLock<R::State>>,
        reducer: R,
        handler: Arc<H>,
        state_tx: Arc<watch::Sender<R::State>>,
        disposed: Arc<AtomicBool>,
        dispose_tx: Arc<watch::Sender<bool>>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<R, H> Store<R, H>
    where
        R: Reducer + Clone + Send + Sync + 'static,
        R::State: Clone + Send + Sync + 'static,
        R::Message: Send + 'static,
        R::Effect: Send + 'static,
        H: EffectHandler<Message = R::Message, Effect = R::Effect> + 'static,
    {
        /// Create a new store with an initial state, reducer, and handler
        ///
        /// The store's current state equals `initial_state`; no effects run
        /// at construction. A screen that needs an initial load dispatches
        /// its `Started` message explicitly.
        #[must_use]
        pub fn new(initial_state: R::State, reducer: R, handler: H) -> Self {
            let (state_tx, _) = watch::channel(initial_state.clone());
            let (dispose_tx, _) = watch::channel(false);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                handler: Arc::new(handler),
                state_tx: Arc::new(state_tx),
                disposed: Arc::new(AtomicBool::new(false)),
                dispose_tx: Arc::new(dispose_tx),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Dispatch a message to the store
        ///
        /// This is the single write path:
        /// 1. Acquires the state write lock (serializing reductions)
        /// 2. Runs the reducer
        /// 3. Publishes the new state snapshot to subscribers
        /// 4. Spawns one task per returned effect and returns immediately
        ///
        /// Messages dispatched from concurrent callers are processed in
        /// lock-acquisition order; state snapshots are published in that
        /// same order.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::Disposed`] if the store has been disposed.
        #[tracing::instrument(skip(self, message), name = "store_dispatch")]
        pub async fn dispatch(&self, message: R::Message) -> Result<EffectHandle, StoreError> {
            if self.disposed.load(Ordering::Acquire) {
                tracing::debug!("Rejected message: store is disposed");
                metrics::counter!("store.dispatch.rejected").increment(1);
                return Err(StoreError::Disposed);
            }

            metrics::counter!("store.dispatch.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, message);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                // Publish before scheduling effects, still under the lock,
                // so subscribers observe snapshots in reduction order.
                self.state_tx.send_replace(state.clone());

                effects
            };

            tracing::trace!(count = effects.len(), "Scheduling effects");
            // Precision loss acceptable for metrics
            #[allow(clippy::cast_precision_loss)]
            metrics::histogram!("store.effects.count").record(effects.len() as f64);

            for effect in effects {
                self.spawn_effect(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Subscribe to the state stream
        ///
        /// The returned receiver replays the latest state immediately and
        /// then yields every subsequent snapshot in publication order. A
        /// snapshot is published for every reduction, including ones that
        /// left the state structurally equal.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<R::State> {
            self.state_tx.subscribe()
        }

        /// Read the current state via a closure
        ///
        /// ```ignore
        /// let total = store.state(|s| s.total_price()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Dispose the store
        ///
        /// Cancels all in-flight effect tasks at their next await point and
        /// prevents any future effect work. Follow-up messages from
        /// cancelled effects are never dispatched, so no state change is
        /// observed after dispose. Idempotent.
        pub fn dispose(&self) {
            if !self.disposed.swap(true, Ordering::AcqRel) {
                let _ = self.dispose_tx.send(true);
                tracing::debug!("Store disposed");
                metrics::counter!("store.disposed").increment(1);
            }
        }

        /// Whether `dispose()` has been called
        #[must_use]
        pub fn is_disposed(&self) -> bool {
            self.disposed.load(Ordering::Acquire)
        }

        /// Number of effect tasks currently in flight
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }

        /// Spawn one effect as an independent task
        ///
        /// The task races the handler's future against the dispose signal;
        /// whichever finishes first wins. The tracking and pending-count
        /// guards fire on drop, so counters stay correct on cancellation
        /// and on panic inside a handler.
        fn spawn_effect(&self, effect: R::Effect, tracking: EffectTracking) {
            tracking.increment();
            metrics::counter!("store.effects.spawned").increment(1);

            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            let store = self.clone();
            let mut dispose_rx = self.dispose_tx.subscribe();

            tokio::spawn(async move {
                let _guard = DecrementGuard(tracking);
                let _pending_guard = pending_guard;

                let follow_up = tokio::select! {
                    _ = dispose_rx.wait_for(|disposed| *disposed) => {
                        tracing::trace!("Effect cancelled by dispose");
                        metrics::counter!("store.effects.cancelled").increment(1);
                        return;
                    },
                    message = store.handler.handle(effect) => message,
                };

                if let Some(message) = follow_up {
                    tracing::trace!("Effect produced a follow-up message");
                    // Err here means the store was disposed between the
                    // handler finishing and the feedback dispatch.
                    let _ = store.dispatch(message).await;
                } else {
                    tracing::trace!("Effect completed with no follow-up");
                }
            });
        }
    }

    impl<R, H> Clone for Store<R, H>
    where
        R: Reducer + Clone,
        H: EffectHandler<Message = R::Message, Effect = R::Effect>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                handler: Arc::clone(&self.handler),
                state_tx: Arc::clone(&self.state_tx),
                disposed: Arc::clone(&self.disposed),
                dispose_tx: Arc::clone(&self.dispose_tx),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct TestState {
        value: i32,
        error: Option<String>,
    }

    #[derive(Debug, Clone)]
    enum TestMessage {
        Increment,
        Decrement,
        StartWork,
        StartSlowWork,
        StartFailingWork,
        WorkFinished(i32),
        Failed(String),
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestEffect {
        Work,
        SlowWork,
        FailingWork,
    }

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Message = TestMessage;
        type Effect = TestEffect;

        fn reduce(&self, state: &mut TestState, message: TestMessage) -> Effects<TestEffect> {
            match message {
                TestMessage::Increment => {
                    state.value += 1;
                    Effects::new()
                },
                TestMessage::Decrement => {
                    state.value -= 1;
                    Effects::new()
                },
                TestMessage::StartWork => smallvec![TestEffect::Work],
                TestMessage::StartSlowWork => smallvec![TestEffect::SlowWork],
                TestMessage::StartFailingWork => smallvec![TestEffect::FailingWork],
                TestMessage::WorkFinished(amount) => {
                    state.value += amount;
                    Effects::new()
                },
                TestMessage::Failed(error) => {
                    state.error = Some(error);
                    Effects::new()
                },
            }
        }
    }

    struct TestHandler;

    impl EffectHandler for TestHandler {
        type Message = TestMessage;
        type Effect = TestEffect;

        async fn handle(&self, effect: TestEffect) -> Option<TestMessage> {
            match effect {
                TestEffect::Work => Some(TestMessage::WorkFinished(10)),
                TestEffect::SlowWork => {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Some(TestMessage::WorkFinished(100))
                },
                TestEffect::FailingWork => Some(TestMessage::Failed("backend down".into())),
            }
        }
    }

    fn test_store() -> Store<TestReducer, TestHandler> {
        Store::new(TestState::default(), TestReducer, TestHandler)
    }

    #[tokio::test]
    async fn store_starts_with_initial_state() {
        let store = test_store();
        assert_eq!(store.state(|s| s.value).await, 0);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn dispatch_applies_reduction() {
        let store = test_store();

        store.dispatch(TestMessage::Increment).await.unwrap();
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn dispatches_are_processed_in_order() {
        let store = test_store();

        store.dispatch(TestMessage::Increment).await.unwrap();
        store.dispatch(TestMessage::Increment).await.unwrap();
        store.dispatch(TestMessage::Decrement).await.unwrap();

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn effect_feeds_back_a_message() {
        let store = test_store();

        let mut handle = store.dispatch(TestMessage::StartWork).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();

        // The follow-up dispatch itself may still be in flight for an
        // instant after the handler task finishes.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.state(|s| s.value).await, 10);
    }

    #[tokio::test]
    async fn failing_effect_surfaces_as_error_message() {
        let store = test_store();

        let mut handle = store.dispatch(TestMessage::StartFailingWork).await.unwrap();
        handle.wait_with_timeout(Duration::from_secs(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let state = store.state(Clone::clone).await;
        assert_eq!(state.error.as_deref(), Some("backend down"));
        assert_eq!(state.value, 0);
    }

    #[tokio::test]
    async fn subscribe_replays_latest_state() {
        let store = test_store();
        store.dispatch(TestMessage::Increment).await.unwrap();

        let rx = store.subscribe();
        assert_eq!(rx.borrow().value, 1);
    }

    #[tokio::test]
    async fn subscribe_observes_updates_in_order() {
        let store = test_store();
        let mut rx = store.subscribe();

        store.dispatch(TestMessage::Increment).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().value, 1);

        store.dispatch(TestMessage::Increment).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().value, 2);
    }

    #[tokio::test]
    async fn dispatch_after_dispose_fails_fast() {
        let store = test_store();
        store.dispose();

        let result = store.dispatch(TestMessage::Increment).await;
        assert_eq!(result.unwrap_err(), StoreError::Disposed);
    }

    #[tokio::test]
    async fn dispose_is_idempotent() {
        let store = test_store();
        store.dispose();
        store.dispose();
        assert!(store.is_disposed());
    }

    #[tokio::test]
    async fn dispose_cancels_in_flight_effects() {
        let store = test_store();

        store.dispatch(TestMessage::StartSlowWork).await.unwrap();
        store.dispose();

        // Longer than the slow effect; its follow-up must never land.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(store.state(|s| s.value).await, 0);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn completed_handle_resolves_immediately() {
        let mut handle = EffectHandle::completed();
        handle.wait_with_timeout(Duration::from_millis(10)).await.unwrap();
        assert_eq!(handle.pending(), 0);
    }
}

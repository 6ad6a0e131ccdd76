//! # Tally Core
//!
//! Core traits and types for the Tally state-container architecture.
//!
//! Every screen of the application is driven by the same unidirectional
//! pattern: the UI dispatches a **Message**, a pure **Reducer** computes the
//! next **State** plus a list of **Effects**, the store publishes the state
//! and executes each effect asynchronously, and effects report their outcome
//! by dispatching follow-up messages.
//!
//! ## Core Concepts
//!
//! - **State**: everything a screen needs to render, owned by one store
//! - **Message**: one discrete input (user action or async result), a closed enum
//! - **Effect**: a description of one unit of asynchronous work, a closed enum
//! - **Reducer**: pure function `(State, Message) → (State, Effects)`
//! - **`EffectHandler`**: performs the I/O described by an Effect
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Unidirectional data flow
//! - Explicit effects (no hidden I/O in reducers)
//! - Dependencies injected into effect handlers at construction
//!
//! ## Example
//!
//! ```ignore
//! use tally_core::{reducer::Reducer, Effects, smallvec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct FormState {
//!     name: String,
//!     is_saving: bool,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum FormMessage {
//!     NameChanged(String),
//!     SaveTapped,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum FormEffect {
//!     Save { name: String },
//! }
//!
//! struct FormReducer;
//!
//! impl Reducer for FormReducer {
//!     type State = FormState;
//!     type Message = FormMessage;
//!     type Effect = FormEffect;
//!
//!     fn reduce(&self, state: &mut FormState, message: FormMessage) -> Effects<FormEffect> {
//!         match message {
//!             FormMessage::NameChanged(name) => {
//!                 state.name = name;
//!                 Effects::new()
//!             }
//!             FormMessage::SaveTapped => {
//!                 state.is_saving = true;
//!                 smallvec![FormEffect::Save { name: state.name.clone() }]
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

/// The effect list returned by one reduction.
///
/// Zero effects is the common case and one is the next most common, so the
/// list is inlined up to two entries. Effects in the same list are
/// independent and logically concurrent; the runtime makes no ordering
/// guarantee between them.
pub type Effects<E> = SmallVec<[E; 2]>;

/// Reducer module - the pure state-transition function
///
/// Reducers are total over their Message union and deterministic: the same
/// `(state, message)` pair always yields the same next state and effect
/// list. They perform no I/O and never block.
pub mod reducer {
    use super::Effects;

    /// The Reducer trait - core abstraction for a feature's business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: the screen state this reducer operates on
    /// - `Message`: the closed set of inputs it processes
    /// - `Effect`: the closed set of asynchronous work it can request
    ///
    /// # Contract
    ///
    /// `reduce` mutates the state in place under the store's lock (the store
    /// publishes a whole-value snapshot afterwards, so observers never see a
    /// partial update) and returns the effects this transition requests.
    ///
    /// Recoverable conditions (validation failures, not-found, network
    /// errors) are represented as state fields or follow-up messages, never
    /// as panics or `Err` values. A panic inside `reduce` is a programmer
    /// error and intentionally fatal.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The message type this reducer processes
        type Message;

        /// The effect type this reducer can request
        type Effect;

        /// Reduce a message into state changes and effects
        ///
        /// Must handle every `Message` variant. A message that does not
        /// apply in the current state (for example a save tap while a save
        /// is already in flight) is handled by returning no effects and
        /// leaving the state unchanged.
        fn reduce(&self, state: &mut Self::State, message: Self::Message)
        -> Effects<Self::Effect>;
    }
}

/// Effect handler module - the imperative shell for one feature
///
/// Handlers own the injected repository dependencies and perform the actual
/// I/O that an [`Effect`](crate::reducer::Reducer::Effect) describes.
pub mod effect {
    use std::future::Future;

    /// Executes the asynchronous work described by one effect.
    ///
    /// Each call runs as an independent task; a slow or failed effect never
    /// blocks the store's message processing. The returned message (if any)
    /// is dispatched back into the same store.
    ///
    /// # Contract
    ///
    /// Errors raised by the work inside `handle` must be caught and mapped
    /// to an error-carrying `Message` — they never propagate out of the
    /// handler. Return `None` when the effect has nothing to report.
    pub trait EffectHandler: Send + Sync {
        /// The message type dispatched back on completion
        type Message: Send;

        /// The effect type this handler executes
        type Effect: Send;

        /// Perform the I/O for one effect
        fn handle(
            &self,
            effect: Self::Effect,
        ) -> impl Future<Output = Option<Self::Message>> + Send;
    }
}

/// Environment module - ambient dependency traits
///
/// Repositories live in the domain crate; this module holds the
/// cross-cutting dependencies every feature may need.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Production uses [`SystemClock`]; tests use a fixed clock so that
    /// reducers and handlers stay deterministic.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Get the current date (UTC)
        fn today(&self) -> chrono::NaiveDate {
            self.now().date_naive()
        }
    }

    /// System clock backed by the host's wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

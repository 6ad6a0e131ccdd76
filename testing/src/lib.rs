//! # Tally Testing
//!
//! Testing utilities for the Tally state-container architecture.
//!
//! This crate provides:
//! - [`ReducerTest`]: a given/when/then DSL for pure reducer tests
//! - [`mocks::FixedClock`]: deterministic time
//! - In-memory repository mocks with failure injection, for driving effect
//!   handlers and store-level tests without a backend
//!
//! ## Example
//!
//! ```ignore
//! use tally_testing::{ReducerTest, assertions};
//!
//! ReducerTest::new(ProductFormReducer)
//!     .given_state(ProductFormState::default())
//!     .when_message(ProductFormMessage::NameChanged("Pen".into()))
//!     .then_state(|state| assert_eq!(state.name, "Pen"))
//!     .then_effects(assertions::assert_no_effects)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tally_core::environment::Clock;

/// Given/when/then reducer test DSL
pub mod reducer_test;

/// In-memory repository mocks
pub mod repository_mocks;

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot
    /// happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Install a compact tracing subscriber writing to the test output
///
/// Call at the top of a store-level test to see dispatch/effect traces when
/// it fails. Only the first call per process installs; later calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
pub use repository_mocks::{
    FakeAuthGateway, InMemoryBusinessInfoRepository, InMemoryClientRepository,
    InMemoryProductRepository, InMemoryPurchaseRepository, InMemorySaleRepository,
    InMemorySessionRepository,
};

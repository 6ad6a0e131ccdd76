//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable
//! given/when/then syntax. Reducers are pure, so no runtime or mock
//! repositories are needed here — effect handlers are tested separately
//! against the in-memory repositories.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use tally_core::reducer::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<E> = Box<dyn FnOnce(&[E])>;

/// Fluent API for testing reducers with given/when/then syntax
///
/// Multiple `when_message` calls fold the messages through the reducer in
/// order; state assertions see the final state and effect assertions see
/// the effects of the *last* reduction only.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(SaleFormReducer)
///     .given_state(SaleFormState::default())
///     .when_message(SaleFormMessage::DateChanged(date))
///     .when_message(SaleFormMessage::SaveTapped)
///     .then_state(|state| assert!(state.is_saving))
///     .then_effects(|effects| assert_eq!(effects.len(), 1))
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    initial_state: Option<R::State>,
    messages: Vec<R::Message>,
    state_assertions: Vec<StateAssertion<R::State>>,
    effect_assertions: Vec<EffectAssertion<R::Effect>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            messages: Vec::new(),
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add a message to reduce (When)
    #[must_use]
    pub fn when_message(mut self, message: R::Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Add an assertion about the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the last reduction's effects (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[R::Effect]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state or at least one message is not set, or
    /// if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.messages.is_empty(),
            "At least one message must be set with when_message()"
        );

        let mut effects = tally_core::Effects::new();
        for message in self.messages {
            effects = self.reducer.reduce(&mut state, message);
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effect lists
pub mod assertions {
    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if the effect list is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<E: std::fmt::Debug>(effects: &[E]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<E>(effects: &[E], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{Effects, smallvec};

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    #[derive(Clone, Debug)]
    enum TestMessage {
        Increment,
        RequestPing,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum TestEffect {
        Ping,
    }

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Message = TestMessage;
        type Effect = TestEffect;

        fn reduce(&self, state: &mut TestState, message: TestMessage) -> Effects<TestEffect> {
            match message {
                TestMessage::Increment => {
                    state.count += 1;
                    Effects::new()
                }
                TestMessage::RequestPing => smallvec![TestEffect::Ping],
            }
        }
    }

    #[test]
    fn single_message() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_message(TestMessage::Increment)
            .then_state(|state| assert_eq!(state.count, 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn folds_messages_and_asserts_last_effects() {
        ReducerTest::new(TestReducer)
            .given_state(TestState { count: 0 })
            .when_message(TestMessage::Increment)
            .when_message(TestMessage::Increment)
            .when_message(TestMessage::RequestPing)
            .then_state(|state| assert_eq!(state.count, 2))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(effects[0], TestEffect::Ping);
            })
            .run();
    }
}

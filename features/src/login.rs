//! Email/password sign-in screen.
//!
//! On success the session is persisted to device storage before the
//! `SignedIn` message is dispatched, so a restart lands on the signed-in
//! path.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::UserId;
use tally_domain::repository::{AuthGateway, SessionRepository};

/// State of the sign-in screen
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginState {
    /// Email field, as typed
    pub email: String,
    /// Password field, as typed
    pub password: String,
    /// A sign-in request is in flight
    pub is_authenticating: bool,
    /// Set once sign-in succeeds; the UI navigates away on this
    pub authenticated: Option<UserId>,
    /// Last sign-in failure, shown inline
    pub error: Option<String>,
}

impl LoginState {
    /// Whether the submit button is enabled
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Inputs to the sign-in screen
#[derive(Clone, Debug)]
pub enum LoginMessage {
    /// Email field edited
    EmailChanged(String),
    /// Password field edited
    PasswordChanged(String),
    /// Submit button tapped
    SubmitTapped,
    /// Sign-in succeeded and the session was stored
    SignedIn(UserId),
    /// Sign-in failed
    Failed(String),
}

/// Asynchronous work for the sign-in screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginEffect {
    /// Authenticate against the backend and persist the session
    Authenticate {
        /// Email to authenticate with
        email: String,
        /// Password to authenticate with
        password: String,
    },
}

/// Reducer for the sign-in screen
#[derive(Clone, Debug, Default)]
pub struct LoginReducer;

impl Reducer for LoginReducer {
    type State = LoginState;
    type Message = LoginMessage;
    type Effect = LoginEffect;

    fn reduce(&self, state: &mut LoginState, message: LoginMessage) -> Effects<LoginEffect> {
        match message {
            LoginMessage::EmailChanged(email) => {
                state.email = email;
                Effects::new()
            },
            LoginMessage::PasswordChanged(password) => {
                state.password = password;
                Effects::new()
            },
            LoginMessage::SubmitTapped => {
                // Double-tap guard: one sign-in request at a time.
                if state.is_authenticating || !state.can_submit() {
                    return Effects::new();
                }
                state.is_authenticating = true;
                state.error = None;
                smallvec![LoginEffect::Authenticate {
                    email: state.email.trim().to_string(),
                    password: state.password.clone(),
                }]
            },
            LoginMessage::SignedIn(user) => {
                state.is_authenticating = false;
                state.authenticated = Some(user);
                Effects::new()
            },
            LoginMessage::Failed(reason) => {
                state.is_authenticating = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the sign-in screen
pub struct LoginEffects<A, S> {
    auth: A,
    sessions: S,
}

impl<A, S> LoginEffects<A, S> {
    /// Create a handler from the injected auth gateway and session store
    pub const fn new(auth: A, sessions: S) -> Self {
        Self { auth, sessions }
    }
}

impl<A, S> EffectHandler for LoginEffects<A, S>
where
    A: AuthGateway + 'static,
    S: SessionRepository + 'static,
{
    type Message = LoginMessage;
    type Effect = LoginEffect;

    async fn handle(&self, effect: LoginEffect) -> Option<LoginMessage> {
        match effect {
            LoginEffect::Authenticate { email, password } => {
                let user = match self.auth.sign_in(&email, &password).await {
                    Ok(user) => user,
                    Err(error) => {
                        tracing::warn!(error = %error, "sign-in failed");
                        return Some(LoginMessage::Failed(error.to_string()));
                    },
                };
                if let Err(error) = self.sessions.store_session(user).await {
                    return Some(LoginMessage::Failed(error.to_string()));
                }
                Some(LoginMessage::SignedIn(user))
            },
        }
    }
}

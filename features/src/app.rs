//! App-level store: session restore at launch and sign-out.
//!
//! Owned by the application root rather than a single screen; its state
//! decides whether the UI shows the login flow or the main tabs.

use tally_core::{Effects, effect::EffectHandler, reducer::Reducer, smallvec};
use tally_domain::records::UserId;
use tally_domain::repository::{AuthGateway, SessionRepository};

/// State of the application root
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// The stored session is being loaded
    pub is_restoring: bool,
    /// The signed-in user, if any
    pub session: Option<UserId>,
    /// Last session/sign-out failure
    pub error: Option<String>,
}

/// Inputs to the application root
#[derive(Clone, Debug)]
pub enum AppMessage {
    /// App launched; restore the stored session
    Started,
    /// Session restore finished (None means signed out)
    SessionRestored(Option<UserId>),
    /// The login screen completed a sign-in
    SignedIn(UserId),
    /// Sign-out tapped in the settings screen
    SignOutTapped,
    /// Sign-out completed and the session was cleared
    SignedOut,
    /// Session restore or sign-out failed
    Failed(String),
}

/// Asynchronous work for the application root
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEffect {
    /// Load the stored session from device storage
    RestoreSession,
    /// Sign out of the backend and clear the stored session
    SignOut,
}

/// Reducer for the application root
#[derive(Clone, Debug, Default)]
pub struct AppReducer;

impl Reducer for AppReducer {
    type State = AppState;
    type Message = AppMessage;
    type Effect = AppEffect;

    fn reduce(&self, state: &mut AppState, message: AppMessage) -> Effects<AppEffect> {
        match message {
            AppMessage::Started => {
                if state.is_restoring {
                    return Effects::new();
                }
                state.is_restoring = true;
                state.error = None;
                smallvec![AppEffect::RestoreSession]
            },
            AppMessage::SessionRestored(session) => {
                state.is_restoring = false;
                state.session = session;
                Effects::new()
            },
            AppMessage::SignedIn(user) => {
                state.session = Some(user);
                Effects::new()
            },
            AppMessage::SignOutTapped => {
                if state.session.is_none() {
                    return Effects::new();
                }
                smallvec![AppEffect::SignOut]
            },
            AppMessage::SignedOut => {
                state.session = None;
                Effects::new()
            },
            AppMessage::Failed(reason) => {
                state.is_restoring = false;
                state.error = Some(reason);
                Effects::new()
            },
        }
    }
}

/// Effect handler for the application root
pub struct AppEffects<A, S> {
    auth: A,
    sessions: S,
}

impl<A, S> AppEffects<A, S> {
    /// Create a handler from the injected auth gateway and session store
    pub const fn new(auth: A, sessions: S) -> Self {
        Self { auth, sessions }
    }
}

impl<A, S> EffectHandler for AppEffects<A, S>
where
    A: AuthGateway + 'static,
    S: SessionRepository + 'static,
{
    type Message = AppMessage;
    type Effect = AppEffect;

    async fn handle(&self, effect: AppEffect) -> Option<AppMessage> {
        match effect {
            AppEffect::RestoreSession => match self.sessions.load_session().await {
                Ok(session) => Some(AppMessage::SessionRestored(session)),
                Err(error) => Some(AppMessage::Failed(error.to_string())),
            },
            AppEffect::SignOut => {
                if let Err(error) = self.auth.sign_out().await {
                    tracing::warn!(error = %error, "sign-out failed");
                    return Some(AppMessage::Failed(error.to_string()));
                }
                match self.sessions.clear_session().await {
                    Ok(()) => Some(AppMessage::SignedOut),
                    Err(error) => Some(AppMessage::Failed(error.to_string())),
                }
            },
        }
    }
}

//! Auth-session state and the manager that owns it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every consumer that needs "who is logged in" holds an
//! `Arc<SessionManager>` handed down from the application root. Consumers
//! read [`Session`] snapshots or subscribe to changes; only the manager's
//! operations mutate it.
//!
//! DESIGN
//! ======
//! State lives in a `tokio::sync::watch` channel. Each operation awaits its
//! one network call and then applies the whole transition in a single
//! `send_modify`, so subscribers never see a half-applied session.
//!
//! `login`/`register`/`logout` convert every failure into the boolean +
//! `last_errors` contract; `update_profile` returns [`SessionError`] so the
//! caller decides how to surface it.
//!
//! Operations called while recovery is still running wait for it to finish,
//! so recovery never overwrites their outcome.
//!
//! A second call to an operation while the first is in flight is dropped
//! (login and register share one slot). Slots are held by an RAII guard, so
//! a cancelled future releases its slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::net::api::IdentityApi;
use crate::net::error::ApiError;
use crate::net::token::TokenStore;
use crate::net::types::{Credentials, ProfileUpdate, Registration, User};

const REGISTER_FALLBACK: &str = "registration failed";
const LOGIN_FALLBACK: &str = "login failed";
const UPDATE_FALLBACK: &str = "profile update failed";
const MISSING_TOKEN_MESSAGE: &str = "the server did not issue a session token";

// =============================================================================
// SESSION
// =============================================================================

/// Process-wide authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub current_user: Option<User>,
    pub is_authenticated: bool,
    /// True only until initial session recovery finishes.
    pub is_loading: bool,
    /// Messages from the most recent operation; replaced by every new one.
    pub last_errors: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::initializing()
    }
}

impl Session {
    #[must_use]
    pub fn initializing() -> Self {
        Self { current_user: None, is_authenticated: false, is_loading: true, last_errors: Vec::new() }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Initializing
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    /// Route guard: recovery has finished and nobody is logged in.
    #[must_use]
    pub fn should_redirect_unauth(&self) -> bool {
        !self.is_loading && self.current_user.is_none()
    }

    fn become_authenticated(&mut self, user: User) {
        self.current_user = Some(user);
        self.is_authenticated = true;
    }

    fn become_anonymous(&mut self) {
        self.current_user = None;
        self.is_authenticated = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Anonymous,
    Authenticated,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of [`SessionManager::update_profile`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("not logged in")]
    NotAuthenticated,
    #[error("a profile update is already in progress")]
    Busy,
    #[error("profile update failed: {0}")]
    UpdateFailed(#[source] ApiError),
}

// =============================================================================
// IN-FLIGHT GUARD
// =============================================================================

/// Holds an operation slot until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(slot: &'a AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(slot))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Single source of truth for the current user.
pub struct SessionManager {
    api: Arc<dyn IdentityApi>,
    tokens: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    recovery_started: AtomicBool,
    credentials_in_flight: AtomicBool,
    logout_in_flight: AtomicBool,
    update_in_flight: AtomicBool,
}

impl SessionManager {
    fn new(api: Arc<dyn IdentityApi>, tokens: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::initializing());
        Self {
            api,
            tokens,
            state,
            recovery_started: AtomicBool::new(false),
            credentials_in_flight: AtomicBool::new(false),
            logout_in_flight: AtomicBool::new(false),
            update_in_flight: AtomicBool::new(false),
        }
    }

    /// Create the manager and spawn session recovery onto the current runtime.
    ///
    /// The returned handle starts in [`SessionPhase::Initializing`]; await
    /// [`Self::ready`] to observe the recovered session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn start(api: Arc<dyn IdentityApi>, tokens: Arc<dyn TokenStore>) -> Arc<Self> {
        let manager = Arc::new(Self::new(api, tokens));
        let recovering = Arc::clone(&manager);
        tokio::spawn(async move { recovering.recover().await });
        manager
    }

    /// Create the manager and run session recovery before returning.
    pub async fn recovered(api: Arc<dyn IdentityApi>, tokens: Arc<dyn TokenStore>) -> Arc<Self> {
        let manager = Arc::new(Self::new(api, tokens));
        manager.recover().await;
        manager
    }

    /// Wait until session recovery has finished and return that snapshot.
    pub async fn ready(&self) -> Session {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|session| !session.is_loading).await {
            Ok(session) => Session::clone(&session),
            Err(_) => self.snapshot(),
        }
    }

    // -------------------------------------------------------------------------
    // Read side
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn last_errors(&self) -> Vec<String> {
        self.state.borrow().last_errors.clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Register a new account and log it in. Returns whether it succeeded.
    pub async fn register(&self, registration: &Registration) -> bool {
        self.ready().await;
        let Some(_slot) = InFlight::acquire(&self.credentials_in_flight) else {
            warn!("register dropped: a credential exchange is already in flight");
            return false;
        };
        self.clear_errors();
        if let Err(errors) = registration.validate() {
            self.set_errors(errors);
            return false;
        }
        let result = self.api.register(registration).await;
        self.finish_credential_exchange("register", result, REGISTER_FALLBACK)
    }

    /// Log in with email and password. Returns whether it succeeded.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.ready().await;
        let Some(_slot) = InFlight::acquire(&self.credentials_in_flight) else {
            warn!("login dropped: a credential exchange is already in flight");
            return false;
        };
        self.clear_errors();
        if let Err(errors) = credentials.validate() {
            self.set_errors(errors);
            return false;
        }
        let result = self.api.login(credentials).await;
        self.finish_credential_exchange("login", result, LOGIN_FALLBACK)
    }

    /// Invalidate the server session and always reset local state.
    pub async fn logout(&self) {
        self.ready().await;
        let Some(_slot) = InFlight::acquire(&self.logout_in_flight) else {
            warn!("logout dropped: a logout is already in flight");
            return;
        };
        self.clear_errors();
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "server-side logout failed; clearing local session anyway");
        }
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to remove persisted session token");
        }
        self.state.send_modify(Session::become_anonymous);
        info!("logged out");
    }

    /// Send a profile update and merge the server's record into the current user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when anonymous,
    /// [`SessionError::Busy`] when another update is in flight, and
    /// [`SessionError::UpdateFailed`] for local validation or server failures.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, SessionError> {
        self.ready().await;
        let Some(_slot) = InFlight::acquire(&self.update_in_flight) else {
            return Err(SessionError::Busy);
        };
        self.clear_errors();
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        if let Err(errors) = update.validate() {
            self.set_errors(errors.clone());
            return Err(SessionError::UpdateFailed(ApiError::Validation(errors)));
        }

        match self.api.update_profile(update).await {
            Ok(returned) => {
                let mut merged = None;
                self.state.send_modify(|session| {
                    let mut user = session.current_user.take().unwrap_or_default();
                    user.merge(returned);
                    merged = Some(user.clone());
                    session.current_user = Some(user);
                });
                Ok(merged.unwrap_or_default())
            }
            Err(e) => {
                warn!(error = %e, "profile update failed");
                self.set_errors(e.messages_or(UPDATE_FALLBACK));
                Err(SessionError::UpdateFailed(e))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Startup recovery; runs at most once per manager.
    async fn recover(&self) {
        if self.recovery_started.swap(true, Ordering::AcqRel) {
            return;
        }

        if !self.tokens.exists() {
            self.state.send_modify(|session| {
                session.become_anonymous();
                session.is_loading = false;
            });
            info!("no persisted session token; starting anonymous");
            return;
        }

        let outcome = self.api.verify().await;
        self.state.send_modify(|session| {
            match outcome {
                Ok(Some(user)) => {
                    info!(user = user.display_name(), "session restored");
                    session.become_authenticated(user);
                }
                Ok(None) => {
                    info!("session token not recognized; starting anonymous");
                    session.become_anonymous();
                }
                Err(e) => {
                    warn!(error = %e, "session verification failed; starting anonymous");
                    session.become_anonymous();
                }
            }
            session.is_loading = false;
        });
    }

    fn finish_credential_exchange(&self, operation: &'static str, result: Result<User, ApiError>, fallback: &str) -> bool {
        match result {
            Ok(user) if self.tokens.exists() => {
                info!(operation, user = user.display_name(), "authenticated");
                self.state.send_modify(|session| session.become_authenticated(user));
                true
            }
            Ok(_) => {
                warn!(operation, "accepted credentials but no session token was stored");
                self.set_errors(vec![MISSING_TOKEN_MESSAGE.to_owned()]);
                false
            }
            Err(e) => {
                warn!(operation, error = %e, "credential exchange failed");
                self.set_errors(e.messages_or(fallback));
                false
            }
        }
    }

    fn clear_errors(&self) {
        self.state.send_if_modified(|session| {
            if session.last_errors.is_empty() {
                return false;
            }
            session.last_errors.clear();
            true
        });
    }

    fn set_errors(&self, errors: Vec<String>) {
        self.state.send_modify(|session| session.last_errors = errors);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

//! Session lifecycle.
//!
//! ```text
//! Anonymous ──login──► Authenticating ──ok──► Authenticated ──logout──► Anonymous
//!                            │
//!                            └──error──► (previous state restored)
//! ```
//!
//! The session lives only in process memory. Logout makes no server call and
//! a rejected authenticated request never demotes the session on its own.

use secrecy::SecretString;
use shopping_portal_core::{UserId, Username};
use thiserror::Error;
use tracing::{info, instrument};

use crate::error::NotAuthenticated;
use crate::gateway::{ApiGateway, GatewayError};

/// Fallback shown when a signup rejection carries no reason.
pub const SIGNUP_FAILED: &str = "Signup failed";

// =============================================================================
// Errors
// =============================================================================

/// Errors from logging in.
///
/// Both variants render as a generic message; the source is kept for logs.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the credentials.
    #[error("Invalid username/password")]
    InvalidCredentials,

    /// The backend could not be reached or answered with an unusable body.
    #[error("Login failed, please try again")]
    Gateway(#[source] GatewayError),
}

impl AuthError {
    /// Whether the request never reached the backend.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Gateway(GatewayError::Transport(_)))
    }
}

impl From<GatewayError> for AuthError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { .. } => Self::InvalidCredentials,
            other => Self::Gateway(other),
        }
    }
}

/// Errors from registering a new user.
#[derive(Debug, Error)]
pub enum SignupError {
    /// The backend refused the registration.
    #[error("{0}")]
    SignupRejected(String),

    /// The backend could not be reached.
    #[error(transparent)]
    Gateway(GatewayError),
}

impl From<GatewayError> for SignupError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected { .. } => Self::SignupRejected(
                err.reason().unwrap_or_else(|| SIGNUP_FAILED.to_string()),
            ),
            other => Self::Gateway(other),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated identity: the opaque token plus the user it belongs to.
///
/// The token is attached verbatim to every authenticated request and never
/// appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    user_id: UserId,
    username: Option<String>,
}

impl Session {
    /// Create a session from a token and user id.
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user_id,
            username: None,
        }
    }

    /// Attach the username echoed by the login response.
    #[must_use]
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// The session token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// The authenticated user's id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The username, when the backend echoed it.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Where the store is in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session.
    Anonymous,
    /// A login request is in flight.
    Authenticating,
    /// A session is held.
    Authenticated,
}

#[derive(Debug, Default)]
enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

impl SessionState {
    const fn phase(&self) -> SessionPhase {
        match self {
            Self::Anonymous => SessionPhase::Anonymous,
            Self::Authenticating => SessionPhase::Authenticating,
            Self::Authenticated(_) => SessionPhase::Authenticated,
        }
    }
}

/// Holds the current session, if any.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// The current session, if authenticated.
    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// The current session, or [`NotAuthenticated`].
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` unless a session is held.
    pub const fn require(&self) -> Result<&Session, NotAuthenticated> {
        match self.current() {
            Some(session) => Ok(session),
            None => Err(NotAuthenticated),
        }
    }

    /// Register a new user. Never changes the store; call [`Self::login`]
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::SignupRejected` with the server's reason (or a
    /// generic message), or `SignupError::Gateway` on network failure.
    #[instrument(skip(self, gateway, password), fields(username = %username))]
    pub async fn signup(
        &self,
        gateway: &ApiGateway,
        username: &Username,
        password: &SecretString,
    ) -> Result<(), SignupError> {
        gateway.signup(username, password).await?;
        info!("User registered");
        Ok(())
    }

    /// Log in and hold the resulting session.
    ///
    /// On failure the store is left exactly as it was before the call. A
    /// successful login replaces any session already held.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the backend refuses the
    /// credentials, or `AuthError::Gateway` on network or decoding failure.
    #[instrument(skip(self, gateway, password), fields(username = %username))]
    pub async fn login(
        &mut self,
        gateway: &ApiGateway,
        username: &Username,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let previous = std::mem::replace(&mut self.state, SessionState::Authenticating);
        info!(from = ?previous.phase(), to = ?SessionPhase::Authenticating, "Session transition");

        match gateway.login(username, password).await {
            Ok(session) => {
                info!(user_id = %session.user_id(), "Session started");
                self.state = SessionState::Authenticated(session.clone());
                Ok(session)
            }
            Err(err) => {
                self.state = previous;
                info!(to = ?self.phase(), error = %err, "Login failed");
                Err(err.into())
            }
        }
    }

    /// Drop the session. Makes no server call.
    #[instrument(skip(self))]
    pub fn logout(&mut self) {
        let previous = std::mem::take(&mut self.state);
        info!(from = ?previous.phase(), to = ?SessionPhase::Anonymous, "Session transition");
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;
    use shopping_portal_core::UserId;

    use super::*;
    use crate::gateway::Endpoint;

    fn rejected(body: &str) -> GatewayError {
        GatewayError::Rejected {
            endpoint: Endpoint::Signup,
            status: reqwest::StatusCode::BAD_REQUEST,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session::new("super-secret-token", UserId::from(1));
        let debug_output = format!("{session:?}");
        assert!(!debug_output.contains("super-secret-token"));
        assert_eq!(session.token().expose_secret(), "super-secret-token");
    }

    #[test]
    fn test_new_store_is_anonymous() {
        let store = SessionStore::new();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.current().is_none());
        assert_eq!(store.require().err(), Some(NotAuthenticated));
    }

    #[test]
    fn test_logout_from_anonymous_is_a_no_op() {
        let mut store = SessionStore::new();
        store.logout();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn test_logout_clears_session() {
        let mut store = SessionStore {
            state: SessionState::Authenticated(Session::new("T1", UserId::from("U1"))),
        };
        assert_eq!(store.phase(), SessionPhase::Authenticated);
        store.logout();
        assert_eq!(store.phase(), SessionPhase::Anonymous);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_signup_rejection_uses_server_reason() {
        let err = SignupError::from(rejected(r#"{"error":"Username already exists"}"#));
        assert_eq!(err.to_string(), "Username already exists");
    }

    #[test]
    fn test_signup_rejection_falls_back_to_generic_message() {
        let err = SignupError::from(rejected("oops"));
        assert_eq!(err.to_string(), SIGNUP_FAILED);
    }

    #[test]
    fn test_login_rejection_is_invalid_credentials() {
        let err = AuthError::from(rejected(r#"{"error":"Invalid username or password"}"#));
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!err.is_transport());
        assert_eq!(err.to_string(), "Invalid username/password");
    }

    #[tokio::test]
    async fn test_failed_login_leaves_store_untouched() {
        let gateway = crate::test_support::unreachable_gateway();
        let mut store = SessionStore {
            state: SessionState::Authenticated(Session::new("T0", UserId::from(1))),
        };

        let err = store
            .login(
                &gateway,
                &Username::parse("alice").expect("valid username"),
                &SecretString::from("pw"),
            )
            .await
            .expect_err("nothing is listening");

        assert!(err.is_transport());
        assert_eq!(store.phase(), SessionPhase::Authenticated);
        assert_eq!(
            store.current().map(|s| s.token().expose_secret().to_string()),
            Some("T0".to_string())
        );
    }

    #[tokio::test]
    async fn test_signup_transport_failure_is_not_a_rejection() {
        let gateway = crate::test_support::unreachable_gateway();
        let store = SessionStore::new();

        let err = store
            .signup(
                &gateway,
                &Username::parse("alice").expect("valid username"),
                &SecretString::from("pw"),
            )
            .await
            .expect_err("nothing is listening");

        assert!(matches!(err, SignupError::Gateway(GatewayError::Transport(_))));
        assert_eq!(store.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn test_login_malformed_is_generic() {
        let err = AuthError::from(GatewayError::MalformedResponse {
            endpoint: Endpoint::Login,
            reason: "missing field `token`".to_string(),
        });
        assert_eq!(err.to_string(), "Login failed, please try again");
    }
}

//! Authentication extractors and session helpers.
//!
//! The signed-in [`Identity`] lives in the session. Pages resolve it through
//! the `Visitor` extractor; form actions that make no sense without an
//! identity use [`RequireAuth`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use tower_sessions::Session;

use crate::identity::{Identity, LoginStatus};
use crate::models::{PendingLogin, session_keys};

/// How long a started login counts as "logging in".
const LOGIN_PENDING_SECONDS: i64 = 120;

/// Extractor that requires a signed-in identity.
///
/// Redirects to the login flow when there is none.
pub struct RequireAuth(pub Identity);

/// Error returned when authentication is required but nobody is signed in.
pub enum AuthRejection {
    /// Redirect to the login flow (for HTML requests).
    RedirectToLogin,
    /// No session layer installed.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        current_identity(session)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// The identity stored in `session`, if any.
pub async fn current_identity(session: &Session) -> Option<Identity> {
    session
        .get::<Identity>(session_keys::IDENTITY)
        .await
        .ok()
        .flatten()
}

/// Store the signed-in identity.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_identity(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::IDENTITY, identity).await
}

/// Remove and return the signed-in identity (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_identity(
    session: &Session,
) -> Result<Option<Identity>, tower_sessions::session::Error> {
    session.remove::<Identity>(session_keys::IDENTITY).await
}

/// Generate a random CSRF state value.
fn generate_state() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..32)
        .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
        .map(|&byte| char::from(byte))
        .collect()
}

/// Record that a login redirect is being issued and return its CSRF state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn begin_login(session: &Session) -> Result<String, tower_sessions::session::Error> {
    let pending = PendingLogin {
        state: generate_state(),
        started_at: chrono::Utc::now().timestamp(),
    };
    session.insert(session_keys::PENDING_LOGIN, &pending).await?;
    Ok(pending.state)
}

/// Remove and return the pending login (one-time use).
pub async fn take_pending_login(session: &Session) -> Option<PendingLogin> {
    session
        .remove::<PendingLogin>(session_keys::PENDING_LOGIN)
        .await
        .ok()
        .flatten()
}

/// Whether a login is in progress for this session.
pub async fn login_status(session: &Session) -> LoginStatus {
    let pending: Option<PendingLogin> = session
        .get(session_keys::PENDING_LOGIN)
        .await
        .ok()
        .flatten();
    status_of(pending.as_ref(), chrono::Utc::now().timestamp())
}

fn status_of(pending: Option<&PendingLogin>, now: i64) -> LoginStatus {
    match pending {
        Some(pending) if now - pending.started_at < LOGIN_PENDING_SECONDS => {
            LoginStatus::LoggingIn
        }
        _ => LoginStatus::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_state() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_login_status_window() {
        let pending = PendingLogin {
            state: "s".to_string(),
            started_at: 1_000,
        };
        assert_eq!(status_of(None, 1_000), LoginStatus::Idle);
        assert_eq!(status_of(Some(&pending), 1_010), LoginStatus::LoggingIn);
        assert_eq!(
            status_of(Some(&pending), 1_000 + LOGIN_PENDING_SECONDS),
            LoginStatus::Idle
        );
    }
}

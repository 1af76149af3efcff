//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Handlers that cannot degrade gracefully return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::actor::ActorError;
use crate::identity::IdentityError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote actor call failed.
    #[error("Actor error: {0}")]
    Actor(#[from] ActorError),

    /// Identity provider failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Signed in, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Actor(_) | Self::Identity(_) | Self::Session(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Actor(ActorError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Actor(ActorError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Actor(_) | Self::Identity(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Actor(ActorError::Unavailable) => "Service is starting up".to_string(),
            Self::Actor(_) | Self::Identity(_) => "External service error".to_string(),
            Self::Session(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a principal.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(principal: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(principal.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

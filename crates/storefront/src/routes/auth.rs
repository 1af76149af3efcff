//! Identity provider login flow.
//!
//! - Login: store a pending-login state and redirect to the provider
//! - Callback: verify the state, exchange the code, store the identity
//! - Logout: drop the identity and its query scope, then log out at the
//!   provider

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::identity::IdentityError;
use crate::middleware::auth::{begin_login, take_pending_login};
use crate::middleware::{clear_identity, current_identity, push_flash, set_identity};
use crate::models::Flash;
use crate::state::AppState;

/// Pause between clearing a stale identity and starting a fresh login.
pub const LOGIN_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Query parameters from the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

async fn start_login(state: &AppState, session: &Session) -> Result<Response> {
    if current_identity(session).await.is_some() {
        return Err(IdentityError::AlreadyAuthenticated.into());
    }

    let csrf_state = begin_login(session).await?;
    let url = state
        .identity()
        .authorization_url(&state.config().login_callback_url(), &csrf_state);

    Ok(Redirect::to(&url).into_response())
}

/// Drop the session's identity together with its cached queries.
async fn sign_out(state: &AppState, session: &Session) -> Result<()> {
    if let Some(identity) = clear_identity(session).await? {
        state.registry().remove(&identity).await;
    }
    clear_sentry_user();
    Ok(())
}

/// Redirect to the identity provider.
///
/// A leftover identity is cleared and the login retried once after
/// [`LOGIN_RETRY_DELAY`].
///
/// # Route
///
/// `GET /auth/login`
#[instrument(skip(state, session))]
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Response> {
    match start_login(&state, &session).await {
        Err(AppError::Identity(IdentityError::AlreadyAuthenticated)) => {
            tracing::info!("Identity already present, clearing before login");
            sign_out(&state, &session).await?;
            tokio::time::sleep(LOGIN_RETRY_DELAY).await;
            start_login(&state, &session).await
        }
        other => other,
    }
}

async fn fail_login(session: &Session, message: &str) -> Response {
    push_flash(session, Flash::error(message)).await;
    Redirect::to("/").into_response()
}

/// Handle the provider callback.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip(state, session, query))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    // One-time use, also ends the "Logging in..." state
    let pending = take_pending_login(&session).await;

    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!(%error, %description, "Identity provider returned an error");
        return Ok(fail_login(&session, "Login was cancelled or failed").await);
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("Login callback missing code or state");
        return Ok(fail_login(&session, "Login failed, please try again").await);
    };

    if pending.as_ref().map(|p| p.state.as_str()) != Some(returned_state.as_str()) {
        tracing::warn!("Login state mismatch");
        return Ok(fail_login(&session, "Login failed, please try again").await);
    }

    let identity = match state
        .identity()
        .exchange_code(&code, &state.config().login_callback_url())
        .await
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!(error = %e, "Failed to exchange login code");
            return Ok(fail_login(&session, "Login failed, please try again").await);
        }
    };

    set_identity(&session, &identity).await?;
    set_sentry_user(identity.principal());
    tracing::info!(principal = %identity.principal(), "User authenticated");

    Ok(Redirect::to("/").into_response())
}

/// Log out locally and at the provider.
///
/// # Route
///
/// `POST /auth/logout`
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    sign_out(&state, &session).await?;

    let post_logout_uri = format!("{}/", state.config().base_url.trim_end_matches('/'));
    let url = state.identity().logout_url(&post_logout_uri);

    Ok(Redirect::to(&url).into_response())
}

//! Per-request visitor context and the page shell.
//!
//! Every page renders inside the same frame: header with navigation, cart
//! badge and login button, a notification area, and the footer. [`Shell`]
//! carries what that frame needs; [`Visitor`] resolves who is asking and
//! which actor handle and query scope serve them.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use foodhub_core::{UserProfile, transforms};

use crate::actor::FoodActor;
use crate::identity::{Identity, LoginStatus};
use crate::middleware::auth::{current_identity, login_status};
use crate::middleware::take_flash;
use crate::models::Flash;
use crate::seed::SeedOutcome;
use crate::state::AppState;
use crate::sync::{QueryClient, SessionScope};

/// Who is making the request, and the handles that serve them.
pub struct Visitor {
    pub session: Session,
    pub identity: Option<Identity>,
    pub scope: Arc<SessionScope>,
    pub actor: Option<Arc<dyn FoodActor>>,
}

impl Visitor {
    #[must_use]
    pub fn queries(&self) -> &QueryClient {
        self.scope.queries()
    }

    /// A fresh handle for one query or mutation.
    #[must_use]
    pub fn actor(&self) -> Option<Arc<dyn FoodActor>> {
        self.actor.clone()
    }
}

impl FromRequestParts<AppState> for Visitor {
    type Rejection = <Session as FromRequestParts<AppState>>::Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        let identity = current_identity(&session).await;
        let scope = state.scope(identity.as_ref()).await;
        let actor = state.actor_for(identity.as_ref());

        Ok(Self {
            session,
            identity,
            scope,
            actor,
        })
    }
}

/// State of the header login button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginButton {
    pub label: String,
    pub disabled: bool,
    pub authenticated: bool,
}

impl LoginButton {
    #[must_use]
    pub fn new(status: LoginStatus, authenticated: bool, profile: Option<&UserProfile>) -> Self {
        let label = if status.is_logging_in() && !authenticated {
            "Logging in...".to_string()
        } else if authenticated {
            profile
                .map(|p| p.name.trim())
                .filter(|name| !name.is_empty())
                .unwrap_or("Logout")
                .to_string()
        } else {
            "Login".to_string()
        };

        Self {
            label,
            disabled: status.is_logging_in() && !authenticated,
            authenticated,
        }
    }
}

/// Data shared by every page's frame.
#[derive(Debug, Clone)]
pub struct Shell {
    pub authenticated: bool,
    pub is_admin: bool,
    /// Backend reachable.
    pub connected: bool,
    pub cart_count: u64,
    pub login: LoginButton,
    /// Signed in, profile loaded, and no name saved yet.
    pub needs_profile: bool,
    pub flash: Option<Flash>,
}

impl Shell {
    /// Load the frame for `visitor`, consuming any queued notification.
    ///
    /// Administrators also get the catalog seeded in the background.
    pub async fn load(state: &AppState, visitor: &Visitor) -> Self {
        let flash = take_flash(&visitor.session).await;
        let status = login_status(&visitor.session).await;
        let authenticated = visitor.identity.is_some();

        if !authenticated {
            return Self {
                authenticated,
                is_admin: false,
                connected: visitor.actor.is_some(),
                cart_count: 0,
                login: LoginButton::new(status, false, None),
                needs_profile: false,
                flash,
            };
        }

        let queries = visitor.queries();
        let profile = queries.current_user_profile(visitor.actor()).await;
        let is_admin = queries.is_admin(visitor.actor()).await.data;
        let cart = queries.cart(visitor.actor()).await;

        if is_admin && !visitor.scope.is_seeded() {
            spawn_seeding(state, visitor);
        }

        Self {
            authenticated,
            is_admin,
            connected: visitor.actor.is_some(),
            cart_count: transforms::cart_item_count(&cart.data),
            login: LoginButton::new(status, true, profile.data.as_ref()),
            needs_profile: profile.fetched && profile.data.is_none(),
            flash,
        }
    }
}

fn spawn_seeding(state: &AppState, visitor: &Visitor) {
    let state = state.clone();
    let scope = Arc::clone(&visitor.scope);
    let identity = visitor.identity.clone();
    let actor = visitor.actor();

    tokio::spawn(async move {
        match state.seeder().run(&scope, identity.as_ref(), actor).await {
            Ok(SeedOutcome::Completed { added }) => {
                tracing::debug!(added, "Catalog seeding finished");
            }
            Ok(SeedOutcome::Skipped(reason)) => {
                tracing::debug!(?reason, "Catalog seeding skipped");
            }
            Err(e) => tracing::error!(error = %e, "Catalog seeding failed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_button_labels() {
        let named = UserProfile {
            name: "Asha".to_string(),
        };
        let unnamed = UserProfile {
            name: "  ".to_string(),
        };

        let idle = LoginButton::new(LoginStatus::Idle, false, None);
        assert_eq!(idle.label, "Login");
        assert!(!idle.disabled);

        let busy = LoginButton::new(LoginStatus::LoggingIn, false, None);
        assert_eq!(busy.label, "Logging in...");
        assert!(busy.disabled);

        let signed_in = LoginButton::new(LoginStatus::Idle, true, Some(&named));
        assert_eq!(signed_in.label, "Asha");
        assert!(signed_in.authenticated);

        assert_eq!(
            LoginButton::new(LoginStatus::Idle, true, Some(&unnamed)).label,
            "Logout"
        );
        assert_eq!(LoginButton::new(LoginStatus::Idle, true, None).label, "Logout");
    }
}

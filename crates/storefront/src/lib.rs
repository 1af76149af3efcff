//! FoodHub storefront library.
//!
//! Everything the binary serves, exposed for tests: configuration, the
//! remote actor and identity clients, the data-sync layer, the catalog
//! seeder and the route handlers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actor;
pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod gate;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod shell;
pub mod state;
pub mod sync;

use axum::{Router, middleware::from_fn_with_state};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::service::CookieController;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = "crates/storefront/static";

/// Directory served under `/assets` (menu and category images).
pub const ASSETS_DIR: &str = "crates/storefront/static/assets";

/// Assemble the application router over any session store and cookie mode.
pub fn app<S, C>(state: AppState, session_layer: SessionManagerLayer<S, C>) -> Router
where
    S: SessionStore + Clone,
    C: CookieController + Sync,
{
    routes::routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

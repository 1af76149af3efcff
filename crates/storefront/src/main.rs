//! FoodHub Storefront - server-rendered food ordering site.
//!
//! # Architecture
//!
//! - Axum web framework, plain HTML forms, no client-side scripts
//! - Askama templates for server-side rendering
//! - Remote backend actor for catalog, cart, orders and profiles
//! - External identity provider for login
//! - `PostgreSQL` for session storage only

#![cfg_attr(not(test), forbid(unsafe_code))]

use foodhub_storefront::config::StorefrontConfig;
use foodhub_storefront::middleware::create_session_layer;
use foodhub_storefront::state::AppState;
use foodhub_storefront::{app, db};
use sentry::integrations::tracing as sentry_tracing;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "foodhub_storefront=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let store = PostgresStore::new(pool.clone());
    store
        .migrate()
        .await
        .expect("Failed to migrate session store");

    let state = AppState::new(config.clone(), pool);

    let _probe = state
        .connector()
        .start_background_probe(config.backend.probe_interval);
    tracing::info!(backend = %config.backend.url, "Backend probe started");

    let session_layer = create_session_layer(store, state.config());

    let app = app(state, session_layer)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

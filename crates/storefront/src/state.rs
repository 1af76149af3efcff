//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::actor::{ActorConnector, ActorTransport, FoodActor, HttpActor};
use crate::config::StorefrontConfig;
use crate::identity::{Identity, IdentityClient};
use crate::middleware::security_headers::content_security_policy;
use crate::seed::CatalogSeeder;
use crate::sync::{QueryRegistry, SessionScope};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend connection and per-identity caches.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    connector: ActorConnector,
    registry: QueryRegistry,
    identity: IdentityClient,
    seeder: CatalogSeeder,
    csp: String,
}

impl AppState {
    /// Create application state talking to the configured backend over HTTP.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let transport: Arc<dyn ActorTransport> = Arc::new(HttpActor::new(&config.backend));
        Self::with_transport(config, pool, transport)
    }

    /// Create application state over any actor transport.
    #[must_use]
    pub fn with_transport(
        config: StorefrontConfig,
        pool: PgPool,
        transport: Arc<dyn ActorTransport>,
    ) -> Self {
        let identity = IdentityClient::new(&config.identity);
        let registry = QueryRegistry::new(config.sync);
        let csp = content_security_policy(
            config
                .identity
                .provider_url
                .origin()
                .ascii_serialization()
                .as_str(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                connector: ActorConnector::new(transport),
                registry,
                identity,
                seeder: CatalogSeeder::default(),
                csp,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn connector(&self) -> &ActorConnector {
        &self.inner.connector
    }

    #[must_use]
    pub fn registry(&self) -> &QueryRegistry {
        &self.inner.registry
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    #[must_use]
    pub fn seeder(&self) -> &CatalogSeeder {
        &self.inner.seeder
    }

    #[must_use]
    pub fn content_security_policy(&self) -> &str {
        &self.inner.csp
    }

    /// Actor bound to `identity`, or `None` while the backend is unreachable.
    #[must_use]
    pub fn actor_for(&self, identity: Option<&Identity>) -> Option<Arc<dyn FoodActor>> {
        self.inner.connector.actor_for(identity)
    }

    /// Query scope for `identity`.
    pub async fn scope(&self, identity: Option<&Identity>) -> Arc<SessionScope> {
        self.inner.registry.scope(identity).await
    }
}

//! Per-identity query scopes.
//!
//! Cached reads are only valid for the identity that made them, so every
//! principal gets its own [`SessionScope`]; anonymous visitors share one.
//! Scopes are created on first use, expire after a period of inactivity and
//! are dropped explicitly on logout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use moka::future::Cache;

use foodhub_core::Principal;

use super::client::QueryClient;
use crate::config::SyncConfig;
use crate::identity::Identity;

/// Registry key: one scope per principal plus the anonymous scope.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum ScopeKey {
    Anonymous,
    User(Principal),
}

impl ScopeKey {
    fn of(identity: Option<&Identity>) -> Self {
        identity.map_or(Self::Anonymous, |identity| {
            Self::User(identity.principal().clone())
        })
    }
}

/// Everything cached for one identity.
pub struct SessionScope {
    queries: QueryClient,
    seeding: AtomicBool,
    seeded: AtomicBool,
}

impl SessionScope {
    fn new(config: &SyncConfig) -> Self {
        Self {
            queries: QueryClient::new(config.stale_time),
            seeding: AtomicBool::new(false),
            seeded: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn queries(&self) -> &QueryClient {
        &self.queries
    }

    /// Whether catalog seeding completed in this scope.
    #[must_use]
    pub fn is_seeded(&self) -> bool {
        self.seeded.load(Ordering::Acquire)
    }

    /// Claim the seeding run. Returns `false` if a run is already active or
    /// seeding already completed.
    pub fn begin_seeding(&self) -> bool {
        !self.is_seeded()
            && self
                .seeding
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Release the seeding claim, recording completion on success.
    pub fn finish_seeding(&self, completed: bool) {
        if completed {
            self.seeded.store(true, Ordering::Release);
        }
        self.seeding.store(false, Ordering::Release);
    }
}

/// Lazily created, idle-expiring scopes keyed by identity.
#[derive(Clone)]
pub struct QueryRegistry {
    scopes: Cache<ScopeKey, Arc<SessionScope>>,
    config: SyncConfig,
}

impl QueryRegistry {
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        let scopes = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(config.scope_idle)
            .build();
        Self { scopes, config }
    }

    /// Scope for `identity`, created on first use.
    pub async fn scope(&self, identity: Option<&Identity>) -> Arc<SessionScope> {
        let config = &self.config;
        self.scopes
            .get_with(ScopeKey::of(identity), async {
                tracing::debug!("Creating query scope");
                Arc::new(SessionScope::new(config))
            })
            .await
    }

    /// Tear down the scope for `identity` (logout).
    pub async fn remove(&self, identity: &Identity) {
        let key = ScopeKey::of(Some(identity));
        if let Some(scope) = self.scopes.remove(&key).await {
            scope.queries.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actor::fake::FakeActor;
    use crate::sync::QueryKey;

    fn registry() -> QueryRegistry {
        QueryRegistry::new(SyncConfig {
            stale_time: Duration::from_secs(60),
            scope_idle: Duration::from_secs(600),
        })
    }

    #[tokio::test]
    async fn test_same_identity_shares_scope() {
        let registry = registry();
        let alice = Identity::new(Principal::new("alice"), "a");
        let first = registry.scope(Some(&alice)).await;
        let second = registry.scope(Some(&alice)).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_identities_are_isolated() {
        let registry = registry();
        let fake = FakeActor::new();
        let alice = Identity::new(Principal::new("alice"), "a");
        let bob = Identity::new(Principal::new("bob"), "b");

        let alice_scope = registry.scope(Some(&alice)).await;
        alice_scope
            .queries()
            .cart(Some(fake.handle(Some(&alice))))
            .await;

        let bob_scope = registry.scope(Some(&bob)).await;
        let anonymous = registry.scope(None).await;
        assert!(!Arc::ptr_eq(&alice_scope, &bob_scope));
        assert!(!Arc::ptr_eq(&alice_scope, &anonymous));
        assert!(!alice_scope.queries().is_stale(&QueryKey::Cart));
        assert!(bob_scope.queries().is_stale(&QueryKey::Cart));
    }

    #[tokio::test]
    async fn test_remove_drops_cached_reads() {
        let registry = registry();
        let fake = FakeActor::new();
        let alice = Identity::new(Principal::new("alice"), "a");

        let scope = registry.scope(Some(&alice)).await;
        scope.queries().cart(Some(fake.handle(Some(&alice)))).await;
        registry.remove(&alice).await;

        assert!(scope.queries().is_stale(&QueryKey::Cart));
        let fresh = registry.scope(Some(&alice)).await;
        assert!(!Arc::ptr_eq(&scope, &fresh));
    }

    #[test]
    fn test_seeding_claim() {
        let scope = SessionScope::new(&SyncConfig::default());
        assert!(scope.begin_seeding());
        assert!(!scope.begin_seeding());

        scope.finish_seeding(false);
        assert!(!scope.is_seeded());
        assert!(scope.begin_seeding());

        scope.finish_seeding(true);
        assert!(scope.is_seeded());
        assert!(!scope.begin_seeding());
    }
}

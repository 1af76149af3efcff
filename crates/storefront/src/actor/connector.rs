//! Actor availability.
//!
//! The storefront starts before the backend is necessarily reachable. The
//! connector probes the backend in the background and hands out caller-bound
//! actor handles only once a probe has succeeded. Until then every consumer
//! sees "no actor" and degrades instead of failing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{ActorError, FoodActor};
use crate::identity::Identity;

/// A way of reaching the backend.
#[async_trait]
pub trait ActorTransport: Send + Sync {
    /// Check that the backend answers at all.
    async fn probe(&self) -> Result<(), ActorError>;

    /// Produce an actor handle whose calls are made on behalf of `caller`.
    fn bind(&self, caller: Option<&Identity>) -> Arc<dyn FoodActor>;
}

/// Hands out actor handles once the backend is known to be reachable.
#[derive(Clone)]
pub struct ActorConnector {
    inner: Arc<ConnectorInner>,
}

struct ConnectorInner {
    transport: Arc<dyn ActorTransport>,
    connected: AtomicBool,
}

impl ActorConnector {
    #[must_use]
    pub fn new(transport: Arc<dyn ActorTransport>) -> Self {
        Self {
            inner: Arc::new(ConnectorInner {
                transport,
                connected: AtomicBool::new(false),
            }),
        }
    }

    /// Whether a probe has succeeded.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Actor handle bound to `identity`, or `None` while the backend is
    /// unreachable.
    #[must_use]
    pub fn actor_for(&self, identity: Option<&Identity>) -> Option<Arc<dyn FoodActor>> {
        self.is_connected()
            .then(|| self.inner.transport.bind(identity))
    }

    /// Probe once, marking the connector live on success.
    pub async fn connect(&self) -> Result<(), ActorError> {
        self.inner.transport.probe().await?;
        if !self.inner.connected.swap(true, Ordering::AcqRel) {
            tracing::info!("Backend actor connected");
        }
        Ok(())
    }

    /// Spawn a task that probes every `interval` until the first success.
    pub fn start_background_probe(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let connector = self.clone();
        tokio::spawn(async move {
            loop {
                match connector.connect().await {
                    Ok(()) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, retry_in = ?interval, "Backend actor not reachable");
                    }
                }
                tokio::time::sleep(interval).await;
            }
        })
    }
}

//! One-shot notifications carried across a redirect.

use tower_sessions::Session;

use crate::models::{Flash, session_keys};

/// Queue `flash` for the next rendered page.
///
/// Failures are logged; a lost notification never fails the request.
pub async fn push_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, &flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the queued notification, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(session_keys::FLASH)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        push_flash(&session, Flash::success("Added to cart!")).await;

        let flash = take_flash(&session).await.unwrap();
        assert_eq!(flash, Flash::success("Added to cart!"));
        assert!(take_flash(&session).await.is_none());
    }
}

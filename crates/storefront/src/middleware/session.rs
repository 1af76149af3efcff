//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! cookie is signed with a key derived from `FOODHUB_SESSION_SECRET`.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "foodhub_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Cookie signing key: SHA-512 of the secret gives the 64 bytes `Key` needs.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer over an already migrated store.
#[must_use]
pub fn create_session_layer(
    store: PostgresStore,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_follows_secret() {
        let secret = SecretString::from("kT9#mQ2vL7xR4pZ8wN3jF6hB1cY5dG0s");
        let same = SecretString::from("kT9#mQ2vL7xR4pZ8wN3jF6hB1cY5dG0s");
        let other = SecretString::from("pW4@nE8rT2yU6iO0aS3dF7gH1jK5lZ9x");

        assert!(signing_key(&secret) == signing_key(&same));
        assert!(signing_key(&secret) != signing_key(&other));
        assert_eq!(signing_key(&secret).signing().len(), 32);
    }
}

//! Identity provider client.
//!
//! Login is redirect based:
//!
//! 1. Build the authorization URL with [`IdentityClient::authorization_url`]
//! 2. Redirect the visitor to the provider
//! 3. The provider redirects back with an authorization code
//! 4. Exchange the code with [`IdentityClient::exchange_code`] for an [`Identity`]
//!
//! The resulting identity is stored in the session and every actor call made
//! on the visitor's behalf carries its token.

use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use foodhub_core::Principal;

use crate::config::IdentityConfig;

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token exchange rejected by the provider.
    #[error("Token exchange failed: {0}")]
    Exchange(String),

    /// A login was started while an identity is already present.
    #[error("User is already authenticated")]
    AlreadyAuthenticated,
}

/// An authenticated caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    principal: Principal,
    token: String,
}

impl Identity {
    #[must_use]
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            principal,
            token: token.into(),
        }
    }

    #[must_use]
    pub const fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Bearer token presented to the backend.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Progress of the interactive login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginStatus {
    #[default]
    Idle,
    /// Redirected to the provider, callback not yet received.
    LoggingIn,
}

impl LoginStatus {
    #[must_use]
    pub const fn is_logging_in(self) -> bool {
        matches!(self, Self::LoggingIn)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    principal: String,
}

/// Client for the identity provider.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    provider: String,
    client_id: String,
    client_secret: SecretString,
}

impl IdentityClient {
    #[must_use]
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            inner: Arc::new(IdentityClientInner {
                client: reqwest::Client::new(),
                provider: config.provider_url.as_str().trim_end_matches('/').to_string(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            }),
        }
    }

    /// Authorization URL that begins an interactive login.
    ///
    /// `state` is stored in the session and checked on callback.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/authorize?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            state={}",
            self.inner.provider,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// URL that ends the provider session and returns to `post_logout_redirect_uri`.
    #[must_use]
    pub fn logout_url(&self, post_logout_redirect_uri: &str) -> String {
        format!(
            "{}/logout?client_id={}&post_logout_redirect_uri={}",
            self.inner.provider,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(post_logout_redirect_uri)
        )
    }

    /// Exchange an authorization code for an identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or refuses the code.
    #[tracing::instrument(skip(self, code))]
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Identity, IdentityError> {
        let url = format!("{}/token", self.inner.provider);

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.client_id.as_str()),
            ("client_secret", self.inner.client_secret.expose_secret()),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self.inner.client.post(&url).form(&params).send().await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::Exchange(text.chars().take(200).collect()));
        }

        let token: TokenResponse = response.json().await?;
        Ok(Identity::new(
            Principal::new(token.principal),
            token.access_token,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> IdentityClient {
        IdentityClient::new(&crate::config::tests::test_config().identity)
    }

    #[test]
    fn test_authorization_url_encodes_parameters() {
        let url = client().authorization_url("http://localhost:3000/auth/callback", "a b");
        assert!(url.starts_with("https://identity.test/authorize?"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
        assert!(url.contains("state=a%20b"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_logout_url() {
        let url = client().logout_url("http://localhost:3000/");
        assert!(url.contains("/logout?"));
        assert!(url.contains("post_logout_redirect_uri=http%3A%2F%2Flocalhost%3A3000%2F"));
    }

    #[test]
    fn test_identity_debug_redacts_token() {
        let identity = Identity::new(Principal::new("aaaaa-aa"), "secret-token");
        let debug = format!("{identity:?}");
        assert!(debug.contains("aaaaa-aa"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn test_identity_session_roundtrip() {
        let identity = Identity::new(Principal::new("user-1"), "t");
        let json = serde_json::to_string(&identity).unwrap();
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_login_status_default_idle() {
        assert_eq!(LoginStatus::default(), LoginStatus::Idle);
        assert!(LoginStatus::LoggingIn.is_logging_in());
    }
}

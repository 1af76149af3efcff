//! Session-related types.
//!
//! Types stored in the session for identity and notification state.

use serde::{Deserialize, Serialize};

/// Login started but not yet completed.
///
/// Holds the CSRF state sent to the identity provider. While it is recent the
/// visitor's login status is "logging in".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingLogin {
    pub state: String,
    /// Unix timestamp (seconds) when the redirect was issued.
    pub started_at: i64,
}

/// Severity of a one-shot notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// Transient notification shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "flash flash-success",
            FlashKind::Error => "flash flash-error",
        }
    }
}

/// Session keys.
pub mod keys {
    /// The signed-in identity.
    pub const IDENTITY: &str = "identity";

    /// Pending login (CSRF state and start time).
    pub const PENDING_LOGIN: &str = "pending_login";

    /// One-shot notification for the next page.
    pub const FLASH: &str = "flash";
}

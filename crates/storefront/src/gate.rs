//! Authentication gate for pages that only make sense when signed in.

use crate::identity::Identity;

/// Page body for an authentication-gated route.
///
/// Exactly two states: the login prompt when nobody is signed in, the page's
/// own content otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    LoginPrompt,
    Content(T),
}

impl<T> Gated<T> {
    /// Gate on `identity`, building the content only when it is present.
    pub async fn load<F, Fut>(identity: Option<&Identity>, content: F) -> Self
    where
        F: FnOnce(Identity) -> Fut,
        Fut: Future<Output = T>,
    {
        match identity {
            Some(identity) => Self::Content(content(identity.clone()).await),
            None => Self::LoginPrompt,
        }
    }

    /// Content, or `None` when the prompt is shown.
    #[must_use]
    pub const fn content(&self) -> Option<&T> {
        match self {
            Self::Content(content) => Some(content),
            Self::LoginPrompt => None,
        }
    }
}

impl<T, E> Gated<Result<T, E>> {
    /// Lift a fallible page body out of the gate.
    ///
    /// # Errors
    ///
    /// Returns the content's error when signed in and loading failed.
    pub fn transpose(self) -> Result<Gated<T>, E> {
        match self {
            Self::LoginPrompt => Ok(Gated::LoginPrompt),
            Self::Content(content) => content.map(Gated::Content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodhub_core::Principal;

    #[tokio::test]
    async fn test_prompt_without_identity() {
        let gated = Gated::load(None, |_| async { 1 }).await;
        assert_eq!(gated, Gated::LoginPrompt);
        assert!(gated.content().is_none());
    }

    #[tokio::test]
    async fn test_content_with_identity() {
        let identity = Identity::new(Principal::new("user"), "t");
        let gated = Gated::load(Some(&identity), |id| async move {
            id.principal().to_string()
        })
        .await;
        assert_eq!(gated.content().map(String::as_str), Some("user"));
    }

    #[tokio::test]
    async fn test_transpose_keeps_prompt_and_surfaces_errors() {
        let prompt: Gated<Result<u8, &str>> = Gated::load(None, |_| async { Err("boom") }).await;
        assert_eq!(prompt.transpose(), Ok(Gated::LoginPrompt));

        let identity = Identity::new(Principal::new("user"), "t");
        let failed: Gated<Result<u8, &str>> =
            Gated::load(Some(&identity), |_| async { Err("boom") }).await;
        assert_eq!(failed.transpose(), Err("boom"));
    }
}

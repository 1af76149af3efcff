//! Remote actor client.
//!
//! The backend is a remote actor exposing catalog, cart, order and identity
//! operations as asynchronous request/response calls. [`FoodActor`] is the
//! typed surface the rest of the storefront talks to; [`HttpActor`] is the
//! production transport and [`ActorConnector`] decides whether a live actor is
//! available at all.
//!
//! # Architecture
//!
//! - The backend owns every entity; the storefront never persists catalog,
//!   cart or order data itself
//! - Each call is bound to one caller identity (or anonymous)
//! - All calls may fail; failures are scoped to the single call

mod connector;
mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use connector::{ActorConnector, ActorTransport};
pub use http::HttpActor;

use async_trait::async_trait;
use thiserror::Error;

use foodhub_core::{
    CartItem, Category, FoodId, FoodItem, OrderId, OrderRecord, OrderStatus, Price, Principal,
    UserProfile, UserRole,
};

/// Errors that can occur when calling the remote actor.
#[derive(Debug, Error)]
pub enum ActorError {
    /// No live connection to the backend has been established yet.
    #[error("Actor not available")]
    Unavailable,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The actor rejected the call (authorization, validation, business rule).
    #[error("Call rejected: {0}")]
    Rejected(String),
}

impl ActorError {
    /// Message suitable for a user-facing notification.
    ///
    /// Rejections carry the backend's own explanation; transport failures
    /// fall back to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(message) if !message.is_empty() => message.clone(),
            Self::Unavailable => "Service is not available yet, please try again".to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Typed interface to the remote food ordering actor.
///
/// Every method is one remote call made on behalf of the identity the actor
/// handle was bound to.
#[async_trait]
pub trait FoodActor: Send + Sync {
    // Catalog

    /// Add an item; the `id` field is ignored and the assigned id returned.
    async fn add_food_item(&self, item: FoodItem) -> Result<FoodId, ActorError>;
    async fn update_food_item(&self, item: FoodItem) -> Result<(), ActorError>;
    async fn delete_food_item(&self, id: FoodId) -> Result<(), ActorError>;
    async fn get_all_food_items(&self) -> Result<Vec<FoodItem>, ActorError>;
    async fn get_food_items_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<FoodItem>, ActorError>;

    // Cart

    async fn get_cart(&self) -> Result<Vec<CartItem>, ActorError>;
    async fn add_to_cart(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError>;
    async fn update_cart_item(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError>;
    async fn remove_from_cart(&self, food_id: FoodId) -> Result<(), ActorError>;
    /// Authoritative cart total.
    async fn calculate_cart_total(&self) -> Result<Price, ActorError>;

    // Orders

    async fn place_order(&self) -> Result<OrderId, ActorError>;
    async fn get_order_history(&self) -> Result<Vec<OrderRecord>, ActorError>;
    async fn get_all_orders_by_total_price_desc(&self) -> Result<Vec<OrderRecord>, ActorError>;
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ActorError>;

    // Profiles and roles

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError>;
    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), ActorError>;
    async fn get_user_profile(&self, user: Principal) -> Result<Option<UserProfile>, ActorError>;
    async fn is_caller_admin(&self) -> Result<bool, ActorError>;
    async fn get_caller_user_role(&self) -> Result<UserRole, ActorError>;
    async fn assign_caller_user_role(
        &self,
        user: Principal,
        role: UserRole,
    ) -> Result<(), ActorError>;
}

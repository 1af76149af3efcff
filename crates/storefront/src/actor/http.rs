//! JSON-over-HTTP transport for the remote actor.
//!
//! Every method is `POST {backend}/api/{methodName}` with a JSON array of
//! positional arguments. Replies are `{"ok": value}` or `{"err": message}`.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use foodhub_core::{
    CartItem, Category, FoodId, FoodItem, OrderId, OrderRecord, OrderStatus, Price, Principal,
    UserProfile, UserRole,
};

use super::{ActorError, ActorTransport, FoodActor};
use crate::config::BackendConfig;
use crate::identity::Identity;

/// Argument list for methods without parameters; serializes as `[]`.
const NO_ARGS: [(); 0] = [];

/// Reply envelope returned by every backend method.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Reply<T> {
    Ok(T),
    Err(String),
}

/// HTTP client for the food ordering actor.
///
/// Cheap to clone; clones share the connection pool. A handle returned by
/// [`ActorTransport::bind`] carries the caller's bearer token.
#[derive(Clone)]
pub struct HttpActor {
    inner: Arc<HttpActorInner>,
    caller: Option<SecretString>,
}

struct HttpActorInner {
    client: reqwest::Client,
    base: String,
}

impl HttpActor {
    /// Create an anonymous actor handle.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(HttpActorInner {
                client: reqwest::Client::new(),
                base: config.url.as_str().trim_end_matches('/').to_string(),
            }),
            caller: None,
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/api/{method}", self.inner.base)
    }

    /// Execute one actor method.
    async fn call<A, T>(&self, method: &'static str, args: A) -> Result<T, ActorError>
    where
        A: Serialize + Send,
        T: DeserializeOwned,
    {
        let mut request = self.inner.client.post(self.endpoint(method)).json(&args);
        if let Some(token) = &self.caller {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ActorError::RateLimited(retry_after));
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                method,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ActorError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let reply: Reply<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                method,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend reply"
            );
            ActorError::Parse(e)
        })?;

        match reply {
            Reply::Ok(value) => Ok(value),
            Reply::Err(message) => {
                debug!(method, %message, "Backend rejected call");
                Err(ActorError::Rejected(message))
            }
        }
    }
}

#[async_trait]
impl ActorTransport for HttpActor {
    async fn probe(&self) -> Result<(), ActorError> {
        let response = self.inner.client.get(self.endpoint("status")).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ActorError::Status {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    fn bind(&self, caller: Option<&Identity>) -> Arc<dyn FoodActor> {
        Arc::new(Self {
            inner: Arc::clone(&self.inner),
            caller: caller.map(|identity| SecretString::from(identity.token().to_string())),
        })
    }
}

#[async_trait]
impl FoodActor for HttpActor {
    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn add_food_item(&self, item: FoodItem) -> Result<FoodId, ActorError> {
        self.call("addFoodItem", (item,)).await
    }

    #[instrument(skip(self, item), fields(id = %item.id))]
    async fn update_food_item(&self, item: FoodItem) -> Result<(), ActorError> {
        self.call("updateFoodItem", (item,)).await
    }

    #[instrument(skip(self))]
    async fn delete_food_item(&self, id: FoodId) -> Result<(), ActorError> {
        self.call("deleteFoodItem", (id,)).await
    }

    #[instrument(skip(self))]
    async fn get_all_food_items(&self) -> Result<Vec<FoodItem>, ActorError> {
        let items: Vec<FoodItem> = self.call("getAllFoodItems", NO_ARGS).await?;
        debug!(count = items.len(), "Received food items");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn get_food_items_by_category(
        &self,
        category: Category,
    ) -> Result<Vec<FoodItem>, ActorError> {
        self.call("getFoodItemsByCategory", (category,)).await
    }

    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Vec<CartItem>, ActorError> {
        self.call("getCart", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn add_to_cart(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError> {
        self.call("addToCart", (food_id, quantity)).await
    }

    #[instrument(skip(self))]
    async fn update_cart_item(&self, food_id: FoodId, quantity: u64) -> Result<(), ActorError> {
        self.call("updateCartItem", (food_id, quantity)).await
    }

    #[instrument(skip(self))]
    async fn remove_from_cart(&self, food_id: FoodId) -> Result<(), ActorError> {
        self.call("removeFromCart", (food_id,)).await
    }

    #[instrument(skip(self))]
    async fn calculate_cart_total(&self) -> Result<Price, ActorError> {
        self.call("calculateCartTotal", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn place_order(&self) -> Result<OrderId, ActorError> {
        self.call("placeOrder", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn get_order_history(&self) -> Result<Vec<OrderRecord>, ActorError> {
        self.call("getOrderHistory", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn get_all_orders_by_total_price_desc(&self) -> Result<Vec<OrderRecord>, ActorError> {
        self.call("getAllOrdersByTotalPriceDesc", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ActorError> {
        self.call("updateOrderStatus", (order_id, status)).await
    }

    #[instrument(skip(self))]
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>, ActorError> {
        self.call("getCallerUserProfile", NO_ARGS).await
    }

    #[instrument(skip(self, profile))]
    async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<(), ActorError> {
        self.call("saveCallerUserProfile", (profile,)).await
    }

    #[instrument(skip(self))]
    async fn get_user_profile(&self, user: Principal) -> Result<Option<UserProfile>, ActorError> {
        self.call("getUserProfile", (user,)).await
    }

    #[instrument(skip(self))]
    async fn is_caller_admin(&self) -> Result<bool, ActorError> {
        self.call("isCallerAdmin", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn get_caller_user_role(&self) -> Result<UserRole, ActorError> {
        self.call("getCallerUserRole", NO_ARGS).await
    }

    #[instrument(skip(self))]
    async fn assign_caller_user_role(
        &self,
        user: Principal,
        role: UserRole,
    ) -> Result<(), ActorError> {
        self.call("assignCallerUserRole", (user, role)).await
    }
}

//! One typed read accessor per remote query and one invoker per mutation.

use std::sync::Arc;

use foodhub_core::{
    CartItem, Category, FoodId, FoodItem, OrderId, OrderRecord, OrderStatus, Price, Principal,
    UserProfile, UserRole,
};

use super::client::{QueryClient, QueryState};
use super::invalidation::Mutation;
use super::keys::QueryKey;
use crate::actor::{ActorError, FoodActor};

type Actor = Option<Arc<dyn FoodActor>>;

// ─────────────────────────────────────────────────────────────────────────────
// Reads
// ─────────────────────────────────────────────────────────────────────────────

impl QueryClient {
    pub async fn food_items(&self, actor: Actor) -> QueryState<Vec<FoodItem>> {
        self.query(actor, QueryKey::FoodItems, |a| async move {
            a.get_all_food_items().await
        })
        .await
    }

    /// Catalog without waiting; starts a background fetch when stale.
    pub fn observe_food_items(&self, actor: Actor) -> QueryState<Vec<FoodItem>> {
        self.observe(actor, QueryKey::FoodItems, |a| async move {
            a.get_all_food_items().await
        })
    }

    pub async fn food_items_by_category(
        &self,
        actor: Actor,
        category: Category,
    ) -> QueryState<Vec<FoodItem>> {
        self.query(
            actor,
            QueryKey::FoodItemsByCategory(category),
            move |a| async move { a.get_food_items_by_category(category).await },
        )
        .await
    }

    pub async fn cart(&self, actor: Actor) -> QueryState<Vec<CartItem>> {
        self.query(actor, QueryKey::Cart, |a| async move { a.get_cart().await })
            .await
    }

    /// Server-computed cart total.
    pub async fn cart_total(&self, actor: Actor) -> QueryState<Price> {
        self.query(actor, QueryKey::CartTotal, |a| async move {
            a.calculate_cart_total().await
        })
        .await
    }

    pub async fn order_history(&self, actor: Actor) -> QueryState<Vec<OrderRecord>> {
        self.query(actor, QueryKey::Orders, |a| async move {
            a.get_order_history().await
        })
        .await
    }

    pub async fn all_orders_by_total_price(&self, actor: Actor) -> QueryState<Vec<OrderRecord>> {
        self.query(actor, QueryKey::AllOrdersByTotalPrice, |a| async move {
            a.get_all_orders_by_total_price_desc().await
        })
        .await
    }

    pub async fn current_user_profile(&self, actor: Actor) -> QueryState<Option<UserProfile>> {
        self.query(actor, QueryKey::CurrentUserProfile, |a| async move {
            a.get_caller_user_profile().await
        })
        .await
    }

    pub async fn user_profile(
        &self,
        actor: Actor,
        user: Principal,
    ) -> QueryState<Option<UserProfile>> {
        let key = QueryKey::UserProfile(user.clone());
        self.query(actor, key, move |a| async move { a.get_user_profile(user).await })
            .await
    }

    pub async fn is_admin(&self, actor: Actor) -> QueryState<bool> {
        self.query(actor, QueryKey::IsAdmin, |a| async move {
            a.is_caller_admin().await
        })
        .await
    }

    pub async fn user_role(&self, actor: Actor) -> QueryState<UserRole> {
        self.query(actor, QueryKey::UserRole, |a| async move {
            a.get_caller_user_role().await
        })
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

impl QueryClient {
    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn save_profile(&self, actor: Actor, profile: UserProfile) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::SaveProfile, |a| async move {
            a.save_caller_user_profile(profile).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn add_food_item(&self, actor: Actor, item: FoodItem) -> Result<FoodId, ActorError> {
        self.mutate(actor, Mutation::AddFoodItem, |a| async move {
            a.add_food_item(item).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn update_food_item(&self, actor: Actor, item: FoodItem) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::UpdateFoodItem, |a| async move {
            a.update_food_item(item).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn delete_food_item(&self, actor: Actor, id: FoodId) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::DeleteFoodItem, |a| async move {
            a.delete_food_item(id).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn add_to_cart(
        &self,
        actor: Actor,
        food_id: FoodId,
        quantity: u64,
    ) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::AddToCart, |a| async move {
            a.add_to_cart(food_id, quantity).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn update_cart_item(
        &self,
        actor: Actor,
        food_id: FoodId,
        quantity: u64,
    ) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::UpdateCartItem, |a| async move {
            a.update_cart_item(food_id, quantity).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn remove_from_cart(&self, actor: Actor, food_id: FoodId) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::RemoveFromCart, |a| async move {
            a.remove_from_cart(food_id).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn place_order(&self, actor: Actor) -> Result<OrderId, ActorError> {
        self.mutate(actor, Mutation::PlaceOrder, |a| async move {
            a.place_order().await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn update_order_status(
        &self,
        actor: Actor,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::UpdateOrderStatus, |a| async move {
            a.update_order_status(order_id, status).await
        })
        .await
    }

    /// # Errors
    ///
    /// Returns the actor's error, or [`ActorError::Unavailable`].
    pub async fn assign_user_role(
        &self,
        actor: Actor,
        user: Principal,
        role: UserRole,
    ) -> Result<(), ActorError> {
        self.mutate(actor, Mutation::AssignUserRole, |a| async move {
            a.assign_caller_user_role(user, role).await
        })
        .await
    }
}

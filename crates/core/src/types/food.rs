//! Catalog, cart and order entities as returned by the backend.

use serde::{Deserialize, Serialize};

use super::{Category, FoodId, OrderId, OrderStatus, Price, Principal};

/// A menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    /// Assigned by the backend; ignored by `addFoodItem`.
    pub id: FoodId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Preparation time in minutes.
    pub prep_time: u64,
    pub is_available: bool,
    pub image_url: String,
    pub categories: Vec<Category>,
}

impl FoodItem {
    /// Whether the item is tagged with `category`.
    #[must_use]
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }
}

/// One cart line: a snapshot of the item plus a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub food_item: FoodItem,
    pub quantity: u64,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub user: Principal,
    /// Line snapshots at time of purchase.
    pub items: Vec<CartItem>,
    /// Backend-computed total.
    pub total_price: Price,
    pub status: OrderStatus,
}

/// Caller profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

//! Mutation → invalidation table.
//!
//! Every mutation declares the key groups its success makes stale. The
//! query client consults this table after each successful call.

use super::keys::KeyGroup;

/// Every state-changing actor operation the storefront issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    SaveProfile,
    AddFoodItem,
    UpdateFoodItem,
    DeleteFoodItem,
    AddToCart,
    UpdateCartItem,
    RemoveFromCart,
    PlaceOrder,
    UpdateOrderStatus,
    AssignUserRole,
}

impl Mutation {
    pub const ALL: [Self; 10] = [
        Self::SaveProfile,
        Self::AddFoodItem,
        Self::UpdateFoodItem,
        Self::DeleteFoodItem,
        Self::AddToCart,
        Self::UpdateCartItem,
        Self::RemoveFromCart,
        Self::PlaceOrder,
        Self::UpdateOrderStatus,
        Self::AssignUserRole,
    ];

    /// Key groups marked stale when this mutation succeeds.
    #[must_use]
    pub const fn invalidates(self) -> &'static [KeyGroup] {
        match self {
            Self::SaveProfile => &[KeyGroup::CurrentUserProfile],
            Self::AddFoodItem | Self::UpdateFoodItem | Self::DeleteFoodItem => {
                &[KeyGroup::FoodItems]
            }
            Self::AddToCart | Self::UpdateCartItem | Self::RemoveFromCart => {
                &[KeyGroup::Cart, KeyGroup::CartTotal]
            }
            Self::PlaceOrder => &[KeyGroup::Cart, KeyGroup::CartTotal, KeyGroup::Orders],
            Self::UpdateOrderStatus => &[KeyGroup::Orders],
            Self::AssignUserRole => &[KeyGroup::IsAdmin, KeyGroup::UserRole],
        }
    }

    /// Remote method name, used in logs.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Self::SaveProfile => "saveCallerUserProfile",
            Self::AddFoodItem => "addFoodItem",
            Self::UpdateFoodItem => "updateFoodItem",
            Self::DeleteFoodItem => "deleteFoodItem",
            Self::AddToCart => "addToCart",
            Self::UpdateCartItem => "updateCartItem",
            Self::RemoveFromCart => "removeFromCart",
            Self::PlaceOrder => "placeOrder",
            Self::UpdateOrderStatus => "updateOrderStatus",
            Self::AssignUserRole => "assignCallerUserRole",
        }
    }
}

//! Query keys and the values cached under them.

use std::fmt;

use foodhub_core::{CartItem, Category, FoodItem, OrderRecord, Price, Principal, UserProfile, UserRole};

/// Stable identifier of one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    FoodItems,
    FoodItemsByCategory(Category),
    Cart,
    CartTotal,
    Orders,
    AllOrdersByTotalPrice,
    CurrentUserProfile,
    UserProfile(Principal),
    IsAdmin,
    UserRole,
}

/// Invalidation granularity.
///
/// A mutation invalidates whole groups; every key belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyGroup {
    /// The full catalog and every per-category listing.
    FoodItems,
    Cart,
    CartTotal,
    /// The caller's history and the admin listing of all orders.
    Orders,
    CurrentUserProfile,
    UserProfile,
    IsAdmin,
    UserRole,
}

impl QueryKey {
    #[must_use]
    pub const fn group(&self) -> KeyGroup {
        match self {
            Self::FoodItems | Self::FoodItemsByCategory(_) => KeyGroup::FoodItems,
            Self::Cart => KeyGroup::Cart,
            Self::CartTotal => KeyGroup::CartTotal,
            Self::Orders | Self::AllOrdersByTotalPrice => KeyGroup::Orders,
            Self::CurrentUserProfile => KeyGroup::CurrentUserProfile,
            Self::UserProfile(_) => KeyGroup::UserProfile,
            Self::IsAdmin => KeyGroup::IsAdmin,
            Self::UserRole => KeyGroup::UserRole,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FoodItems => f.write_str("foodItems"),
            Self::FoodItemsByCategory(category) => write!(f, "foodItems/{category}"),
            Self::Cart => f.write_str("cart"),
            Self::CartTotal => f.write_str("cartTotal"),
            Self::Orders => f.write_str("orders"),
            Self::AllOrdersByTotalPrice => f.write_str("orders/all"),
            Self::CurrentUserProfile => f.write_str("currentUserProfile"),
            Self::UserProfile(principal) => write!(f, "userProfile/{principal}"),
            Self::IsAdmin => f.write_str("isAdmin"),
            Self::UserRole => f.write_str("userRole"),
        }
    }
}

/// A cached value of any query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    FoodItems(Vec<FoodItem>),
    Cart(Vec<CartItem>),
    Price(Price),
    Orders(Vec<OrderRecord>),
    Profile(Option<UserProfile>),
    Flag(bool),
    Role(UserRole),
}

/// Conversion between a typed query result and its cached form.
///
/// `Default` is the value reported while no actor is available.
pub trait QueryData: Clone + Default + Send + 'static {
    fn into_value(self) -> QueryValue;
    fn from_value(value: &QueryValue) -> Option<Self>;
}

macro_rules! query_data {
    ($ty:ty, $variant:ident) => {
        impl QueryData for $ty {
            fn into_value(self) -> QueryValue {
                QueryValue::$variant(self)
            }

            fn from_value(value: &QueryValue) -> Option<Self> {
                match value {
                    QueryValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

query_data!(Vec<FoodItem>, FoodItems);
query_data!(Vec<CartItem>, Cart);
query_data!(Price, Price);
query_data!(Vec<OrderRecord>, Orders);
query_data!(Option<UserProfile>, Profile);
query_data!(bool, Flag);
query_data!(UserRole, Role);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_listings_share_catalog_group() {
        assert_eq!(QueryKey::FoodItems.group(), KeyGroup::FoodItems);
        for category in Category::ALL {
            assert_eq!(
                QueryKey::FoodItemsByCategory(category).group(),
                KeyGroup::FoodItems
            );
        }
    }

    #[test]
    fn test_key_display() {
        assert_eq!(QueryKey::CartTotal.to_string(), "cartTotal");
        assert_eq!(
            QueryKey::FoodItemsByCategory(Category::Lunch).to_string(),
            "foodItems/lunch"
        );
    }

    #[test]
    fn test_value_conversion_rejects_other_variants() {
        let value = true.into_value();
        assert_eq!(bool::from_value(&value), Some(true));
        assert_eq!(Vec::<CartItem>::from_value(&value), None);
    }
}

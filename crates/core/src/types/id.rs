//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. The backend assigns
//! all numeric IDs as unsigned naturals.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `u64` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `PartialOrd`, `Ord`, `Hash`
/// - Conversion methods: `new()`, `as_u64()`
/// - `From<u64>` and `Into<u64>` implementations
///
/// # Example
///
/// ```rust
/// # use foodhub_core::define_id;
/// define_id!(TableId);
/// define_id!(CourierId);
///
/// let table = TableId::new(1);
/// let courier = CourierId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: TableId = courier;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create a new ID from a u64 value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the underlying u64 value.
            #[must_use]
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(FoodId);
define_id!(OrderId);

/// Textual identity of a caller as issued by the identity provider.
///
/// The backend keys carts, orders and profiles by principal, so the storefront
/// uses it to scope cached data per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap a principal text as returned by the identity provider.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The principal's textual form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

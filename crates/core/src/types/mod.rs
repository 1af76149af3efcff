//! Core types for FoodHub.
//!
//! This module provides type-safe wrappers for the backend's domain concepts.

pub mod category;
pub mod food;
pub mod id;
pub mod price;
pub mod status;

pub use category::{Category, CategoryFilter, CategoryParseError};
pub use food::{CartItem, FoodItem, OrderRecord, UserProfile};
pub use id::*;
pub use price::Price;
pub use status::*;

//! FoodHub Core - Shared types library.
//!
//! This crate provides the domain types used across FoodHub components:
//! - `storefront` - Server-rendered food ordering site
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Every entity here is owned by the remote backend; the storefront
//! holds read-through copies only.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, catalog/cart/order entities, categories and statuses
//! - [`transforms`] - Local list transforms over already-fetched sequences

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod transforms;
pub mod types;

pub use types::*;

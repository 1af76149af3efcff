//! Data-sync layer.
//!
//! Sits between page handlers and the remote actor. Reads go through a keyed
//! cache with a freshness window and single-flight fetches; mutations make
//! exactly one remote call and, on success, invalidate the key groups listed
//! in [`Mutation::invalidates`].
//!
//! # Example
//!
//! ```rust,ignore
//! let scope = state.registry().scope(identity.as_ref()).await;
//! let actor = state.connector().actor_for(identity.as_ref());
//!
//! let cart = scope.queries().cart(actor.clone()).await;
//! scope.queries().add_to_cart(actor, food_id, 1).await?;
//! ```

mod client;
mod invalidation;
mod keys;
mod queries;
mod registry;

pub use client::{QueryClient, QueryState};
pub use invalidation::Mutation;
pub use keys::{KeyGroup, QueryData, QueryKey, QueryValue};
pub use registry::{QueryRegistry, SessionScope};

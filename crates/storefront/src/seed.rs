//! Catalog seeding.
//!
//! When an administrator opens the storefront against a catalog missing the
//! house dishes, the missing ones are added once per scope. Items are added
//! one at a time through the regular add-food-item mutation; the first
//! failure stops the run and leaves earlier additions in place.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use foodhub_core::{Category, FoodId, FoodItem, Price};

use crate::actor::{ActorError, FoodActor};
use crate::identity::Identity;
use crate::sync::SessionScope;

/// A dish the catalog should contain.
#[derive(Debug, Clone, Copy)]
pub struct SeedItem {
    pub name: &'static str,
    pub description: &'static str,
    pub price: u64,
    pub categories: &'static [Category],
    pub image_url: &'static str,
    pub prep_time: u64,
}

impl SeedItem {
    /// Catalog entry for this seed; the backend assigns the id.
    #[must_use]
    pub fn to_food_item(&self) -> FoodItem {
        FoodItem {
            id: FoodId::new(0),
            name: self.name.to_string(),
            description: self.description.to_string(),
            price: Price::from_units(self.price),
            prep_time: self.prep_time,
            is_available: true,
            image_url: self.image_url.to_string(),
            categories: self.categories.to_vec(),
        }
    }
}

pub static SEED_ITEMS: [SeedItem; 5] = [
    SeedItem {
        name: "Chicken Biryani",
        description: "Aromatic basmati rice cooked with tender chicken pieces, fragrant spices, and herbs",
        price: 180,
        categories: &[Category::Lunch, Category::NonVegetarian],
        image_url: "/assets/generated/chicken-biryani.dim_400x300.png",
        prep_time: 30,
    },
    SeedItem {
        name: "Paneer Tikka",
        description: "Marinated cottage cheese cubes grilled to perfection with bell peppers and onions",
        price: 150,
        categories: &[Category::Dinner, Category::Vegetarian],
        image_url: "/assets/generated/paneer-tikka.dim_400x300.png",
        prep_time: 20,
    },
    SeedItem {
        name: "Aloo Paratha",
        description: "Whole wheat flatbread stuffed with spiced mashed potatoes, served with butter and curd",
        price: 80,
        categories: &[Category::Breakfast, Category::Vegetarian],
        image_url: "/assets/generated/aloo-paratha.dim_400x300.png",
        prep_time: 15,
    },
    SeedItem {
        name: "Matar Paneer",
        description: "Cottage cheese and green peas cooked in a rich tomato-based gravy with aromatic spices",
        price: 150,
        categories: &[Category::Dinner, Category::Vegetarian],
        image_url: "/assets/generated/matar-paneer.dim_400x300.png",
        prep_time: 25,
    },
    SeedItem {
        name: "Matar Paneer Roti",
        description: "Delicious matar paneer curry served with soft, freshly made rotis",
        price: 200,
        categories: &[Category::Dinner, Category::Lunch, Category::Vegetarian],
        image_url: "/assets/generated/matar-paneer-roti.dim_400x300.png",
        prep_time: 30,
    },
];

/// Seed items whose name does not appear in `catalog`, in seed order.
#[must_use]
pub fn missing_seed_items<'a>(seeds: &'a [SeedItem], catalog: &[FoodItem]) -> Vec<&'a SeedItem> {
    let existing: HashSet<&str> = catalog.iter().map(|item| item.name.as_str()).collect();
    seeds
        .iter()
        .filter(|seed| !existing.contains(seed.name))
        .collect()
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to add {name}: {source}")]
    AddFailed {
        name: &'static str,
        #[source]
        source: ActorError,
    },
}

/// Why a run did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Anonymous,
    NotAdmin,
    CatalogNotLoaded,
    AlreadySeeded,
    /// Another run for the same scope is active.
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Skipped(SkipReason),
    Completed { added: usize },
}

/// Reconciles the catalog against a fixed seed list.
pub struct CatalogSeeder {
    seeds: &'static [SeedItem],
}

impl Default for CatalogSeeder {
    fn default() -> Self {
        Self { seeds: &SEED_ITEMS }
    }
}

impl CatalogSeeder {
    #[must_use]
    pub const fn new(seeds: &'static [SeedItem]) -> Self {
        Self { seeds }
    }

    /// Run once for `scope` if the caller is an administrator.
    ///
    /// # Errors
    ///
    /// Returns the first failed addition; items added before it stay.
    #[tracing::instrument(skip_all)]
    pub async fn run(
        &self,
        scope: &SessionScope,
        identity: Option<&Identity>,
        actor: Option<Arc<dyn FoodActor>>,
    ) -> Result<SeedOutcome, SeedError> {
        if identity.is_none() {
            return Ok(SeedOutcome::Skipped(SkipReason::Anonymous));
        }
        if scope.is_seeded() {
            return Ok(SeedOutcome::Skipped(SkipReason::AlreadySeeded));
        }

        let queries = scope.queries();
        if !queries.is_admin(actor.clone()).await.data {
            return Ok(SeedOutcome::Skipped(SkipReason::NotAdmin));
        }

        let catalog = queries.food_items(actor.clone()).await;
        if !catalog.fetched {
            return Ok(SeedOutcome::Skipped(SkipReason::CatalogNotLoaded));
        }

        if !scope.begin_seeding() {
            return Ok(SeedOutcome::Skipped(SkipReason::InProgress));
        }

        let missing = missing_seed_items(self.seeds, &catalog.data);
        let mut added = 0;
        for seed in &missing {
            if let Err(source) = queries
                .add_food_item(actor.clone(), seed.to_food_item())
                .await
            {
                scope.finish_seeding(false);
                return Err(SeedError::AddFailed {
                    name: seed.name,
                    source,
                });
            }
            added += 1;
        }

        scope.finish_seeding(true);
        if added > 0 {
            tracing::info!(added, "Seeded catalog");
        }
        Ok(SeedOutcome::Completed { added })
    }
}

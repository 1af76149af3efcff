//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use foodhub_core::{Category, CategoryFilter};

use crate::filters;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

/// A selling point shown under the hero.
#[derive(Clone)]
pub struct Feature {
    pub title: &'static str,
    pub text: &'static str,
}

const FEATURES: [Feature; 3] = [
    Feature {
        title: "Fresh Ingredients",
        text: "Every dish is cooked to order from fresh, locally sourced produce.",
    },
    Feature {
        title: "Fast Delivery",
        text: "Hot food at your door, with preparation times shown up front.",
    },
    Feature {
        title: "Something for Everyone",
        text: "Vegetarian, non-vegetarian and healthy options on one menu.",
    },
];

/// A category tile linking to the filtered menu.
#[derive(Clone)]
pub struct CategoryCard {
    pub label: &'static str,
    pub href: String,
    pub image_url: String,
}

impl From<Category> for CategoryCard {
    fn from(category: Category) -> Self {
        let slug = category.label().to_lowercase().replace(' ', "-");
        Self {
            label: category.label(),
            href: format!(
                "/products?category={}",
                CategoryFilter::Only(category).as_param()
            ),
            image_url: format!("/assets/generated/{slug}.dim_400x300.png"),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub shell: Shell,
    pub features: Vec<Feature>,
    pub categories: Vec<CategoryCard>,
    /// Dishes on the menu, once the catalog has loaded.
    pub menu_size: Option<usize>,
}

/// Home page: hero, features and the category grid.
///
/// The catalog is warmed in the background so the menu page is usually a
/// cache hit.
#[instrument(skip(state, visitor))]
pub async fn home(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let shell = Shell::load(&state, &visitor).await;
    let menu = visitor.queries().observe_food_items(visitor.actor());

    HomeTemplate {
        shell,
        features: FEATURES.to_vec(),
        categories: Category::ALL.into_iter().map(CategoryCard::from).collect(),
        menu_size: menu.fetched.then_some(menu.data.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_card_links_and_images() {
        let card = CategoryCard::from(Category::NonVegetarian);
        assert_eq!(card.label, "Non-Vegetarian");
        assert_eq!(card.href, "/products?category=nonVegetarian");
        assert_eq!(
            card.image_url,
            "/assets/generated/non-vegetarian.dim_400x300.png"
        );

        let card = CategoryCard::from(Category::FastFood);
        assert_eq!(card.image_url, "/assets/generated/fast-food.dim_400x300.png");
    }
}

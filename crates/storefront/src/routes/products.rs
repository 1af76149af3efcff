//! Menu listing with category tabs.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use foodhub_core::{Category, CategoryFilter, FoodItem, transforms};

use crate::filters;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
}

impl ProductsQuery {
    /// Selected filter; unknown categories fall back to the full menu.
    #[must_use]
    pub fn filter(&self) -> CategoryFilter {
        self.category
            .as_deref()
            .and_then(|param| param.parse().ok())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct CategoryTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

fn tabs(selected: CategoryFilter) -> Vec<CategoryTab> {
    let all = CategoryTab {
        label: "All",
        href: "/products".to_string(),
        active: selected == CategoryFilter::All,
    };

    std::iter::once(all)
        .chain(Category::ALL.into_iter().map(|category| CategoryTab {
            label: category.label(),
            href: format!(
                "/products?category={}",
                CategoryFilter::Only(category).as_param()
            ),
            active: selected.is(category),
        }))
        .collect()
}

/// Menu card data for templates.
#[derive(Clone)]
pub struct FoodCard {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub prep_time: u64,
    pub image_url: String,
    pub is_available: bool,
    pub categories: Vec<&'static str>,
}

impl From<&FoodItem> for FoodCard {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id.as_u64(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price.to_string(),
            prep_time: item.prep_time,
            image_url: item.image_url.clone(),
            is_available: item.is_available,
            categories: item.categories.iter().map(|c| c.label()).collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub shell: Shell,
    pub tabs: Vec<CategoryTab>,
    pub items: Vec<FoodCard>,
    pub error: Option<String>,
}

/// Menu page.
///
/// Every tab filters the one cached catalog, so switching tabs makes no
/// remote call while the catalog is fresh.
#[instrument(skip(state, visitor))]
pub async fn index(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &visitor).await;
    let filter = query.filter();
    let listing = visitor.queries().food_items(visitor.actor()).await;

    let error = listing
        .error
        .as_ref()
        .map(|e| e.user_message("Failed to load menu"));

    ProductsTemplate {
        shell,
        tabs: tabs(filter),
        items: transforms::filter_by_category(&listing.data, filter)
            .iter()
            .map(FoodCard::from)
            .collect(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>) -> ProductsQuery {
        ProductsQuery {
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn test_invalid_category_falls_back_to_all() {
        assert_eq!(query(None).filter(), CategoryFilter::All);
        assert_eq!(query(Some("dessert")).filter(), CategoryFilter::All);
        assert_eq!(
            query(Some("snacks")).filter(),
            CategoryFilter::Only(Category::Snacks)
        );
    }

    #[test]
    fn test_exactly_one_tab_active() {
        let tabs = tabs(CategoryFilter::Only(Category::Dinner));
        assert_eq!(tabs.len(), Category::ALL.len() + 1);
        let active: Vec<_> = tabs.iter().filter(|t| t.active).map(|t| t.label).collect();
        assert_eq!(active, vec!["Dinner"]);

        let tabs = super::tabs(CategoryFilter::All);
        assert!(tabs.first().is_some_and(|t| t.active && t.href == "/products"));
    }
}

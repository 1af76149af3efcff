//! Cart and checkout route handlers.
//!
//! Every mutation is a plain form post followed by a redirect; the outcome is
//! reported through a flash message on the next page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use foodhub_core::{CartItem, FoodId, Price, transforms};

use crate::filters;
use crate::gate::Gated;
use crate::middleware::{RequireAuth, push_flash};
use crate::models::Flash;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

/// Display text for a computed amount that may have overflowed.
#[must_use]
pub fn price_label(price: Option<Price>) -> String {
    price.map_or_else(|| "Unavailable".to_string(), |price| price.to_string())
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub food_id: u64,
    pub name: String,
    pub image_url: String,
    pub unit_price: String,
    pub quantity: u64,
    pub line_total: String,
    pub decrement: u64,
    pub increment: u64,
}

impl From<&CartItem> for CartLineView {
    fn from(line: &CartItem) -> Self {
        Self {
            food_id: line.food_item.id.as_u64(),
            name: line.food_item.name.clone(),
            image_url: line.food_item.image_url.clone(),
            unit_price: line.food_item.price.to_string(),
            quantity: line.quantity,
            line_total: price_label(transforms::line_total(line)),
            decrement: line.quantity.saturating_sub(1),
            increment: line.quantity.saturating_add(1),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub error: Option<String>,
}

impl CartView {
    /// Build the view; the backend total wins, the local sum is the fallback.
    #[must_use]
    pub fn new(lines: &[CartItem], server_total: Option<Price>) -> Self {
        let total = server_total.or_else(|| transforms::cart_grand_total(lines));
        Self {
            lines: lines.iter().map(CartLineView::from).collect(),
            total: price_label(total),
            error: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub shell: Shell,
    pub page: Gated<CartView>,
}

/// Cart page.
#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let shell = Shell::load(&state, &visitor).await;

    let page = Gated::load(visitor.identity.as_ref(), |_| async {
        let queries = visitor.queries();
        let cart = queries.cart(visitor.actor()).await;
        let total = queries.cart_total(visitor.actor()).await;

        let mut view = CartView::new(&cart.data, total.fetched.then_some(total.data));
        view.error = cart
            .error
            .as_ref()
            .map(|e| e.user_message("Failed to load cart"));
        view
    })
    .await;

    CartTemplate { shell, page }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub food_id: u64,
}

/// Add one unit of an item.
#[instrument(skip(visitor))]
pub async fn add(visitor: Visitor, Form(form): Form<AddToCartForm>) -> Response {
    if visitor.identity.is_none() {
        push_flash(
            &visitor.session,
            Flash::error("Please login to add items to cart"),
        )
        .await;
        return Redirect::to("/products").into_response();
    }

    let flash = match visitor
        .queries()
        .add_to_cart(visitor.actor(), FoodId::new(form.food_id), 1)
        .await
    {
        Ok(()) => Flash::success("Added to cart!"),
        Err(e) => Flash::error(e.user_message("Failed to add to cart")),
    };
    push_flash(&visitor.session, flash).await;

    Redirect::to("/products").into_response()
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub food_id: u64,
    pub quantity: u64,
}

/// Change a line's quantity. Quantities below one are ignored; removal is a
/// separate action.
#[instrument(skip(visitor))]
pub async fn update(
    RequireAuth(_): RequireAuth,
    visitor: Visitor,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    if form.quantity < 1 {
        return Redirect::to("/cart").into_response();
    }

    if let Err(e) = visitor
        .queries()
        .update_cart_item(visitor.actor(), FoodId::new(form.food_id), form.quantity)
        .await
    {
        push_flash(
            &visitor.session,
            Flash::error(e.user_message("Failed to update quantity")),
        )
        .await;
    }

    Redirect::to("/cart").into_response()
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub food_id: u64,
}

/// Remove a line.
#[instrument(skip(visitor))]
pub async fn remove(
    RequireAuth(_): RequireAuth,
    visitor: Visitor,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let flash = match visitor
        .queries()
        .remove_from_cart(visitor.actor(), FoodId::new(form.food_id))
        .await
    {
        Ok(()) => Flash::success("Item removed from cart"),
        Err(e) => Flash::error(e.user_message("Failed to remove item")),
    };
    push_flash(&visitor.session, flash).await;

    Redirect::to("/cart").into_response()
}

/// Place an order from the current cart.
#[instrument(skip(visitor))]
pub async fn checkout(RequireAuth(_): RequireAuth, visitor: Visitor) -> Response {
    match visitor.queries().place_order(visitor.actor()).await {
        Ok(order_id) => {
            tracing::info!(%order_id, "Order placed");
            push_flash(
                &visitor.session,
                Flash::success("Order placed successfully!"),
            )
            .await;
            Redirect::to("/orders").into_response()
        }
        Err(e) => {
            push_flash(
                &visitor.session,
                Flash::error(e.user_message("Failed to place order")),
            )
            .await;
            Redirect::to("/cart").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodhub_core::{Category, FoodItem};

    fn line(id: u64, price: u64, quantity: u64) -> CartItem {
        CartItem {
            food_item: FoodItem {
                id: FoodId::new(id),
                name: format!("dish-{id}"),
                description: String::new(),
                price: Price::from_units(price),
                prep_time: 10,
                is_available: true,
                image_url: String::new(),
                categories: vec![Category::Lunch],
            },
            quantity,
        }
    }

    #[test]
    fn test_cart_view_prefers_server_total() {
        let lines = vec![line(1, 180, 2), line(3, 80, 1)];

        let local = CartView::new(&lines, None);
        assert_eq!(local.total, "$440.00");

        let server = CartView::new(&lines, Some(Price::from_units(400)));
        assert_eq!(server.total, "$400.00");
    }

    #[test]
    fn test_line_view_quantities() {
        let view = CartLineView::from(&line(1, 180, 1));
        assert_eq!(view.line_total, "$180.00");
        assert_eq!(view.decrement, 0);
        assert_eq!(view.increment, 2);
    }

    #[test]
    fn test_overflowing_cart_renders_unavailable_totals() {
        let mut huge = line(1, 1_000_000_000_000, u64::MAX);
        huge.food_item.name = "Party Platter".to_string();
        let lines = vec![huge, line(3, 80, 1)];

        let view = CartView::new(&lines, None);
        assert_eq!(view.total, "Unavailable");
        assert_eq!(view.lines.first().map(|l| l.line_total.as_str()), Some("Unavailable"));
        assert_eq!(view.lines.get(1).map(|l| l.line_total.as_str()), Some("$80.00"));

        let server = CartView::new(&lines, Some(Price::from_units(400)));
        assert_eq!(server.total, "$400.00");
    }
}

//! Administration: order fulfilment, catalog maintenance and role assignment.
//!
//! Every handler checks `isCallerAdmin` through the query cache first; the
//! backend enforces the same rule on each mutation.

use std::collections::BTreeSet;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use foodhub_core::{
    Category, FoodId, FoodItem, OrderId, OrderRecord, OrderStatus, Price, Principal, UserRole,
    transforms,
};

use crate::error::{AppError, Result};
use crate::filters;
use crate::gate::Gated;
use crate::middleware::push_flash;
use crate::models::Flash;
use crate::routes::orders::status_class;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

#[derive(Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Clone)]
pub struct AdminOrderView {
    pub id: u64,
    pub customer: String,
    pub total: String,
    pub item_count: u64,
    pub status: &'static str,
    pub status_class: String,
    pub status_options: Vec<StatusOption>,
}

#[derive(Clone)]
pub struct AdminItemView {
    pub id: u64,
    pub name: String,
    pub price: String,
    pub is_available: bool,
    pub categories: String,
}

#[derive(Clone)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Clone)]
pub struct AdminView {
    pub orders: Vec<AdminOrderView>,
    pub items: Vec<AdminItemView>,
    pub categories: Vec<CategoryOption>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminTemplate {
    pub shell: Shell,
    pub page: Gated<AdminView>,
}

async fn require_admin(visitor: &Visitor) -> Result<()> {
    if visitor.queries().is_admin(visitor.actor()).await.data {
        Ok(())
    } else {
        Err(AppError::Forbidden("Administrator access required".to_string()))
    }
}

fn order_view(order: &OrderRecord, customer: String) -> AdminOrderView {
    AdminOrderView {
        id: order.id.as_u64(),
        customer,
        total: order.total_price.to_string(),
        item_count: transforms::cart_item_count(&order.items),
        status: order.status.label(),
        status_class: status_class(order.status),
        status_options: OrderStatus::ALL
            .into_iter()
            .map(|status| StatusOption {
                value: status.wire_name(),
                label: status.label(),
                selected: status == order.status,
            })
            .collect(),
    }
}

/// Display name per customer, falling back to the principal text.
async fn customer_names(visitor: &Visitor, orders: &[OrderRecord]) -> Vec<(Principal, String)> {
    let principals: BTreeSet<&str> = orders.iter().map(|o| o.user.as_str()).collect();

    join_all(principals.into_iter().map(|principal| async move {
        let principal = Principal::new(principal);
        let profile = visitor
            .queries()
            .user_profile(visitor.actor(), principal.clone())
            .await;
        let name = profile
            .data
            .map(|p| p.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| principal.to_string());
        (principal, name)
    }))
    .await
}

async fn load_admin(visitor: &Visitor) -> Result<AdminView> {
    require_admin(visitor).await?;

    let queries = visitor.queries();
    let orders = queries.all_orders_by_total_price(visitor.actor()).await;
    let catalog = queries.food_items(visitor.actor()).await;
    let names = customer_names(visitor, &orders.data).await;

    let error = orders
        .error
        .as_ref()
        .or(catalog.error.as_ref())
        .map(|e| e.user_message("Failed to load admin data"));

    Ok(AdminView {
        orders: orders
            .data
            .iter()
            .map(|order| {
                let customer = names
                    .iter()
                    .find(|(principal, _)| *principal == order.user)
                    .map_or_else(|| order.user.to_string(), |(_, name)| name.clone());
                order_view(order, customer)
            })
            .collect(),
        items: catalog
            .data
            .iter()
            .map(|item| AdminItemView {
                id: item.id.as_u64(),
                name: item.name.clone(),
                price: item.price.to_string(),
                is_available: item.is_available,
                categories: item
                    .categories
                    .iter()
                    .map(|c| c.label())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect(),
        categories: Category::ALL
            .into_iter()
            .map(|category| CategoryOption {
                value: category.wire_name(),
                label: category.label(),
            })
            .collect(),
        error,
    })
}

/// Admin dashboard. Signed-out visitors see the login prompt; signed-in
/// non-administrators get 403.
#[instrument(skip(state, visitor))]
pub async fn index(State(state): State<AppState>, visitor: Visitor) -> Result<impl IntoResponse> {
    let shell = Shell::load(&state, &visitor).await;
    let page = Gated::load(visitor.identity.as_ref(), |_| load_admin(&visitor))
        .await
        .transpose()?;

    Ok(AdminTemplate { shell, page })
}

async fn finish(visitor: &Visitor, outcome: std::result::Result<(), String>, success: &str) -> Response {
    let flash = match outcome {
        Ok(()) => Flash::success(success),
        Err(message) => Flash::error(message),
    };
    push_flash(&visitor.session, flash).await;
    Redirect::to("/admin").into_response()
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusForm {
    pub order_id: u64,
    pub status: String,
}

#[instrument(skip(visitor))]
pub async fn update_order_status(
    visitor: Visitor,
    Form(form): Form<OrderStatusForm>,
) -> Result<Response> {
    require_admin(&visitor).await?;

    let status = OrderStatus::from_str(&form.status).map_err(AppError::BadRequest)?;
    let outcome = visitor
        .queries()
        .update_order_status(visitor.actor(), OrderId::new(form.order_id), status)
        .await
        .map_err(|e| e.user_message("Failed to update order status"));

    Ok(finish(&visitor, outcome, "Order status updated").await)
}

/// Build a new catalog item from the add-item form.
///
/// Categories arrive as repeated `category` fields.
///
/// # Errors
///
/// Returns a user-facing message naming the first invalid field.
pub fn parse_food_form(fields: &[(String, String)]) -> std::result::Result<FoodItem, String> {
    let field = |name: &str| {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    };

    let name = field("name").ok_or("Name is required")?;
    let price = field("price")
        .and_then(|p| Decimal::from_str(p).ok())
        .and_then(Price::new)
        .ok_or("Price must be a non-negative number")?;
    let prep_time = field("prep_time")
        .and_then(|p| p.parse::<u64>().ok())
        .ok_or("Preparation time must be a whole number of minutes")?;
    let categories = fields
        .iter()
        .filter(|(key, _)| key == "category")
        .map(|(_, value)| Category::from_str(value).map_err(|e| e.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if categories.is_empty() {
        return Err("Select at least one category".to_string());
    }

    Ok(FoodItem {
        id: FoodId::new(0),
        name: name.to_string(),
        description: field("description").unwrap_or_default().to_string(),
        price,
        prep_time,
        is_available: field("is_available").is_some(),
        image_url: field("image_url").unwrap_or_default().to_string(),
        categories,
    })
}

#[instrument(skip(visitor, fields))]
pub async fn add_food_item(
    visitor: Visitor,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response> {
    require_admin(&visitor).await?;

    let outcome = match parse_food_form(&fields) {
        Ok(item) => visitor
            .queries()
            .add_food_item(visitor.actor(), item)
            .await
            .map(|id| tracing::info!(%id, "Food item added"))
            .map_err(|e| e.user_message("Failed to add food item")),
        Err(message) => Err(message),
    };

    Ok(finish(&visitor, outcome, "Food item added").await)
}

#[derive(Debug, Deserialize)]
pub struct FoodIdForm {
    pub food_id: u64,
}

#[instrument(skip(visitor))]
pub async fn delete_food_item(
    visitor: Visitor,
    Form(form): Form<FoodIdForm>,
) -> Result<Response> {
    require_admin(&visitor).await?;

    let outcome = visitor
        .queries()
        .delete_food_item(visitor.actor(), FoodId::new(form.food_id))
        .await
        .map_err(|e| e.user_message("Failed to delete food item"));

    Ok(finish(&visitor, outcome, "Food item deleted").await)
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityForm {
    pub food_id: u64,
    pub available: bool,
}

/// Mark an item available or sold out.
#[instrument(skip(visitor))]
pub async fn set_availability(
    visitor: Visitor,
    Form(form): Form<AvailabilityForm>,
) -> Result<Response> {
    require_admin(&visitor).await?;

    let queries = visitor.queries();
    let catalog = queries.food_items(visitor.actor()).await;
    let Some(mut item) = catalog
        .data
        .into_iter()
        .find(|item| item.id == FoodId::new(form.food_id))
    else {
        return Ok(finish(&visitor, Err("Food item not found".to_string()), "").await);
    };

    item.is_available = form.available;
    let outcome = queries
        .update_food_item(visitor.actor(), item)
        .await
        .map_err(|e| e.user_message("Failed to update food item"));

    Ok(finish(&visitor, outcome, "Availability updated").await)
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub principal: String,
    pub role: String,
}

#[instrument(skip(visitor))]
pub async fn assign_role(visitor: Visitor, Form(form): Form<RoleForm>) -> Result<Response> {
    require_admin(&visitor).await?;

    let principal = form.principal.trim();
    if principal.is_empty() {
        return Err(AppError::BadRequest("principal is required".to_string()));
    }
    let role = UserRole::from_str(&form.role).map_err(AppError::BadRequest)?;

    let outcome = visitor
        .queries()
        .assign_user_role(visitor.actor(), Principal::new(principal), role)
        .await
        .map_err(|e| e.user_message("Failed to assign role"));

    Ok(finish(&visitor, outcome, "Role assigned").await)
}

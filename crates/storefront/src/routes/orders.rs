//! Order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use foodhub_core::{OrderRecord, OrderStatus, transforms};

use crate::filters;
use crate::gate::Gated;
use crate::shell::{Shell, Visitor};
use crate::state::AppState;

#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u64,
    pub line_total: String,
}

#[derive(Clone)]
pub struct OrderView {
    pub id: u64,
    pub status: &'static str,
    pub status_class: String,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&OrderRecord> for OrderView {
    fn from(order: &OrderRecord) -> Self {
        Self {
            id: order.id.as_u64(),
            status: order.status.label(),
            status_class: status_class(order.status),
            total: order.total_price.to_string(),
            lines: order
                .items
                .iter()
                .map(|line| OrderLineView {
                    name: line.food_item.name.clone(),
                    quantity: line.quantity,
                    line_total: super::cart::price_label(transforms::line_total(line)),
                })
                .collect(),
        }
    }
}

/// Badge class for a status.
#[must_use]
pub fn status_class(status: OrderStatus) -> String {
    format!("badge badge-{}", status.wire_name())
}

#[derive(Clone)]
pub struct OrdersView {
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub shell: Shell,
    pub page: Gated<OrdersView>,
}

/// Order history, newest first.
#[instrument(skip(state, visitor))]
pub async fn index(State(state): State<AppState>, visitor: Visitor) -> impl IntoResponse {
    let shell = Shell::load(&state, &visitor).await;

    let page = Gated::load(visitor.identity.as_ref(), |_| async {
        let history = visitor.queries().order_history(visitor.actor()).await;
        OrdersView {
            orders: transforms::sort_orders_newest_first(&history.data)
                .iter()
                .map(OrderView::from)
                .collect(),
            error: history
                .error
                .as_ref()
                .map(|e| e.user_message("Failed to load orders")),
        }
    })
    .await;

    OrdersTemplate { shell, page }
}

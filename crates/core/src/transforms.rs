//! Local list transforms.
//!
//! Pure functions over sequences the storefront has already fetched. None of
//! them mutate their input. Totals computed here are for display; the backend's
//! `calculateCartTotal` remains authoritative and nothing computed here is ever
//! sent back as mutation input.

use crate::types::{CartItem, CategoryFilter, FoodItem, OrderRecord, Price};

/// Items tagged with the selected category, in input order.
///
/// `CategoryFilter::All` returns the input unchanged.
#[must_use]
pub fn filter_by_category(items: &[FoodItem], filter: CategoryFilter) -> Vec<FoodItem> {
    match filter {
        CategoryFilter::All => items.to_vec(),
        CategoryFilter::Only(category) => items
            .iter()
            .filter(|item| item.has_category(category))
            .cloned()
            .collect(),
    }
}

/// Orders by descending id (newest first).
#[must_use]
pub fn sort_orders_newest_first(orders: &[OrderRecord]) -> Vec<OrderRecord> {
    let mut sorted = orders.to_vec();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));
    sorted
}

/// Price × quantity for one cart line, or `None` when it overflows.
#[must_use]
pub fn line_total(line: &CartItem) -> Option<Price> {
    line.food_item.price.checked_times(line.quantity)
}

/// Sum of line totals, or `None` when any line or the sum overflows.
#[must_use]
pub fn cart_grand_total(lines: &[CartItem]) -> Option<Price> {
    lines
        .iter()
        .try_fold(Price::ZERO, |total, line| total.checked_add(line_total(line)?))
}

/// Total number of units across all lines (header badge).
#[must_use]
pub fn cart_item_count(lines: &[CartItem]) -> u64 {
    lines
        .iter()
        .fold(0, |count: u64, line| count.saturating_add(line.quantity))
}

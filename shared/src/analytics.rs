//! Valuation and aggregation over a product collection
//!
//! Everything here is a pure view: the snapshot is recomputed in full from
//! the collection and never updated in place.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::classifier::{classify_expiry, classify_product, ExpiryStatus, StockStatus};
use crate::models::Product;
use crate::types::add_clamped;

/// Group key for products without a category, supplier or location
pub const UNCATEGORIZED: &str = "uncategorized";

/// Maximum number of entries in the low-stock and expiring lists
pub const ALERT_LIST_LIMIT: usize = 10;

/// Margin percentage relative to cost. Zero when cost is zero or the ratio
/// is outside the representable range.
pub fn margin(cost: Decimal, price: Decimal) -> Decimal {
    if cost <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    price
        .checked_sub(cost)
        .and_then(|gain| gain.checked_div(cost))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Margin rounded to two decimals for display
pub fn margin_display(cost: Decimal, price: Decimal) -> Decimal {
    margin(cost, price).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Margin of a single product
pub fn product_margin(product: &Product) -> Decimal {
    margin(product.cost, product.price)
}

/// Products per stock-status bucket
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StockStatusCounts {
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub adequate: usize,
    pub overstock: usize,
}

impl StockStatusCounts {
    fn record(&mut self, status: StockStatus) {
        match status {
            StockStatus::OutOfStock => self.out_of_stock += 1,
            StockStatus::LowStock => self.low_stock += 1,
            StockStatus::Adequate => self.adequate += 1,
            StockStatus::Overstock => self.overstock += 1,
        }
    }
}

/// Products per expiry bucket
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExpiryStatusCounts {
    pub expired: usize,
    pub critical: usize,
    pub warning: usize,
    pub safe: usize,
    pub no_expiry: usize,
}

impl ExpiryStatusCounts {
    fn record(&mut self, status: ExpiryStatus) {
        match status {
            ExpiryStatus::Expired => self.expired += 1,
            ExpiryStatus::Critical => self.critical += 1,
            ExpiryStatus::Warning => self.warning += 1,
            ExpiryStatus::Safe => self.safe += 1,
            ExpiryStatus::NoExpiry => self.no_expiry += 1,
        }
    }
}

/// A product whose expiry needs attention
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExpiringItem {
    pub product: Product,
    pub status: ExpiryStatus,
    pub days_remaining: i64,
}

/// Derived analytics for a product collection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsSnapshot {
    pub product_count: usize,
    pub total_units: u64,
    /// Σ price × stock
    pub total_value: Decimal,
    /// Σ cost × stock
    pub total_cost_value: Decimal,
    pub potential_profit: Decimal,
    pub average_margin: Decimal,
    pub stock_status: StockStatusCounts,
    pub expiry_status: ExpiryStatusCounts,
    pub category_values: BTreeMap<String, Decimal>,
    pub supplier_values: BTreeMap<String, Decimal>,
    pub location_values: BTreeMap<String, Decimal>,
    pub active_alerts: usize,
    pub low_stock_items: Vec<Product>,
    pub expiring_items: Vec<ExpiringItem>,
    pub generated_at: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    /// Snapshot of an empty collection
    pub fn empty() -> Self {
        aggregate(&[], Utc::now().date_naive())
    }
}

impl Default for AnalyticsSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Group key, falling back to [`UNCATEGORIZED`] for missing or blank values
pub fn group_key(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Sum inventory value per group key
pub fn breakdown_by<'a, F>(products: &'a [Product], key_fn: F) -> BTreeMap<String, Decimal>
where
    F: Fn(&'a Product) -> Option<&'a str>,
{
    let mut groups = BTreeMap::new();
    for product in products {
        let total = groups.entry(group_key(key_fn(product))).or_insert(Decimal::ZERO);
        *total = add_clamped(*total, product.value());
    }
    groups
}

/// Compute the full analytics snapshot for `products` as of `today`
pub fn aggregate(products: &[Product], today: NaiveDate) -> AnalyticsSnapshot {
    let mut total_units: u64 = 0;
    let mut total_value = Decimal::ZERO;
    let mut total_cost_value = Decimal::ZERO;
    let mut margin_sum = Decimal::ZERO;
    let mut stock_status = StockStatusCounts::default();
    let mut expiry_status = ExpiryStatusCounts::default();
    let mut category_values = BTreeMap::new();
    let mut supplier_values = BTreeMap::new();
    let mut location_values = BTreeMap::new();
    let mut low_stock_items: Vec<&Product> = Vec::new();
    let mut expiring_items: Vec<ExpiringItem> = Vec::new();

    for product in products {
        let value = product.value();
        total_units += u64::from(product.stock);
        total_value = add_clamped(total_value, value);
        total_cost_value = add_clamped(total_cost_value, product.cost_value());
        margin_sum = add_clamped(margin_sum, product_margin(product));

        let stock = classify_product(product);
        stock_status.record(stock.status);
        if stock.status.needs_attention() {
            low_stock_items.push(product);
        }

        let expiry = classify_expiry(product.expiry_date, today);
        expiry_status.record(expiry.status);
        if let (
            ExpiryStatus::Expired | ExpiryStatus::Critical | ExpiryStatus::Warning,
            Some(days_remaining),
        ) = (expiry.status, expiry.days_remaining)
        {
            expiring_items.push(ExpiringItem {
                product: product.clone(),
                status: expiry.status,
                days_remaining,
            });
        }

        let bucket = category_values
            .entry(group_key(product.category.as_deref()))
            .or_insert(Decimal::ZERO);
        *bucket = add_clamped(*bucket, value);
        let bucket = supplier_values
            .entry(group_key(product.supplier.as_deref()))
            .or_insert(Decimal::ZERO);
        *bucket = add_clamped(*bucket, value);
        let bucket = location_values
            .entry(group_key(product.location.as_deref()))
            .or_insert(Decimal::ZERO);
        *bucket = add_clamped(*bucket, value);
    }

    // sort_by_key is stable, ties keep collection order
    low_stock_items.sort_by_key(|product| product.stock);
    low_stock_items.truncate(ALERT_LIST_LIMIT);
    expiring_items.sort_by_key(|item| item.days_remaining);
    expiring_items.truncate(ALERT_LIST_LIMIT);

    let average_margin = if products.is_empty() {
        Decimal::ZERO
    } else {
        margin_sum / Decimal::from(products.len())
    };

    AnalyticsSnapshot {
        product_count: products.len(),
        total_units,
        total_value,
        total_cost_value,
        potential_profit: add_clamped(total_value, -total_cost_value),
        average_margin,
        active_alerts: stock_status.out_of_stock + stock_status.low_stock,
        stock_status,
        expiry_status,
        category_values,
        supplier_values,
        location_values,
        low_stock_items: low_stock_items.into_iter().cloned().collect(),
        expiring_items,
        generated_at: Utc::now(),
    }
}

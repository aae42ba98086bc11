//! WebAssembly bindings for the inventory dashboard
//!
//! Provides client-side computation for:
//! - Stock and expiry classification
//! - Margin calculation
//! - Analytics aggregation over a product list
//! - Filtering and sorting for the product grid

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::analytics::{aggregate, margin_display};
use shared::classifier::{classify, classify_expiry};
use shared::pipeline::{self, ProductFilter, SortField, SortSpec};
use shared::{Product, SortDirection};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date {}: {}", value, e))
}

fn parse_products(products_json: &str) -> Result<Vec<Product>, String> {
    serde_json::from_str(products_json).map_err(|e| format!("Invalid products JSON: {}", e))
}

/// Stock status label for a stock level
#[wasm_bindgen]
pub fn classify_stock_status(stock: u32, min_stock: u32) -> String {
    classify(stock, min_stock).label.to_string()
}

/// Stock status priority, 0 is the most urgent
#[wasm_bindgen]
pub fn stock_status_priority(stock: u32, min_stock: u32) -> u8 {
    classify(stock, min_stock).priority
}

fn expiry_label(expiry: Option<&str>, today: &str) -> Result<String, String> {
    let today = parse_date(today)?;
    let expiry = expiry
        .filter(|value| !value.trim().is_empty())
        .map(parse_date)
        .transpose()?;
    Ok(classify_expiry(expiry, today).label.to_string())
}

/// Expiry status label. Dates are `YYYY-MM-DD`; an empty expiry means none.
#[wasm_bindgen]
pub fn classify_expiry_status(expiry: Option<String>, today: &str) -> Result<String, JsValue> {
    expiry_label(expiry.as_deref(), today).map_err(|e| JsValue::from_str(&e))
}

/// Margin percentage relative to cost, rounded to two decimals
#[wasm_bindgen]
pub fn calculate_margin(cost: f64, price: f64) -> f64 {
    let cost = Decimal::try_from(cost).unwrap_or(Decimal::ZERO);
    let price = Decimal::try_from(price).unwrap_or(Decimal::ZERO);
    margin_display(cost, price).to_f64().unwrap_or(0.0)
}

fn aggregate_json(products_json: &str, today: &str) -> Result<String, String> {
    let products = parse_products(products_json)?;
    let snapshot = aggregate(&products, parse_date(today)?);
    serde_json::to_string(&snapshot).map_err(|e| format!("Failed to serialize analytics: {}", e))
}

/// Analytics snapshot (JSON) for a product list (JSON)
#[wasm_bindgen]
pub fn aggregate_inventory(products_json: &str, today: &str) -> Result<String, JsValue> {
    aggregate_json(products_json, today).map_err(|e| JsValue::from_str(&e))
}

fn filter_json(
    products_json: &str,
    filter_json: &str,
    sort_key: Option<&str>,
    descending: bool,
    today: &str,
) -> Result<String, String> {
    let products = parse_products(products_json)?;
    let filter: ProductFilter = if filter_json.trim().is_empty() {
        ProductFilter::default()
    } else {
        serde_json::from_str(filter_json).map_err(|e| format!("Invalid filter JSON: {}", e))?
    };
    let sort = match sort_key.filter(|key| !key.is_empty()) {
        Some(key) => Some(SortSpec {
            field: SortField::from_key(key).ok_or_else(|| format!("Unknown sort key: {}", key))?,
            direction: if descending {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }),
        None => None,
    };

    let view = pipeline::apply(&products, &filter, sort.as_ref(), parse_date(today)?);
    serde_json::to_string(&view).map_err(|e| format!("Failed to serialize products: {}", e))
}

/// Filtered and sorted product list (JSON)
#[wasm_bindgen]
pub fn filter_products(
    products_json: &str,
    filter: &str,
    sort_key: Option<String>,
    descending: bool,
    today: &str,
) -> Result<String, JsValue> {
    filter_json(products_json, filter, sort_key.as_deref(), descending, today)
        .map_err(|e| JsValue::from_str(&e))
}

//! Flat row projection shared by every export format
//!
//! Spreadsheet, document and delimited-text exports all go through
//! [`ExportRow::project`] so the numbers in each report agree.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::{margin_display, UNCATEGORIZED};
use crate::classifier::{classify_expiry, classify_product, ExpiryStatus};
use crate::models::Product;
use crate::types::{format_currency, format_percent, sum_clamped};

/// Fallback label when a product has no category, supplier or location
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Human-readable labels for category, supplier and location keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelLookup {
    pub categories: HashMap<String, String>,
    pub suppliers: HashMap<String, String>,
    pub locations: HashMap<String, String>,
}

impl LabelLookup {
    pub fn category(&self, key: Option<&str>) -> String {
        resolve(&self.categories, key)
    }

    pub fn supplier(&self, key: Option<&str>) -> String {
        resolve(&self.suppliers, key)
    }

    pub fn location(&self, key: Option<&str>) -> String {
        resolve(&self.locations, key)
    }
}

fn resolve(labels: &HashMap<String, String>, key: Option<&str>) -> String {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() && key != UNCATEGORIZED => labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string()),
        _ => UNCATEGORIZED_LABEL.to_string(),
    }
}

/// Column headers, in [`ExportRow`] field order
pub const EXPORT_HEADERS: [&str; 13] = [
    "Code",
    "Name",
    "Category",
    "Supplier",
    "Location",
    "Stock",
    "Min Stock",
    "Cost",
    "Price",
    "Margin",
    "Stock Status",
    "Expiry Date",
    "Inventory Value",
];

/// One exported line
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportRow {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Supplier")]
    pub supplier: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Stock")]
    pub stock: u32,
    #[serde(rename = "Min Stock")]
    pub min_stock: u32,
    #[serde(rename = "Cost")]
    pub cost: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Margin")]
    pub margin: String,
    #[serde(rename = "Stock Status")]
    pub stock_status: String,
    #[serde(rename = "Expiry Date")]
    pub expiry_date: String,
    #[serde(rename = "Inventory Value")]
    pub inventory_value: String,
}

impl ExportRow {
    pub fn project(product: &Product, labels: &LabelLookup, today: NaiveDate) -> Self {
        let stock_status = classify_product(product);
        let expiry = classify_expiry(product.expiry_date, today);
        let mut status = stock_status.label.to_string();
        if expiry.status == ExpiryStatus::Expired {
            status.push_str(" (expired)");
        }

        Self {
            code: product.code.clone(),
            name: product.name.clone(),
            category: labels.category(product.category.as_deref()),
            supplier: labels.supplier(product.supplier.as_deref()),
            location: labels.location(product.location.as_deref()),
            stock: product.stock,
            min_stock: product.min_stock,
            cost: format_currency(product.cost),
            price: format_currency(product.price),
            margin: format_percent(margin_display(product.cost, product.price)),
            stock_status: status,
            expiry_date: product
                .expiry_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            inventory_value: format_currency(product.value()),
        }
    }

    /// Cells as strings, in header order
    pub fn cells(&self) -> [String; 13] {
        [
            self.code.clone(),
            self.name.clone(),
            self.category.clone(),
            self.supplier.clone(),
            self.location.clone(),
            self.stock.to_string(),
            self.min_stock.to_string(),
            self.cost.clone(),
            self.price.clone(),
            self.margin.clone(),
            self.stock_status.clone(),
            self.expiry_date.clone(),
            self.inventory_value.clone(),
        ]
    }
}

/// Totals printed under an exported table
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportTotals {
    pub rows: usize,
    pub total_units: u64,
    pub total_value: Decimal,
}

/// Project a whole collection plus its totals
pub fn project_rows(
    products: &[Product],
    labels: &LabelLookup,
    today: NaiveDate,
) -> (Vec<ExportRow>, ExportTotals) {
    let rows = products
        .iter()
        .map(|product| ExportRow::project(product, labels, today))
        .collect();
    let totals = ExportTotals {
        rows: products.len(),
        total_units: products.iter().map(|p| u64::from(p.stock)).sum(),
        total_value: sum_clamped(products.iter().map(Product::value)),
    };
    (rows, totals)
}

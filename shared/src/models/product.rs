//! Product catalog models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::mul_clamped;

/// A catalog product as held by the inventory store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    /// Unit of measure (piece, box, litre, ...)
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub batch: Option<String>,
    pub serial_number: Option<String>,
    pub stock: u32,
    pub min_stock: u32,
    pub max_stock: Option<u32>,
    pub cost: Decimal,
    pub price: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub perishable: bool,
    pub requires_batch_control: bool,
    pub status: ProductStatus,
    pub images: Vec<String>,
    /// Opaque identifiers into the attachment store
    pub attachments: Vec<String>,
}

impl Product {
    /// Inventory value at sale price (`price × stock`)
    pub fn value(&self) -> Decimal {
        mul_clamped(self.price, Decimal::from(self.stock))
    }

    /// Inventory value at cost (`cost × stock`)
    pub fn cost_value(&self) -> Decimal {
        mul_clamped(self.cost, Decimal::from(self.stock))
    }
}

/// Catalog lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    Discontinued,
    OutOfStock,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Discontinued => "discontinued",
            ProductStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating a product
///
/// Only `code` and `name` are required, everything else falls back to a
/// default (zero stock, zero cost and price, active status).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub batch: Option<String>,
    pub serial_number: Option<String>,
    pub stock: Option<u32>,
    pub min_stock: Option<u32>,
    pub max_stock: Option<u32>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub perishable: bool,
    pub requires_batch_control: bool,
    pub status: Option<ProductStatus>,
    pub images: Vec<String>,
    pub attachments: Vec<String>,
}

impl ProductInput {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a product. `None` leaves the field untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProductPatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub unit: Option<String>,
    pub barcode: Option<String>,
    pub batch: Option<String>,
    pub serial_number: Option<String>,
    pub stock: Option<u32>,
    pub min_stock: Option<u32>,
    pub max_stock: Option<u32>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub perishable: Option<bool>,
    pub requires_batch_control: Option<bool>,
    pub status: Option<ProductStatus>,
    pub images: Option<Vec<String>>,
    pub attachments: Option<Vec<String>>,
}

impl ProductPatch {
    /// Apply the patch to a copy of `product`
    pub fn applied_to(&self, product: &Product) -> Product {
        let mut next = product.clone();
        macro_rules! set {
            ($($field:ident),*) => {
                $(if let Some(value) = &self.$field {
                    next.$field = value.clone();
                })*
            };
        }
        macro_rules! set_opt {
            ($($field:ident),*) => {
                $(if let Some(value) = &self.$field {
                    next.$field = Some(value.clone());
                })*
            };
        }
        set!(code, name, stock, min_stock, cost, price, perishable, requires_batch_control, status, images, attachments);
        set_opt!(description, category, supplier, location, unit, barcode, batch, serial_number, max_stock, expiry_date);
        next
    }
}

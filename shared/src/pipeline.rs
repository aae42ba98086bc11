//! Filter and sort pipeline for product listings
//!
//! Predicates are independent and ANDed together; an absent predicate always
//! matches. Sorting is stable and never touches the input collection.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analytics::product_margin;
use crate::classifier::{classify_expiry, classify_product, reorder_quantity, EXPIRY_WARNING_DAYS};
use crate::models::{Product, ProductStatus};
use crate::types::{DateRange, SortDirection};

/// Declarative product filter. All predicates are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-insensitive substring over name, code, category and supplier
    pub search: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub location: Option<String>,
    pub status: Option<ProductStatus>,
    pub min_cost: Option<Decimal>,
    pub max_cost: Option<Decimal>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Range over the creation date
    pub created: DateRange,
    pub low_stock_only: bool,
    pub reorder_needed: bool,
    pub expiring_soon: bool,
    pub perishable_only: bool,
}

impl ProductFilter {
    /// True when no predicate is set
    pub fn is_empty(&self) -> bool {
        *self == ProductFilter::default()
    }

    /// Evaluate every predicate against one product
    pub fn matches(&self, product: &Product, today: NaiveDate) -> bool {
        self.matches_search(product)
            && matches_label(self.category.as_deref(), product.category.as_deref())
            && matches_label(self.supplier.as_deref(), product.supplier.as_deref())
            && matches_label(self.location.as_deref(), product.location.as_deref())
            && self.status.map_or(true, |status| product.status == status)
            && in_range(product.cost, self.min_cost, self.max_cost)
            && in_range(product.price, self.min_price, self.max_price)
            && self.matches_created(product)
            && (!self.low_stock_only || product.stock <= product.min_stock)
            && (!self.reorder_needed
                || (product.stock <= product.min_stock && reorder_quantity(product) > 0))
            && (!self.expiring_soon || is_expiring_soon(product, today))
            && (!self.perishable_only || product.perishable)
    }

    fn matches_search(&self, product: &Product) -> bool {
        let term = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };

        [
            Some(product.name.as_str()),
            Some(product.code.as_str()),
            product.category.as_deref(),
            product.supplier.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
    }

    fn matches_created(&self, product: &Product) -> bool {
        if self.created.is_unbounded() {
            return true;
        }
        product
            .created_at
            .map_or(false, |created_at| self.created.contains(created_at.date_naive()))
    }
}

fn matches_label(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted.map(str::trim) {
        Some(wanted) if !wanted.is_empty() => {
            let wanted = wanted.to_lowercase();
            actual.map_or(false, |actual| actual.trim().to_lowercase() == wanted)
        }
        _ => true,
    }
}

fn in_range(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

fn is_expiring_soon(product: &Product, today: NaiveDate) -> bool {
    classify_expiry(product.expiry_date, today)
        .days_remaining
        .map_or(false, |days| (0..=EXPIRY_WARNING_DAYS).contains(&days))
}

/// Sortable product attributes, including computed keys
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Code,
    Name,
    Category,
    Supplier,
    Location,
    Stock,
    MinStock,
    Cost,
    Price,
    ExpiryDate,
    CreatedAt,
    UpdatedAt,
    /// Stock-status priority rank (out of stock first)
    StockStatus,
    /// Margin percentage
    Margin,
    /// price × stock
    Value,
}

impl SortField {
    /// Resolve a sort key from either the internal or the dashboard vocabulary
    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key {
            "code" => SortField::Code,
            "name" => SortField::Name,
            "category" => SortField::Category,
            "supplier" => SortField::Supplier,
            "location" => SortField::Location,
            "stock" | "currentStock" | "current_stock" => SortField::Stock,
            "min_stock" | "minStock" | "minimumStock" | "minimum_stock" => SortField::MinStock,
            "cost" => SortField::Cost,
            "price" => SortField::Price,
            "expiry_date" | "expiryDate" => SortField::ExpiryDate,
            "created_at" | "createdAt" => SortField::CreatedAt,
            "updated_at" | "updatedAt" => SortField::UpdatedAt,
            "stock_status" | "stockStatus" => SortField::StockStatus,
            "margin" => SortField::Margin,
            "value" | "totalValue" => SortField::Value,
            _ => return None,
        };
        Some(field)
    }
}

/// A (field, direction) pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Case-insensitive text, missing values as the empty string
fn text_key(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}

/// Compare two products on one field, ascending
pub fn compare_by(field: SortField, a: &Product, b: &Product) -> Ordering {
    match field {
        SortField::Code => text_key(Some(a.code.as_str())).cmp(&text_key(Some(b.code.as_str()))),
        SortField::Name => text_key(Some(a.name.as_str())).cmp(&text_key(Some(b.name.as_str()))),
        SortField::Category => text_key(a.category.as_deref()).cmp(&text_key(b.category.as_deref())),
        SortField::Supplier => text_key(a.supplier.as_deref()).cmp(&text_key(b.supplier.as_deref())),
        SortField::Location => text_key(a.location.as_deref()).cmp(&text_key(b.location.as_deref())),
        SortField::Stock => a.stock.cmp(&b.stock),
        SortField::MinStock => a.min_stock.cmp(&b.min_stock),
        SortField::Cost => a.cost.cmp(&b.cost),
        SortField::Price => a.price.cmp(&b.price),
        // None orders below Some, so missing dates are the lowest value
        SortField::ExpiryDate => a.expiry_date.cmp(&b.expiry_date),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::StockStatus => classify_product(a).priority.cmp(&classify_product(b).priority),
        SortField::Margin => product_margin(a).cmp(&product_margin(b)),
        SortField::Value => a.value().cmp(&b.value()),
    }
}

/// Keep the products that match `filter`, in input order
pub fn filter(products: &[Product], filter: &ProductFilter, today: NaiveDate) -> Vec<Product> {
    products
        .iter()
        .filter(|product| filter.matches(product, today))
        .cloned()
        .collect()
}

/// Stable sort of a copy of `products`
pub fn sort(products: &[Product], spec: &SortSpec) -> Vec<Product> {
    let mut sorted = products.to_vec();
    sort_in_place(&mut sorted, spec);
    sorted
}

fn sort_in_place(products: &mut [Product], spec: &SortSpec) {
    match spec.direction {
        SortDirection::Asc => products.sort_by(|a, b| compare_by(spec.field, a, b)),
        SortDirection::Desc => products.sort_by(|a, b| compare_by(spec.field, b, a)),
    }
}

/// Filter then sort. `sort: None` keeps the collection order.
pub fn apply(
    products: &[Product],
    filter_spec: &ProductFilter,
    sort_spec: Option<&SortSpec>,
    today: NaiveDate,
) -> Vec<Product> {
    let mut view = filter(products, filter_spec, today);
    if let Some(spec) = sort_spec {
        sort_in_place(&mut view, spec);
    }
    view
}

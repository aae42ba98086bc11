//! Stock and expiry classification
//!
//! Both classifiers are total: every input maps to exactly one bucket, and a
//! missing expiry date is its own bucket rather than an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Product;

/// Days ahead at or below which an expiry date is critical
pub const EXPIRY_CRITICAL_DAYS: i64 = 7;

/// Days ahead at or below which an expiry date is a warning
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Stock urgency buckets, most urgent first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    LowStock,
    Adequate,
    Overstock,
}

impl StockStatus {
    /// Sort rank, 0 is the most urgent
    pub fn priority(&self) -> u8 {
        match self {
            StockStatus::OutOfStock => 0,
            StockStatus::LowStock => 1,
            StockStatus::Adequate => 2,
            StockStatus::Overstock => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::OutOfStock => "Out of stock",
            StockStatus::LowStock => "Low stock",
            StockStatus::Adequate => "Adequate",
            StockStatus::Overstock => "Overstock",
        }
    }

    /// True for the buckets that raise an alert
    pub fn needs_attention(&self) -> bool {
        matches!(self, StockStatus::OutOfStock | StockStatus::LowStock)
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of [`classify`]
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StockClassification {
    pub status: StockStatus,
    pub priority: u8,
    pub label: &'static str,
}

impl From<StockStatus> for StockClassification {
    fn from(status: StockStatus) -> Self {
        Self {
            status,
            priority: status.priority(),
            label: status.label(),
        }
    }
}

/// Classify current stock against the minimum threshold
pub fn classify(stock: u32, min_stock: u32) -> StockClassification {
    let stock = u64::from(stock);
    let min_stock = u64::from(min_stock);

    let status = if stock == 0 {
        StockStatus::OutOfStock
    } else if stock <= min_stock {
        StockStatus::LowStock
    } else if stock <= min_stock * 2 {
        StockStatus::Adequate
    } else {
        StockStatus::Overstock
    };

    status.into()
}

/// Classify a product's stock level
pub fn classify_product(product: &Product) -> StockClassification {
    classify(product.stock, product.min_stock)
}

/// Expiry buckets, most urgent first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Safe,
    NoExpiry,
}

impl ExpiryStatus {
    pub fn priority(&self) -> u8 {
        match self {
            ExpiryStatus::Expired => 0,
            ExpiryStatus::Critical => 1,
            ExpiryStatus::Warning => 2,
            ExpiryStatus::Safe => 3,
            ExpiryStatus::NoExpiry => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "Expired",
            ExpiryStatus::Critical => "Expires within 7 days",
            ExpiryStatus::Warning => "Expires within 30 days",
            ExpiryStatus::Safe => "Safe",
            ExpiryStatus::NoExpiry => "No expiry",
        }
    }
}

/// Result of [`classify_expiry`]
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ExpiryClassification {
    pub status: ExpiryStatus,
    pub priority: u8,
    pub label: &'static str,
    /// Days until expiry, negative once expired. `None` without a date.
    pub days_remaining: Option<i64>,
}

/// Classify an expiry date relative to `today`
pub fn classify_expiry(expiry_date: Option<NaiveDate>, today: NaiveDate) -> ExpiryClassification {
    let days_remaining = expiry_date.map(|date| (date - today).num_days());

    let status = match days_remaining {
        None => ExpiryStatus::NoExpiry,
        Some(days) if days < 0 => ExpiryStatus::Expired,
        Some(days) if days <= EXPIRY_CRITICAL_DAYS => ExpiryStatus::Critical,
        Some(days) if days <= EXPIRY_WARNING_DAYS => ExpiryStatus::Warning,
        Some(_) => ExpiryStatus::Safe,
    };

    ExpiryClassification {
        status,
        priority: status.priority(),
        label: status.label(),
        days_remaining,
    }
}

/// Units needed to bring a product back up to its target level.
///
/// The target is the maximum stock when set, otherwise twice the minimum.
pub fn reorder_quantity(product: &Product) -> u32 {
    let target = product
        .max_stock
        .map(u64::from)
        .unwrap_or_else(|| u64::from(product.min_stock) * 2);
    let missing = target.saturating_sub(u64::from(product.stock));
    u32::try_from(missing).unwrap_or(u32::MAX)
}

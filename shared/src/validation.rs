//! Validation for product submissions
//!
//! Create-path checks run locally before anything reaches the network.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ProductInput;

/// A rejected field
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Validate that a required text field is not blank
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    Ok(())
}

/// Validate that an amount is not negative
pub fn validate_non_negative(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::new(field, "Amount cannot be negative"));
    }
    Ok(())
}

/// Validate that the sale price covers the cost
pub fn validate_price_covers_cost(price: Decimal, cost: Decimal) -> Result<(), ValidationError> {
    if price < cost {
        return Err(ValidationError::new(
            "price",
            "Sale price cannot be lower than cost",
        ));
    }
    Ok(())
}

/// Validate a product before creation.
///
/// Updates are deliberately not routed through here: an edit may lower the
/// price below cost.
pub fn validate_product_input(input: &ProductInput) -> Result<(), ValidationError> {
    validate_required("code", &input.code)?;
    validate_required("name", &input.name)?;

    let cost = input.cost.unwrap_or(Decimal::ZERO);
    let price = input.price.unwrap_or(Decimal::ZERO);
    validate_non_negative("cost", cost)?;
    validate_non_negative("price", price)?;
    validate_price_covers_cost(price, cost)?;

    Ok(())
}

/// Check if an edited price has dropped below cost
pub fn is_below_cost(price: Decimal, cost: Decimal) -> bool {
    price < cost
}

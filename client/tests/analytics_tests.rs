//! Inventory analytics tests
//!
//! Tests for stock valuation including:
//! - Classifier totality and thresholds
//! - Margin guard against zero cost
//! - Aggregation totals matching their breakdowns

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::analytics::{aggregate, margin, ALERT_LIST_LIMIT, UNCATEGORIZED};
use shared::classifier::{classify, classify_expiry, ExpiryStatus, StockStatus};
use shared::Product;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn product(code: &str, category: Option<&str>, supplier: Option<&str>, stock: u32, price: &str) -> Product {
    Product {
        id: code.to_lowercase(),
        code: code.into(),
        name: code.into(),
        category: category.map(str::to_string),
        supplier: supplier.map(str::to_string),
        stock,
        min_stock: 3,
        cost: dec("1.00"),
        price: dec(price),
        ..Default::default()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_stock_thresholds() {
        assert_eq!(classify(0, 5).status, StockStatus::OutOfStock);
        assert_eq!(classify(5, 5).status, StockStatus::LowStock);
        assert_eq!(classify(10, 5).status, StockStatus::Adequate);
        assert_eq!(classify(11, 5).status, StockStatus::Overstock);
        // Zero minimum: anything on the shelf is overstock
        assert_eq!(classify(1, 0).status, StockStatus::Overstock);
    }

    #[test]
    fn test_expiry_windows() {
        let today = today();
        assert_eq!(classify_expiry(None, today).status, ExpiryStatus::NoExpiry);
        assert_eq!(
            classify_expiry(Some(today - Duration::days(1)), today).status,
            ExpiryStatus::Expired
        );
        assert_eq!(classify_expiry(Some(today), today).status, ExpiryStatus::Critical);
        assert_eq!(
            classify_expiry(Some(today + Duration::days(30)), today).status,
            ExpiryStatus::Warning
        );
        assert_eq!(
            classify_expiry(Some(today + Duration::days(31)), today).status,
            ExpiryStatus::Safe
        );
    }

    #[test]
    fn test_margin_guard() {
        assert_eq!(margin(Decimal::ZERO, dec("10")), Decimal::ZERO);
        assert_eq!(margin(dec("8"), dec("10")), dec("25"));
    }

    #[test]
    fn test_breakdown_uses_uncategorized_bucket() {
        let products = vec![
            product("A", Some("screens"), Some("acme"), 2, "10.00"),
            product("B", None, Some("acme"), 1, "5.00"),
            product("C", Some("  "), None, 4, "2.50"),
        ];
        let snapshot = aggregate(&products, today());

        assert_eq!(snapshot.category_values["screens"], dec("20.00"));
        assert_eq!(snapshot.category_values[UNCATEGORIZED], dec("15.00"));
        assert_eq!(snapshot.supplier_values["acme"], dec("25.00"));
        assert_eq!(snapshot.total_value, dec("35.00"));
        assert_eq!(snapshot.total_units, 7);
    }

    #[test]
    fn test_empty_collection() {
        let snapshot = aggregate(&[], today());
        assert_eq!(snapshot.product_count, 0);
        assert_eq!(snapshot.total_value, Decimal::ZERO);
        assert_eq!(snapshot.average_margin, Decimal::ZERO);
        assert!(snapshot.low_stock_items.is_empty());
    }

    #[test]
    fn test_alert_lists_are_capped() {
        let products: Vec<Product> = (0..25)
            .map(|i| product(&format!("P{}", i), None, None, 1, "1.00"))
            .collect();
        let snapshot = aggregate(&products, today());
        assert_eq!(snapshot.low_stock_items.len(), ALERT_LIST_LIMIT);
        assert_eq!(snapshot.stock_status.low_stock, 25);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn label_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("screens".to_string())),
            Just(Some("batteries".to_string())),
            Just(Some("cables".to_string())),
        ]
    }

    prop_compose! {
        fn product_strategy()(
            stock in 0u32..500,
            min_stock in 0u32..50,
            cost_cents in 0i64..100_000,
            price_cents in 0i64..150_000,
            category in label_strategy(),
            supplier in label_strategy(),
            expiry_offset in prop::option::of(-60i64..120),
        ) -> Product {
            Product {
                stock,
                min_stock,
                cost: Decimal::new(cost_cents, 2),
                price: Decimal::new(price_cents, 2),
                category,
                supplier,
                expiry_date: expiry_offset.map(|days| today() + Duration::days(days)),
                ..Default::default()
            }
        }
    }

    proptest! {
        /// Every (stock, min) pair gets exactly one status
        #[test]
        fn prop_classifier_is_total(stock in any::<u32>(), min_stock in any::<u32>()) {
            let result = classify(stock, min_stock);
            prop_assert!(result.priority <= 3);
            prop_assert_eq!(result.priority, result.status.priority());
            if stock == 0 {
                prop_assert_eq!(result.status, StockStatus::OutOfStock);
            }
        }

        /// Zero cost never divides
        #[test]
        fn prop_margin_zero_cost(price_cents in 0i64..10_000_000) {
            prop_assert_eq!(margin(Decimal::ZERO, Decimal::new(price_cents, 2)), Decimal::ZERO);
        }

        /// Totals equal the sum of each breakdown
        #[test]
        fn prop_totals_match_breakdowns(products in prop::collection::vec(product_strategy(), 0..40)) {
            let snapshot = aggregate(&products, today());

            let by_category: Decimal = snapshot.category_values.values().copied().sum();
            let by_supplier: Decimal = snapshot.supplier_values.values().copied().sum();
            prop_assert_eq!(by_category, snapshot.total_value);
            prop_assert_eq!(by_supplier, snapshot.total_value);

            let counted = snapshot.stock_status.out_of_stock
                + snapshot.stock_status.low_stock
                + snapshot.stock_status.adequate
                + snapshot.stock_status.overstock;
            prop_assert_eq!(counted, products.len());
            prop_assert_eq!(snapshot.potential_profit, snapshot.total_value - snapshot.total_cost_value);
            prop_assert!(snapshot.low_stock_items.len() <= ALERT_LIST_LIMIT);
            prop_assert!(snapshot.expiring_items.len() <= ALERT_LIST_LIMIT);
        }
    }
}

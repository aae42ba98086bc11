//! Inventory store tests
//!
//! Store behaviour against an in-memory gateway:
//! - optimistic delete and rollback
//! - error taxonomy and notifications
//! - field mapping at the API boundary
//! - change events

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use common::{api_product, harness, harness_with_session, Failure};
use rust_decimal::Decimal;
use shared::pipeline::{ProductFilter, SortField, SortSpec};
use shared::{ProductInput, ProductPatch, StockStatus};
use shop_inventory::services::Severity;
use shop_inventory::{ChangeEvent, ChangeKind, ErrorKind, InventoryError, SessionContext, INVENTORY_CHANGED};

fn three_products() -> Vec<shop_inventory::external::ApiProduct> {
    vec![
        api_product("a", "A-1", 10, 2),
        api_product("b", "B-1", 4, 2),
        api_product("c", "C-1", 0, 1),
    ]
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_list_replaces_collection_and_recomputes_analytics() {
    let h = harness(three_products());
    let products = h.store.list().await.unwrap();

    assert_eq!(products.len(), 3);
    assert_eq!(h.store.len(), 3);
    let analytics = h.store.analytics();
    assert_eq!(analytics.product_count, 3);
    assert_eq!(analytics.total_units, 14);
    assert_eq!(analytics.total_value, Decimal::from(14 * 12));
    assert_eq!(analytics.stock_status.out_of_stock, 1);
}

#[tokio::test]
async fn test_low_stock_scenario() {
    let h = harness(vec![api_product("p", "BAT-1", 2, 5)]);
    h.store.list().await.unwrap();

    let product = h.store.product("p").unwrap();
    let status = shared::classifier::classify_product(&product);
    assert_eq!(status.status, StockStatus::LowStock);
    assert_eq!(status.priority, 1);

    let analytics = h.store.analytics();
    assert_eq!(analytics.low_stock_items.len(), 1);
    assert_eq!(analytics.low_stock_items[0].id, "p");
}

#[tokio::test]
async fn test_view_filters_and_sorts_snapshot() {
    let h = harness(three_products());
    h.store.list().await.unwrap();

    let filter = ProductFilter {
        low_stock_only: true,
        ..Default::default()
    };
    let view = h.store.view(&filter, Some(&SortSpec::desc(SortField::Code)));
    let codes: Vec<&str> = view.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["C-1"]);

    let all = h.store.view(&ProductFilter::default(), Some(&SortSpec::asc(SortField::Stock)));
    assert_eq!(all.first().unwrap().code, "C-1");
    assert_eq!(h.store.len(), 3);
}

// ============================================================================
// Optimistic delete
// ============================================================================

#[tokio::test]
async fn test_failed_delete_restores_original_order() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let before = h.store.products();

    h.gateway.fail_next(Failure::ServerError);
    let err = h.store.delete("b").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert_eq!(h.store.products(), before);
    assert_eq!(h.gateway.remote_len(), 3);
    assert_eq!(h.sink.last().unwrap().severity(), Severity::Error);
}

#[tokio::test]
async fn test_successful_delete_publishes() {
    let h = harness(three_products());
    h.store.list().await.unwrap();

    let seen: Arc<Mutex<Vec<ChangeEvent>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let _sub = h.channel.subscribe(INVENTORY_CHANGED, move |event: &ChangeEvent| {
        sink.lock().unwrap().push(event.clone());
    });

    h.store.delete("b").await.unwrap();

    let codes: Vec<String> = h.store.products().into_iter().map(|p| p.code).collect();
    assert_eq!(codes, vec!["A-1", "C-1"]);
    assert_eq!(h.store.analytics().product_count, 2);

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, ChangeKind::Deleted);
    assert_eq!(events[0].product_id.as_deref(), Some("b"));
    assert_eq!(events[0].product_count, 2);
}

#[tokio::test]
async fn test_analytics_track_collection_while_delete_is_in_flight() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let gate = h.gateway.hold_deletes();

    let check = async {
        gate.entered.notified().await;
        assert_eq!(h.store.len(), 2);
        assert_eq!(h.store.analytics().product_count, h.store.len());
        gate.release.notify_one();
    };
    let (result, ()) = tokio::join!(h.store.delete("b"), check);

    result.unwrap();
    assert_eq!(h.store.analytics().product_count, 2);
}

#[tokio::test]
async fn test_rollback_restores_analytics_with_the_product() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let before = h.store.analytics();
    let gate = h.gateway.hold_deletes();
    h.gateway.fail_next(Failure::ServerError);

    let check = async {
        gate.entered.notified().await;
        assert_eq!(h.store.analytics().product_count, 2);
        gate.release.notify_one();
    };
    let (result, ()) = tokio::join!(h.store.delete("b"), check);

    assert!(result.is_err());
    let after = h.store.analytics();
    assert_eq!(after.product_count, 3);
    assert_eq!(after.product_count, h.store.len());
    assert_eq!(after.total_value, before.total_value);
    assert_eq!(after.total_units, before.total_units);
}

#[tokio::test]
async fn test_delete_unknown_id_makes_no_call() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let calls = h.gateway.calls();

    let err = h.store.delete("zzz").await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(_)));
    assert_eq!(h.gateway.calls(), calls);
    assert_eq!(h.store.len(), 3);
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[tokio::test]
async fn test_rate_limit_is_distinct_from_server_error() {
    let h = harness(three_products());
    h.store.list().await.unwrap();

    h.gateway.fail_next(Failure::RateLimited(Some(20)));
    let limited = h.store.update("a", ProductPatch::default()).await.unwrap_err();
    let limited_toast = h.sink.last().unwrap();

    h.gateway.fail_next(Failure::ServerError);
    let failed = h.store.update("a", ProductPatch::default()).await.unwrap_err();
    let failed_toast = h.sink.last().unwrap();

    assert_eq!(limited.kind(), ErrorKind::RateLimited);
    assert_eq!(failed.kind(), ErrorKind::Unknown);
    assert_eq!(limited_toast.severity(), Severity::Warning);
    assert_eq!(limited_toast.message(), "Server busy, retry in 20 seconds");
    assert_eq!(failed_toast.severity(), Severity::Error);
    assert_ne!(limited_toast.message(), failed_toast.message());
}

#[tokio::test]
async fn test_remote_rejection_leaves_state_untouched() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let before = h.store.products();

    h.gateway.fail_next(Failure::Rejected);
    let err = h.store.create(ProductInput::new("A-1", "Duplicate")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteRejected);
    assert_eq!(h.sink.last().unwrap().message(), "Code already exists");
    assert_eq!(h.store.products(), before);
}

#[tokio::test]
async fn test_transport_failure_on_list() {
    let h = harness(three_products());
    h.gateway.fail_next(Failure::Transport);

    let err = h.store.list().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_expired_session_skips_network() {
    let expired = SessionContext::new("old-token", Some(Utc::now() - Duration::minutes(5)));
    let h = harness_with_session(three_products(), expired);

    let err = h.store.list().await.unwrap_err();
    assert!(matches!(err, InventoryError::SessionExpired));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(h.gateway.calls(), 0);

    h.store.set_session(SessionContext::new("fresh-token", None));
    assert_eq!(h.store.list().await.unwrap().len(), 3);
}

// ============================================================================
// Create / update
// ============================================================================

#[tokio::test]
async fn test_validation_failure_makes_no_network_call() {
    let h = harness(vec![]);

    let mut input = ProductInput::new("SCR-1", "Screen");
    input.cost = Some(Decimal::from(50));
    input.price = Some(Decimal::from(40));
    let err = h.store.create(input).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.detail().field.as_deref(), Some("price"));
    assert_eq!(h.gateway.calls(), 0);
    assert_eq!(h.sink.last().unwrap().severity(), Severity::Warning);

    let err = h.store.create(ProductInput::new("  ", "Screen")).await.unwrap_err();
    assert_eq!(err.detail().field.as_deref(), Some("code"));
    assert_eq!(h.gateway.calls(), 0);
}

#[tokio::test]
async fn test_create_appends_canonical_record() {
    let h = harness(vec![]);
    let events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&events);
    let _sub = h.channel.subscribe(INVENTORY_CHANGED, move |event: &ChangeEvent| {
        assert_eq!(event.kind, ChangeKind::Created);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut input = ProductInput::new("SCR-1", "Screen");
    input.stock = Some(3);
    input.min_stock = Some(1);
    input.cost = Some(Decimal::from(40));
    input.price = Some(Decimal::from(65));
    let created = h.store.create(input).await.unwrap();

    assert!(!created.id.is_empty());
    assert_eq!(created.stock, 3);
    assert_eq!(h.store.product(&created.id), Some(created.clone()));
    assert_eq!(h.store.analytics().total_units, 3);
    assert_eq!(events.load(Ordering::SeqCst), 1);
    assert_eq!(h.sink.last().unwrap().severity(), Severity::Success);

    let body = h.gateway.last_payload().unwrap();
    assert_eq!(body["currentStock"], 3);
    assert_eq!(body["minimumStock"], 1);
    assert!(body.get("stock").is_none());
}

#[tokio::test]
async fn test_stock_round_trips_through_external_names() {
    let mut remote = api_product("p", "BAT-1", 7, 2);
    remote.maximum_stock = Some(30);
    let h = harness(vec![remote]);
    h.store.list().await.unwrap();

    let product = h.store.product("p").unwrap();
    assert_eq!(product.stock, 7);
    assert_eq!(product.max_stock, Some(30));

    let patch = ProductPatch {
        stock: Some(product.stock),
        ..Default::default()
    };
    let updated = h.store.update("p", patch).await.unwrap();

    let body = h.gateway.last_payload().unwrap();
    assert_eq!(body["currentStock"], 7);
    assert!(body.get("stock").is_none());
    assert_eq!(updated.stock, 7);
}

#[tokio::test]
async fn test_update_allows_price_below_cost() {
    let h = harness(three_products());
    h.store.list().await.unwrap();

    let patch = ProductPatch {
        price: Some(Decimal::from(5)),
        ..Default::default()
    };
    let updated = h.store.update("a", patch).await.unwrap();

    assert_eq!(updated.price, Decimal::from(5));
    assert_eq!(h.store.product("a").unwrap().price, Decimal::from(5));
    assert_eq!(h.store.len(), 3);
}

#[tokio::test]
async fn test_failed_update_leaves_record() {
    let h = harness(three_products());
    h.store.list().await.unwrap();
    let before = h.store.product("a").unwrap();

    h.gateway.fail_next(Failure::ServerError);
    let patch = ProductPatch {
        stock: Some(99),
        ..Default::default()
    };
    assert!(h.store.update("a", patch).await.is_err());
    assert_eq!(h.store.product("a").unwrap(), before);
}

#[tokio::test]
async fn test_dashboard_passes_remote_summary_through() {
    let h = harness(three_products());
    let summary = h.store.dashboard().await.unwrap();
    assert_eq!(summary["totalProducts"], 3);
}

#[test]
fn test_store_read_side_is_sync() {
    let h = harness(three_products());
    tokio_test::block_on(h.store.list()).unwrap();
    assert_eq!(h.store.products().len(), 3);
}

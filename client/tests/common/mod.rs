//! Test doubles shared by the client integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Notify;
use shop_inventory::external::{ApiProduct, ApiProductPayload, InventoryGateway};
use shop_inventory::services::{NotificationSink, Toast};
use shop_inventory::{ChangeChannel, InventoryError, InventoryResult, InventoryStore, SessionContext};

/// Failure the mock gateway should return on its next call
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    RateLimited(Option<u64>),
    ServerError,
    Rejected,
    Transport,
}

impl Failure {
    fn into_error(self) -> InventoryError {
        match self {
            Failure::RateLimited(retry) => InventoryError::from_status(429, "Too Many Requests", retry),
            Failure::ServerError => InventoryError::from_status(500, "Internal Server Error", None),
            Failure::Rejected => InventoryError::from_status(409, "Code already exists", None),
            Failure::Transport => InventoryError::Transport("connection refused".into()),
        }
    }
}

/// In-memory inventory API
#[derive(Default)]
pub struct MockGateway {
    products: Mutex<Vec<ApiProduct>>,
    fail_next: Mutex<Option<Failure>>,
    calls: AtomicUsize,
    last_payload: Mutex<Option<serde_json::Value>>,
    delete_gate: Mutex<Option<DeleteGate>>,
}

/// Holds remote deletes in flight until released
#[derive(Clone, Default)]
pub struct DeleteGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl MockGateway {
    pub fn with_products(products: Vec<ApiProduct>) -> Arc<Self> {
        Arc::new(Self {
            products: Mutex::new(products),
            ..Default::default()
        })
    }

    pub fn fail_next(&self, failure: Failure) {
        *self.fail_next.lock().unwrap() = Some(failure);
    }

    /// Park every following delete until `release` is notified
    pub fn hold_deletes(&self) -> DeleteGate {
        let gate = DeleteGate::default();
        *self.delete_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// JSON body of the last create/update request
    pub fn last_payload(&self) -> Option<serde_json::Value> {
        self.last_payload.lock().unwrap().clone()
    }

    pub fn remote_len(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    fn begin(&self, payload: Option<&ApiProductPayload>) -> InventoryResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(payload) = payload {
            *self.last_payload.lock().unwrap() = Some(serde_json::to_value(payload).unwrap());
        }
        match self.fail_next.lock().unwrap().take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }
}

/// Apply a JSON payload onto a JSON product, the way the server would
fn merge(base: &ApiProduct, payload: &ApiProductPayload) -> ApiProduct {
    let mut value = serde_json::to_value(base).unwrap();
    let patch = serde_json::to_value(payload).unwrap();
    if let (Some(target), Some(source)) = (value.as_object_mut(), patch.as_object()) {
        for (key, field) in source {
            target.insert(key.clone(), field.clone());
        }
    }
    serde_json::from_value(value).unwrap()
}

#[async_trait]
impl InventoryGateway for MockGateway {
    async fn list_products(&self, _session: &SessionContext) -> InventoryResult<Vec<ApiProduct>> {
        self.begin(None)?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_product(
        &self,
        _session: &SessionContext,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct> {
        self.begin(Some(payload))?;
        let mut created = merge(&ApiProduct::default(), payload);
        created.id = uuid::Uuid::new_v4().to_string();
        created.created_at = Some(chrono::Utc::now());
        self.products.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        _session: &SessionContext,
        id: &str,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct> {
        self.begin(Some(payload))?;
        let mut products = self.products.lock().unwrap();
        let existing = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| InventoryError::from_status(404, "Product not found", None))?;
        *existing = merge(existing, payload);
        Ok(existing.clone())
    }

    async fn delete_product(&self, _session: &SessionContext, id: &str) -> InventoryResult<()> {
        let gate = self.delete_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.begin(None)?;
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn dashboard(&self, _session: &SessionContext) -> InventoryResult<serde_json::Value> {
        self.begin(None)?;
        Ok(serde_json::json!({ "totalProducts": self.products.lock().unwrap().len() }))
    }
}

/// Sink that keeps every toast
#[derive(Default)]
pub struct RecordingSink {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingSink {
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, toast: &Toast) {
        self.toasts.lock().unwrap().push(toast.clone());
    }
}

pub fn api_product(id: &str, code: &str, stock: i64, min_stock: i64) -> ApiProduct {
    ApiProduct {
        id: id.into(),
        code: code.into(),
        name: format!("{} part", code),
        current_stock: Some(stock),
        minimum_stock: Some(min_stock),
        cost: Some(Decimal::from(8)),
        price: Some(Decimal::from(12)),
        status: Some("active".into()),
        ..Default::default()
    }
}

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub sink: Arc<RecordingSink>,
    pub channel: ChangeChannel,
    pub store: InventoryStore,
}

pub fn harness(products: Vec<ApiProduct>) -> Harness {
    harness_with_session(products, SessionContext::new("test-token", None))
}

pub fn harness_with_session(products: Vec<ApiProduct>, session: SessionContext) -> Harness {
    let gateway = MockGateway::with_products(products);
    let sink = Arc::new(RecordingSink::default());
    let channel = ChangeChannel::new();
    let store = InventoryStore::new(gateway.clone(), channel.clone(), sink.clone(), session);
    Harness {
        gateway,
        sink,
        channel,
        store,
    }
}

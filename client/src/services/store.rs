//! Inventory store: the single owner of the product collection
//!
//! Mutations go through the remote gateway and only land locally once the
//! server returns the canonical record. Deletes are optimistic and roll back
//! to the original position on failure. Every change to the collection,
//! including an optimistic removal and its rollback, recomputes the analytics
//! snapshot in the same critical section. Successful changes publish an
//! `inventory:changed` event.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use shared::analytics::aggregate;
use shared::pipeline::{self, ProductFilter, SortSpec};
use shared::validation::{is_below_cost, validate_product_input};
use shared::{AnalyticsSnapshot, Product, ProductInput, ProductPatch};

use crate::error::{InventoryError, InventoryResult};
use crate::events::{ChangeChannel, ChangeEvent, ChangeKind, INVENTORY_CHANGED};
use crate::external::{ApiProductPayload, InventoryGateway};
use crate::services::notification::{NotificationSink, Toast};
use crate::session::{is_session_expired, SessionContext};

struct StoreState {
    products: Vec<Product>,
    analytics: AnalyticsSnapshot,
}

impl StoreState {
    fn recompute(&mut self) {
        self.analytics = aggregate(&self.products, Utc::now().date_naive());
    }
}

/// Inventory store
pub struct InventoryStore {
    gateway: Arc<dyn InventoryGateway>,
    channel: ChangeChannel,
    notifier: Arc<dyn NotificationSink>,
    session: RwLock<SessionContext>,
    state: RwLock<StoreState>,
}

impl InventoryStore {
    pub fn new(
        gateway: Arc<dyn InventoryGateway>,
        channel: ChangeChannel,
        notifier: Arc<dyn NotificationSink>,
        session: SessionContext,
    ) -> Self {
        Self {
            gateway,
            channel,
            notifier,
            session: RwLock::new(session),
            state: RwLock::new(StoreState {
                products: Vec::new(),
                analytics: AnalyticsSnapshot::empty(),
            }),
        }
    }

    /// Swap in a refreshed session token
    pub fn set_session(&self, session: SessionContext) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    pub fn channel(&self) -> &ChangeChannel {
        &self.channel
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current session, or `SessionExpired` without touching the network
    fn active_session(&self) -> InventoryResult<SessionContext> {
        let session = self
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if is_session_expired(&session, Utc::now()) {
            return Err(InventoryError::SessionExpired);
        }
        Ok(session)
    }

    fn report<T>(&self, operation: &str, err: InventoryError) -> InventoryResult<T> {
        match &err {
            InventoryError::RateLimited {
                retry_after_secs, ..
            } => {
                tracing::warn!(operation, retry_after = ?retry_after_secs, "Inventory API rate limited")
            }
            InventoryError::Unknown { status, message } => {
                tracing::error!(operation, status = ?status, error = %message, "Unexpected inventory API failure")
            }
            other => tracing::warn!(operation, kind = %other.kind(), error = %other, "Inventory operation failed"),
        }
        self.notifier.notify(&Toast::from_error(&err));
        Err(err)
    }

    fn publish(&self, kind: ChangeKind, product_id: Option<String>, product_count: usize) {
        let event = ChangeEvent {
            kind,
            product_id,
            product_count,
            timestamp: Utc::now(),
        };
        self.channel.publish(INVENTORY_CHANGED, &event);
    }

    /// Refresh the collection from the server, replacing local state
    pub async fn list(&self) -> InventoryResult<Vec<Product>> {
        let session = match self.active_session() {
            Ok(session) => session,
            Err(err) => return self.report("list", err),
        };

        let fetched = match self.gateway.list_products(&session).await {
            Ok(products) => products,
            Err(err) => return self.report("list", err),
        };
        let products: Vec<Product> = fetched.into_iter().map(Product::from).collect();

        let count = {
            let mut state = self.write_state();
            state.products = products.clone();
            state.recompute();
            state.products.len()
        };

        tracing::info!(count, "Loaded products");
        self.publish(ChangeKind::Loaded, None, count);
        Ok(products)
    }

    /// Validate locally, then create on the server
    pub async fn create(&self, input: ProductInput) -> InventoryResult<Product> {
        if let Err(err) = validate_product_input(&input) {
            return self.report("create", err.into());
        }
        let session = match self.active_session() {
            Ok(session) => session,
            Err(err) => return self.report("create", err),
        };

        let payload = ApiProductPayload::from(&input);
        let created = match self.gateway.create_product(&session, &payload).await {
            Ok(api) => Product::from(api),
            Err(err) => return self.report("create", err),
        };

        let count = {
            let mut state = self.write_state();
            state.products.push(created.clone());
            state.recompute();
            state.products.len()
        };

        tracing::info!(id = %created.id, code = %created.code, "Created product");
        self.notifier
            .notify(&Toast::success(format!("Product {} created", created.code)));
        self.publish(ChangeKind::Created, Some(created.id.clone()), count);
        Ok(created)
    }

    /// Update on the server, then replace the local record with the
    /// canonical one. Concurrent updates to the same id resolve to whichever
    /// response lands last.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> InventoryResult<Product> {
        let session = match self.active_session() {
            Ok(session) => session,
            Err(err) => return self.report("update", err),
        };

        if let Some(current) = self.product(id) {
            let next = patch.applied_to(&current);
            if is_below_cost(next.price, next.cost) {
                tracing::warn!(
                    id,
                    price = %next.price,
                    cost = %next.cost,
                    "Updating product with price below cost"
                );
            }
        }

        let payload = ApiProductPayload::from(&patch);
        let updated = match self.gateway.update_product(&session, id, &payload).await {
            Ok(api) => Product::from(api),
            Err(err) => return self.report("update", err),
        };

        let count = {
            let mut state = self.write_state();
            let position = state.products.iter().position(|p| p.id == updated.id);
            match position {
                Some(index) => state.products[index] = updated.clone(),
                None => state.products.push(updated.clone()),
            }
            state.recompute();
            state.products.len()
        };

        tracing::info!(id = %updated.id, "Updated product");
        self.notifier
            .notify(&Toast::success(format!("Product {} updated", updated.code)));
        self.publish(ChangeKind::Updated, Some(updated.id.clone()), count);
        Ok(updated)
    }

    /// Remove locally first, then on the server. A failed remote delete puts
    /// the product back at its original position.
    pub async fn delete(&self, id: &str) -> InventoryResult<()> {
        let session = match self.active_session() {
            Ok(session) => session,
            Err(err) => return self.report("delete", err),
        };

        let removed = {
            let mut state = self.write_state();
            let position = state.products.iter().position(|p| p.id == id);
            let removed = position.map(|index| (index, state.products.remove(index)));
            if removed.is_some() {
                state.recompute();
            }
            removed
        };
        let Some((index, product)) = removed else {
            return self.report("delete", InventoryError::NotFound(id.to_string()));
        };

        if let Err(err) = self.gateway.delete_product(&session, id).await {
            {
                let mut state = self.write_state();
                let index = index.min(state.products.len());
                state.products.insert(index, product);
                state.recompute();
            }
            tracing::warn!(id, index, "Delete failed, restored product");
            return self.report("delete", err);
        }

        let count = self.len();

        tracing::info!(id, "Deleted product");
        self.notifier
            .notify(&Toast::success(format!("Product {} deleted", product.code)));
        self.publish(ChangeKind::Deleted, Some(id.to_string()), count);
        Ok(())
    }

    /// Server-side dashboard summary
    pub async fn dashboard(&self) -> InventoryResult<serde_json::Value> {
        let session = match self.active_session() {
            Ok(session) => session,
            Err(err) => return self.report("dashboard", err),
        };
        match self.gateway.dashboard(&session).await {
            Ok(summary) => Ok(summary),
            Err(err) => self.report("dashboard", err),
        }
    }

    /// Snapshot of the collection
    pub fn products(&self) -> Vec<Product> {
        self.read_state().products.clone()
    }

    pub fn product(&self, id: &str) -> Option<Product> {
        self.read_state()
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Analytics for the current collection
    pub fn analytics(&self) -> AnalyticsSnapshot {
        self.read_state().analytics.clone()
    }

    pub fn len(&self) -> usize {
        self.read_state().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Filtered and sorted view of the current collection
    pub fn view(&self, filter: &ProductFilter, sort: Option<&SortSpec>) -> Vec<Product> {
        let snapshot = self.products();
        pipeline::apply(&snapshot, filter, sort, Utc::now().date_naive())
    }
}

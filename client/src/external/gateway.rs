//! Remote inventory gateway abstraction

use async_trait::async_trait;

use crate::error::InventoryResult;
use crate::external::wire::{ApiProduct, ApiProductPayload};
use crate::session::SessionContext;

/// Remote product catalog. Implementations speak the API's vocabulary and
/// map failures into the client error taxonomy.
#[async_trait]
pub trait InventoryGateway: Send + Sync {
    async fn list_products(&self, session: &SessionContext) -> InventoryResult<Vec<ApiProduct>>;

    async fn create_product(
        &self,
        session: &SessionContext,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct>;

    async fn update_product(
        &self,
        session: &SessionContext,
        id: &str,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct>;

    async fn delete_product(&self, session: &SessionContext, id: &str) -> InventoryResult<()>;

    /// Server-side dashboard summary, passed through as-is
    async fn dashboard(&self, session: &SessionContext) -> InventoryResult<serde_json::Value>;
}

//! reqwest-backed inventory gateway

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;

use crate::error::{InventoryError, InventoryResult};
use crate::external::gateway::InventoryGateway;
use crate::external::wire::{parse_envelope, ApiProduct, ApiProductPayload};
use crate::session::SessionContext;

/// Inventory API client
#[derive(Clone)]
pub struct HttpInventoryGateway {
    client: Client,
    base_url: Url,
}

impl HttpInventoryGateway {
    /// Create a new gateway against `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> InventoryResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InventoryError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| InventoryError::Configuration(format!("Invalid base URL {}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(InventoryError::Configuration(format!("Base URL cannot carry a path: {}", raw)));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Base URL extended by `segments`, each percent-encoded as one path segment
    fn url(&self, segments: &[&str]) -> InventoryResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| InventoryError::Configuration(format!("Base URL cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T>(&self, request: RequestBuilder, session: &SessionContext) -> InventoryResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.header(AUTHORIZATION, session.bearer()).send().await?;

        let status = response.status().as_u16();
        let retry_after = retry_after_secs(&response);
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            tracing::warn!(status, retry_after = ?retry_after, "Inventory API returned an error");
        }

        parse_envelope(status, retry_after, &body)
    }
}

/// Retry-After in seconds, if sent in the delta-seconds form
fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn missing_data(operation: &str) -> InventoryError {
    InventoryError::Unknown {
        status: None,
        message: format!("Inventory API returned no data for {}", operation),
    }
}

#[async_trait]
impl InventoryGateway for HttpInventoryGateway {
    async fn list_products(&self, session: &SessionContext) -> InventoryResult<Vec<ApiProduct>> {
        tracing::debug!(base_url = %self.base_url, "Fetching products");
        let request = self.client.get(self.url(&["products"])?);
        let products: Option<Vec<ApiProduct>> = self.execute(request, session).await?;
        Ok(products.unwrap_or_default())
    }

    async fn create_product(
        &self,
        session: &SessionContext,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct> {
        let request = self.client.post(self.url(&["products"])?).json(payload);
        self.execute(request, session)
            .await?
            .ok_or_else(|| missing_data("create"))
    }

    async fn update_product(
        &self,
        session: &SessionContext,
        id: &str,
        payload: &ApiProductPayload,
    ) -> InventoryResult<ApiProduct> {
        let request = self
            .client
            .put(self.url(&["products", id])?)
            .json(payload);
        self.execute(request, session)
            .await?
            .ok_or_else(|| missing_data("update"))
    }

    async fn delete_product(&self, session: &SessionContext, id: &str) -> InventoryResult<()> {
        let request = self.client.delete(self.url(&["products", id])?);
        let _: Option<serde_json::Value> = self.execute(request, session).await?;
        Ok(())
    }

    async fn dashboard(&self, session: &SessionContext) -> InventoryResult<serde_json::Value> {
        let request = self.client.get(self.url(&["analytics", "dashboard"])?);
        let summary: Option<serde_json::Value> = self.execute(request, session).await?;
        Ok(summary.unwrap_or(serde_json::Value::Null))
    }
}

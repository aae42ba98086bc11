//! Remote inventory API payloads and field mapping
//!
//! The API speaks `currentStock` / `minimumStock` / `maximumStock`; the rest
//! of the crate only ever sees `stock` / `min_stock` / `max_stock`. All
//! translation between the two vocabularies lives here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared::{Product, ProductInput, ProductPatch, ProductStatus};

use crate::error::{InventoryError, InventoryResult};

/// Product as returned by the API
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiProduct {
    #[serde(alias = "_id")]
    pub id: String,
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
    #[serde(deserialize_with = "deserialize_loose_count")]
    pub current_stock: Option<i64>,
    #[serde(deserialize_with = "deserialize_loose_count")]
    pub minimum_stock: Option<i64>,
    #[serde(deserialize_with = "deserialize_loose_count")]
    pub maximum_stock: Option<i64>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    #[serde(deserialize_with = "deserialize_loose_date")]
    pub expiry_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub perishable: Option<bool>,
    pub requires_batch_control: Option<bool>,
    pub status: Option<String>,
    pub images: Vec<String>,
    #[serde(alias = "files")]
    pub attachments: Vec<String>,
}

/// Outgoing create/update body. Absent fields are omitted.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_amount")]
    pub cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_amount")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perishable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_batch_control: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<String>>,
}

/// Standard response envelope
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub error: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Best human-readable error text in the envelope
    pub fn error_message(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(error_text)
            .or_else(|| self.message.clone())
    }
}

/// `error` may be a bare string or an object with a `message`
fn error_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}

/// Pull an error message out of an arbitrary error body
pub fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(error_text)
        .or_else(|| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
}

/// Interpret a response. Non-2xx statuses map through the error taxonomy,
/// `success: false` on a 2xx is a remote rejection.
pub fn parse_envelope<T>(status: u16, retry_after_secs: Option<u64>, body: &str) -> InventoryResult<Option<T>>
where
    T: for<'de> Deserialize<'de>,
{
    if !(200..300).contains(&status) {
        let message = error_message_from_body(body)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        return Err(InventoryError::from_status(status, message, retry_after_secs));
    }

    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|e| InventoryError::Unknown {
        status: Some(status),
        message: format!("Failed to parse response: {}", e),
    })?;

    if envelope.success == Some(false) {
        return Err(InventoryError::RemoteRejected {
            status,
            message: envelope
                .error_message()
                .unwrap_or_else(|| "Request rejected".to_string()),
        });
    }

    Ok(envelope.data)
}

fn clamp_count(value: Option<i64>) -> u32 {
    value
        .map(|v| v.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn clamp_amount(value: Option<Decimal>) -> Decimal {
    value.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
}

fn parse_status(value: Option<&str>) -> ProductStatus {
    match value.map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "inactive" => ProductStatus::Inactive,
        Some(s) if s == "discontinued" => ProductStatus::Discontinued,
        Some(s) if matches!(s.as_str(), "out_of_stock" | "out-of-stock" | "outofstock") => {
            ProductStatus::OutOfStock
        }
        _ => ProductStatus::Active,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<ApiProduct> for Product {
    fn from(api: ApiProduct) -> Self {
        Product {
            status: parse_status(api.status.as_deref()),
            id: api.id,
            code: api.code,
            name: api.name,
            description: non_blank(api.description),
            category: non_blank(api.category),
            supplier: non_blank(api.supplier),
            location: non_blank(api.location),
            unit: non_blank(api.unit),
            barcode: non_blank(api.barcode),
            batch: non_blank(api.batch),
            serial_number: non_blank(api.serial_number),
            stock: clamp_count(api.current_stock),
            min_stock: clamp_count(api.minimum_stock),
            max_stock: api.maximum_stock.map(|v| clamp_count(Some(v))),
            cost: clamp_amount(api.cost),
            price: clamp_amount(api.price),
            expiry_date: api.expiry_date,
            created_at: api.created_at,
            updated_at: api.updated_at,
            perishable: api.perishable.unwrap_or(false),
            requires_batch_control: api.requires_batch_control.unwrap_or(false),
            images: api.images,
            attachments: api.attachments,
        }
    }
}

impl From<&Product> for ApiProduct {
    fn from(product: &Product) -> Self {
        ApiProduct {
            id: product.id.clone(),
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            supplier: product.supplier.clone(),
            location: product.location.clone(),
            unit: product.unit.clone(),
            barcode: product.barcode.clone(),
            batch: product.batch.clone(),
            serial_number: product.serial_number.clone(),
            current_stock: Some(i64::from(product.stock)),
            minimum_stock: Some(i64::from(product.min_stock)),
            maximum_stock: product.max_stock.map(i64::from),
            cost: Some(product.cost),
            price: Some(product.price),
            expiry_date: product.expiry_date,
            created_at: product.created_at,
            updated_at: product.updated_at,
            perishable: Some(product.perishable),
            requires_batch_control: Some(product.requires_batch_control),
            status: Some(product.status.as_str().to_string()),
            images: product.images.clone(),
            attachments: product.attachments.clone(),
        }
    }
}

impl From<&ProductInput> for ApiProductPayload {
    fn from(input: &ProductInput) -> Self {
        ApiProductPayload {
            code: Some(input.code.trim().to_string()),
            name: Some(input.name.trim().to_string()),
            description: input.description.clone(),
            category: input.category.clone(),
            supplier: input.supplier.clone(),
            location: input.location.clone(),
            unit: input.unit.clone(),
            barcode: input.barcode.clone(),
            batch: input.batch.clone(),
            serial_number: input.serial_number.clone(),
            current_stock: Some(input.stock.unwrap_or(0)),
            minimum_stock: Some(input.min_stock.unwrap_or(0)),
            maximum_stock: input.max_stock,
            cost: Some(input.cost.unwrap_or(Decimal::ZERO)),
            price: Some(input.price.unwrap_or(Decimal::ZERO)),
            expiry_date: input.expiry_date,
            perishable: Some(input.perishable),
            requires_batch_control: Some(input.requires_batch_control),
            status: Some(input.status.unwrap_or_default()),
            images: Some(input.images.clone()),
            attachments: Some(input.attachments.clone()),
        }
    }
}

impl From<&ProductPatch> for ApiProductPayload {
    fn from(patch: &ProductPatch) -> Self {
        ApiProductPayload {
            code: patch.code.clone(),
            name: patch.name.clone(),
            description: patch.description.clone(),
            category: patch.category.clone(),
            supplier: patch.supplier.clone(),
            location: patch.location.clone(),
            unit: patch.unit.clone(),
            barcode: patch.barcode.clone(),
            batch: patch.batch.clone(),
            serial_number: patch.serial_number.clone(),
            current_stock: patch.stock,
            minimum_stock: patch.min_stock,
            maximum_stock: patch.max_stock,
            cost: patch.cost,
            price: patch.price,
            expiry_date: patch.expiry_date,
            perishable: patch.perishable,
            requires_batch_control: patch.requires_batch_control,
            status: patch.status,
            images: patch.images.clone(),
            attachments: patch.attachments.clone(),
        }
    }
}

fn serialize_amount<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.and_then(|amount| amount.to_f64()) {
        Some(amount) => serializer.serialize_f64(amount),
        None => serializer.serialize_none(),
    }
}

/// Accept integers, floats (truncated) and numeric strings. Null and junk
/// become `None`.
fn deserialize_loose_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(loose_count))
}

fn loose_count(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|_| i64::MAX))
            .or_else(|| number.as_f64().and_then(float_count)),
        serde_json::Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(float_count))
        }
        _ => None,
    }
}

fn float_count(value: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds
    value.is_finite().then(|| value.trunc() as i64)
}

/// Accept `YYYY-MM-DD`, a full RFC 3339 timestamp, null or junk (as `None`)
fn deserialize_loose_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_loose_date))
}

fn parse_loose_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}

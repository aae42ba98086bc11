//! Remote inventory API integration

pub mod gateway;
pub mod http;
pub mod wire;

pub use gateway::InventoryGateway;
pub use http::HttpInventoryGateway;
pub use wire::{ApiEnvelope, ApiProduct, ApiProductPayload};

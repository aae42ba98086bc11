//! Inventory services: the store, report export and user notifications

pub mod export;
pub mod notification;
pub mod store;

pub use export::{serialize, ExportArtifact, ExportFormat};
pub use notification::{NotificationSink, Severity, Toast, TracingSink};
pub use store::InventoryStore;

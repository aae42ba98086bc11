//! Repair-shop inventory client
//!
//! Owns the product collection for the dashboard: talks to the remote
//! inventory API, keeps analytics current, broadcasts change events and
//! produces spreadsheet, PDF and CSV reports.

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod services;
pub mod session;

pub use config::ClientConfig;
pub use error::{ErrorKind, InventoryError, InventoryResult};
pub use events::{ChangeChannel, ChangeEvent, ChangeKind, EventChannel, Subscription, INVENTORY_CHANGED};
pub use external::{HttpInventoryGateway, InventoryGateway};
pub use services::{ExportArtifact, ExportFormat, InventoryStore, NotificationSink, Toast};
pub use session::{is_session_expired, SessionContext};

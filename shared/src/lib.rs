//! Shared inventory domain for the repair-shop dashboard
//!
//! Pure product models, stock classification, valuation analytics and the
//! filter/sort pipeline. Used by the client store and by the WASM bindings.

pub mod analytics;
pub mod classifier;
pub mod export;
pub mod models;
pub mod pipeline;
pub mod types;
pub mod validation;

pub use analytics::{aggregate, margin, AnalyticsSnapshot};
pub use classifier::{classify, classify_expiry, ExpiryStatus, StockStatus};
pub use export::{ExportRow, LabelLookup};
pub use models::*;
pub use pipeline::{ProductFilter, SortField, SortSpec};
pub use types::*;
pub use validation::*;

//! Application services over the two stores.
//!
//! - [`orders`] - Order placement and deletion (write path: database first,
//!   then best-effort cache projection)
//! - [`sync`] - One-shot rebuild of an empty cache from the database
//! - [`reports`] - Spending and best-seller aggregation over the cache

pub mod orders;
pub mod reports;
pub mod sync;

pub use orders::{OrderError, OrderService};
pub use reports::{ProductSales, ReportError, ReportService, UserSpending};
pub use sync::{SyncError, sync_orders};

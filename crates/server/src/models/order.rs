//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::{OrderId, ProductId, UserId};

/// An order as recorded in the ledger database (domain type).
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID, assigned by the database on insert.
    pub id: OrderId,
    /// User who placed the order.
    pub user_id: UserId,
    /// Sum of `unit_price * quantity` over all lines, computed at write time.
    pub total_amount: Decimal,
    /// When the order was recorded.
    pub created_at: DateTime<Utc>,
}

/// A validated, priced order line ready to be persisted.
///
/// `unit_price` is the catalog price captured when the order was placed; it
/// must remain stable even if the product's price later changes.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: f64,
    pub unit_price: Decimal,
}

/// An order as read back from the Redis projection.
///
/// Field values cross the cache boundary as text and are coerced on read;
/// absent numeric fields default to zero and a missing or malformed `items`
/// field decodes to an empty list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CachedOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub items: Vec<CachedItem>,
}

/// One line of a cached order, as stored in the projection's `items` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedItem {
    pub product_id: ProductId,
    pub quantity: f64,
    pub unit_price: Decimal,
}

/// Unvalidated order input as it arrives off the wire.
///
/// `user_id`, `product_id`, and `quantity` are kept as raw JSON values:
/// callers send them as either numbers or strings, and validation coerces
/// them with distinct errors per field.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub user_id: serde_json::Value,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

/// One unvalidated order line.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub product_id: serde_json::Value,
    #[serde(default)]
    pub quantity: serde_json::Value,
}

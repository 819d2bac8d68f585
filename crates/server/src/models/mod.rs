//! Domain types for orders.
//!
//! These types represent validated domain objects separate from database
//! row types and raw request payloads. Products never materialize as a
//! domain type here: the catalog is read only for prices and names, which
//! come back as id-keyed maps.

pub mod order;

pub use order::{CachedItem, CachedOrder, ItemRequest, Order, OrderLine, OrderRequest};

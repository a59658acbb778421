use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::OrderStatus;

mod postgres;
mod rows;

pub use postgres::PgOrderStore;
pub use rows::*;

// ============================================================================
// Storage Boundary - Parameterized Row Queries Against the Order Store
// ============================================================================
//
// The query subsystem talks to storage exclusively through this trait. It
// offers exactly the three capabilities the strategies need:
// - parameterized row queries with optional single-valued joins
// - offset/limit pagination
// - an "identifier in set" predicate for batched collection retrieval
//
// All operations are read-only. Connections are acquired and released per
// call by the implementation; nothing is held across calls.
//
// ============================================================================

/// Opaque predicate/sort descriptor. Built by callers, interpreted only by
/// the storage implementation, passed through the query core unmodified.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct OrderFilter {
    pub buyer_name: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Offset/limit window applied at the storage layer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("malformed row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            // pool exhaustion and closed pools are outages, not query bugs
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Unavailable(err.to_string())
            }
            other => StorageError::Database(other),
        }
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Root rows only, associations unresolved.
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRow>, StorageError>;

    /// One buyer by id. A separate round trip per call.
    async fn fetch_buyer(&self, buyer_id: Uuid) -> Result<BuyerRow, StorageError>;

    /// One shipment by id. A separate round trip per call.
    async fn fetch_shipment(&self, shipment_id: Uuid) -> Result<ShipmentRow, StorageError>;

    /// Line items of a single order, in insertion order.
    async fn fetch_line_items(&self, order_id: Uuid) -> Result<Vec<LineItemRow>, StorageError>;

    /// Root rows with buyer and shipment merged in by a cardinality-<=-1 join.
    async fn fetch_orders_with_details(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderDetailRow>, StorageError>;

    /// Same as [`fetch_orders_with_details`](OrderStore::fetch_orders_with_details)
    /// with offset/limit applied at the storage layer.
    async fn fetch_orders_with_details_paged(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Vec<OrderDetailRow>, StorageError>;

    /// Line items of every order in `order_ids`, one in-clause query, rows in
    /// insertion order within each order.
    async fn fetch_line_items_for_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<LineItemRow>, StorageError>;

    /// The flat projection: one row per (order, line item) pair with root
    /// columns repeated, left-joined so itemless orders still appear once.
    async fn fetch_order_flat_rows(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderFlatRow>, StorageError>;
}

use uuid::Uuid;

use crate::store::StorageError;

use super::service::FetchStrategy;

// ============================================================================
// Order Query Errors
// ============================================================================
//
// Everything from storage propagates unchanged; nothing here retries or
// downgrades. Either the caller gets the full set of aggregates or the call
// fails as a whole.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderQueryError {
    /// The storage boundary failed or timed out.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Rejected before any query is issued.
    #[error("invalid use of strategy {strategy:?}: {reason}")]
    InvalidStrategyUsage {
        strategy: FetchStrategy,
        reason: String,
    },

    /// Raised by the mutation path, which shares this error channel. The
    /// read path never produces it.
    #[allow(dead_code)]
    #[error("not enough stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },

    /// A line item batch contained a parent order id that was never
    /// requested. The whole call aborts rather than misattach the row.
    #[error("line item batch returned a row for unrequested order {order_id}")]
    IntegrityViolation { order_id: Uuid },
}

// ============================================================================
// Unit Tests
// ============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::order::LineItemView;
use crate::store::OrderStore;

use super::errors::OrderQueryError;

// ============================================================================
// Collection Batch Loader
// ============================================================================
//
// Resolves the one-to-many line-item association for many roots at once.
// Instead of one query per root (the N+1 shape), it collects the distinct
// root ids and issues in-clause queries of bounded size, then groups the
// returned rows back onto their roots in insertion order.
//
// Query count is ceil(distinct_roots / max_chunk_size), independent of how
// many line items the roots carry.
//
// ============================================================================

pub struct CollectionBatchLoader {
    store: Arc<dyn OrderStore>,
    max_chunk_size: usize,
}

impl CollectionBatchLoader {
    /// `max_chunk_size` bounds the parameter list of a single in-clause
    /// query; it is clamped to at least 1.
    pub fn new(store: Arc<dyn OrderStore>, max_chunk_size: usize) -> Self {
        Self {
            store,
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// Load line-item groups for the given roots. Every requested id gets a
    /// group, empty included; a returned row whose parent id was never
    /// requested aborts the whole call.
    pub async fn load_for(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LineItemView>>, OrderQueryError> {
        let distinct = distinct_in_order(order_ids);

        let mut groups: HashMap<Uuid, Vec<LineItemView>> =
            distinct.iter().map(|id| (*id, Vec::new())).collect();

        for chunk in distinct.chunks(self.max_chunk_size) {
            let rows = self.store.fetch_line_items_for_orders(chunk).await?;
            for row in rows {
                let order_id = row.order_id;
                match groups.get_mut(&order_id) {
                    Some(group) => group.push(LineItemView::from(row)),
                    None => return Err(OrderQueryError::IntegrityViolation { order_id }),
                }
            }
        }

        tracing::debug!(
            roots = distinct.len(),
            chunk_size = self.max_chunk_size,
            "Batched line item load complete"
        );

        Ok(groups)
    }
}

/// Distinct ids in first-seen order.
fn distinct_in_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().filter(|id| seen.insert(**id)).copied().collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

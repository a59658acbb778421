use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::order::{LineItemView, OrderAggregate};
use crate::store::OrderFlatRow;

// ============================================================================
// Flat Projection Reconstructor
// ============================================================================
//
// The flat strategy issues a single query joining Order through LineItem
// through Product, so every root column arrives duplicated once per line
// item. This pass regroups the rows into nested aggregates.
//
// Grouping is keyed on the root id alone. Output order is the order each
// root id was first encountered; line-item order within a root is row order.
// Rows without an item part only establish an (empty) group.
//
// The duplicated-root transfer cost is inherent to the strategy and there is
// no pagination option: limiting flat rows does not limit distinct roots.
//
// ============================================================================

pub fn reconstruct(rows: Vec<OrderFlatRow>) -> Vec<OrderAggregate> {
    // insertion-ordered keying: the map groups, the vec remembers key order
    let mut first_seen: Vec<Uuid> = Vec::new();
    let mut by_id: HashMap<Uuid, OrderAggregate> = HashMap::new();

    for row in rows {
        let OrderFlatRow {
            id,
            buyer_name,
            order_date,
            status,
            shipping_address,
            item,
        } = row;

        if !by_id.contains_key(&id) {
            first_seen.push(id);
            by_id.insert(
                id,
                OrderAggregate {
                    id,
                    buyer_name,
                    order_date,
                    status,
                    shipping_address,
                    line_items: Vec::new(),
                },
            );
        }

        if let Some(item) = item {
            if let Some(aggregate) = by_id.get_mut(&id) {
                aggregate.line_items.push(LineItemView {
                    product_name: item.product_name,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                });
            }
        }
    }

    first_seen
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Address, OrderStatus};

// ============================================================================
// Order Aggregate - Fully Populated Read Model
// ============================================================================
//
// The output shape shared by every loading strategy. Internal storage ids of
// Buyer, Shipment and Product are never exposed; consumers only see the
// denormalized fields they need.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderAggregate {
    pub id: Uuid,
    pub buyer_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_address: Address,
    /// Insertion order of the order's line items, preserved end-to-end.
    pub line_items: Vec<LineItemView>,
}

/// One line of an order: the product name, the unit price snapshot taken at
/// order time (decoupled from the product's current price), and the quantity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItemView {
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl OrderAggregate {
    /// Total price across all line items.
    pub fn total_price(&self) -> i64 {
        self.line_items
            .iter()
            .map(|item| item.unit_price * i64::from(item.quantity))
            .sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate_with(items: Vec<LineItemView>) -> OrderAggregate {
        OrderAggregate {
            id: Uuid::new_v4(),
            buyer_name: "userA".to_string(),
            order_date: Utc::now(),
            status: OrderStatus::Placed,
            shipping_address: Address::new("Seoul", "1", "12345"),
            line_items: items,
        }
    }

    #[test]
    fn test_total_price_sums_price_times_quantity() {
        let aggregate = aggregate_with(vec![
            LineItemView {
                product_name: "BookX".to_string(),
                unit_price: 10_000,
                quantity: 1,
            },
            LineItemView {
                product_name: "BookY".to_string(),
                unit_price: 20_000,
                quantity: 2,
            },
        ]);

        assert_eq!(aggregate.total_price(), 50_000);
    }

    #[test]
    fn test_total_price_of_empty_order_is_zero() {
        assert_eq!(aggregate_with(vec![]).total_price(), 0);
    }

    #[test]
    fn test_aggregate_serializes_without_internal_ids() {
        let aggregate = aggregate_with(vec![LineItemView {
            product_name: "BookZ".to_string(),
            unit_price: 30_000,
            quantity: 3,
        }]);

        let json = serde_json::to_value(&aggregate).unwrap();
        assert!(json.get("buyer_id").is_none());
        assert!(json.get("shipment_id").is_none());
        assert!(json["line_items"][0].get("product_id").is_none());
        assert_eq!(json["line_items"][0]["product_name"], "BookZ");
    }
}

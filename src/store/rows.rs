use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{Address, LineItemView, OrderAggregate, OrderStatus, ShipmentStatus};

// ============================================================================
// Storage Row Types
// ============================================================================
//
// Typed projections returned by the storage boundary. Single-valued
// associations (buyer, shipment) may be merged into a root row without row
// duplication; the multi-valued line-item association is always delivered as
// separate rows carrying their parent order id.
//
// ============================================================================

/// A root row with its single-valued associations unresolved.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub shipment_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BuyerRow {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShipmentRow {
    pub id: Uuid,
    pub address: Address,
    pub status: ShipmentStatus,
}

/// A root row with buyer and shipment already merged in. The joined side has
/// cardinality <= 1, so one order stays one row.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderDetailRow {
    pub id: Uuid,
    pub buyer_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_address: Address,
}

impl OrderDetailRow {
    pub fn into_aggregate(self, line_items: Vec<LineItemView>) -> OrderAggregate {
        OrderAggregate {
            id: self.id,
            buyer_name: self.buyer_name,
            order_date: self.order_date,
            status: self.status,
            shipping_address: self.shipping_address,
            line_items,
        }
    }
}

/// A line item row with its product already resolved, carrying the parent
/// order id it must be grouped back onto.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LineItemRow {
    pub order_id: Uuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

impl From<LineItemRow> for LineItemView {
    fn from(row: LineItemRow) -> Self {
        LineItemView {
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

/// One denormalized row per (order, line item) pair, root columns repeated on
/// every row. Orders without line items still produce one row with an empty
/// item part (the flat query joins the collection side with a left join).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderFlatRow {
    pub id: Uuid,
    pub buyer_name: String,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub item: Option<FlatItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FlatItem {
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

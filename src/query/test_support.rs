use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::order::{Address, OrderStatus, ShipmentStatus};
use crate::store::{
    BuyerRow, FlatItem, LineItemRow, OrderDetailRow, OrderFilter, OrderFlatRow, OrderRow,
    OrderStore, Page, ShipmentRow, StorageError,
};

// ============================================================================
// In-Memory Order Store for Unit Tests
// ============================================================================
//
// Serves fixtures from plain collections and records every issued query so
// tests can assert on query counts and on calls that must never reach
// storage at all.
//
// ============================================================================

pub(crate) struct FakeOrderStore {
    orders: Vec<OrderRow>,
    buyers: HashMap<Uuid, BuyerRow>,
    shipments: HashMap<Uuid, ShipmentRow>,
    line_items: Vec<LineItemRow>,
    queries: Mutex<Vec<&'static str>>,
    /// When true every storage call fails, simulating an outage.
    pub fail: bool,
    /// Appended to every batch result, simulating a storage/query mismatch.
    pub rogue_batch_row: Option<LineItemRow>,
}

impl FakeOrderStore {
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            buyers: HashMap::new(),
            shipments: HashMap::new(),
            line_items: Vec::new(),
            queries: Mutex::new(Vec::new()),
            fail: false,
            rogue_batch_row: None,
        }
    }

    /// Add an order with one line item per `(product_name, unit_price, quantity)`
    /// entry, in the given order. Returns the new order id.
    pub fn add_order(
        &mut self,
        buyer_name: &str,
        city: &str,
        items: &[(&str, i64, i32)],
    ) -> Uuid {
        let order_id = Uuid::new_v4();
        let buyer_id = Uuid::new_v4();
        let shipment_id = Uuid::new_v4();
        let address = Address::new(city, "1", "12345");

        self.buyers.insert(
            buyer_id,
            BuyerRow {
                id: buyer_id,
                name: buyer_name.to_string(),
                address: address.clone(),
            },
        );
        self.shipments.insert(
            shipment_id,
            ShipmentRow {
                id: shipment_id,
                address,
                status: ShipmentStatus::Ready,
            },
        );
        self.orders.push(OrderRow {
            id: order_id,
            buyer_id,
            shipment_id,
            order_date: Utc::now(),
            status: OrderStatus::Placed,
        });

        for (product_name, unit_price, quantity) in items {
            self.line_items.push(LineItemRow {
                order_id,
                product_name: product_name.to_string(),
                unit_price: *unit_price,
                quantity: *quantity,
            });
        }

        order_id
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<&'static str> {
        self.queries.lock().unwrap().clone()
    }

    pub fn count_of(&self, label: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|q| ***q == *label)
            .count()
    }

    fn record(&self, label: &'static str) -> Result<(), StorageError> {
        self.queries.lock().unwrap().push(label);
        if self.fail {
            return Err(StorageError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }

    fn matches(&self, order: &OrderRow, filter: &OrderFilter) -> bool {
        if let Some(status) = filter.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(name) = &filter.buyer_name {
            let buyer = self.buyers.get(&order.buyer_id);
            if buyer.map(|b| b.name.as_str()) != Some(name.as_str()) {
                return false;
            }
        }
        true
    }

    fn detail_rows(&self, filter: &OrderFilter) -> Vec<OrderDetailRow> {
        self.orders
            .iter()
            .filter(|order| self.matches(order, filter))
            .map(|order| OrderDetailRow {
                id: order.id,
                buyer_name: self.buyers[&order.buyer_id].name.clone(),
                order_date: order.order_date,
                status: order.status,
                shipping_address: self.shipments[&order.shipment_id].address.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for FakeOrderStore {
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRow>, StorageError> {
        self.record("fetch_orders")?;
        Ok(self
            .orders
            .iter()
            .filter(|order| self.matches(order, filter))
            .cloned()
            .collect())
    }

    async fn fetch_buyer(&self, buyer_id: Uuid) -> Result<BuyerRow, StorageError> {
        self.record("fetch_buyer")?;
        self.buyers
            .get(&buyer_id)
            .cloned()
            .ok_or_else(|| StorageError::Unavailable(format!("no buyer fixture {buyer_id}")))
    }

    async fn fetch_shipment(&self, shipment_id: Uuid) -> Result<ShipmentRow, StorageError> {
        self.record("fetch_shipment")?;
        self.shipments
            .get(&shipment_id)
            .cloned()
            .ok_or_else(|| StorageError::Unavailable(format!("no shipment fixture {shipment_id}")))
    }

    async fn fetch_line_items(&self, order_id: Uuid) -> Result<Vec<LineItemRow>, StorageError> {
        self.record("fetch_line_items")?;
        Ok(self
            .line_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn fetch_orders_with_details(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderDetailRow>, StorageError> {
        self.record("fetch_orders_with_details")?;
        Ok(self.detail_rows(filter))
    }

    async fn fetch_orders_with_details_paged(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Vec<OrderDetailRow>, StorageError> {
        self.record("fetch_orders_with_details_paged")?;
        Ok(self
            .detail_rows(filter)
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn fetch_line_items_for_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<LineItemRow>, StorageError> {
        self.record("fetch_line_items_for_orders")?;
        let mut rows: Vec<LineItemRow> = self
            .line_items
            .iter()
            .filter(|item| order_ids.contains(&item.order_id))
            .cloned()
            .collect();
        if let Some(rogue) = &self.rogue_batch_row {
            rows.push(rogue.clone());
        }
        Ok(rows)
    }

    async fn fetch_order_flat_rows(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderFlatRow>, StorageError> {
        self.record("fetch_order_flat_rows")?;
        let mut rows = Vec::new();
        for detail in self.detail_rows(filter) {
            let items: Vec<&LineItemRow> = self
                .line_items
                .iter()
                .filter(|item| item.order_id == detail.id)
                .collect();
            if items.is_empty() {
                rows.push(OrderFlatRow {
                    id: detail.id,
                    buyer_name: detail.buyer_name.clone(),
                    order_date: detail.order_date,
                    status: detail.status,
                    shipping_address: detail.shipping_address.clone(),
                    item: None,
                });
                continue;
            }
            for item in items {
                rows.push(OrderFlatRow {
                    id: detail.id,
                    buyer_name: detail.buyer_name.clone(),
                    order_date: detail.order_date,
                    status: detail.status,
                    shipping_address: detail.shipping_address.clone(),
                    item: Some(FlatItem {
                        product_name: item.product_name.clone(),
                        unit_price: item.unit_price,
                        quantity: item.quantity,
                    }),
                });
            }
        }
        Ok(rows)
    }
}

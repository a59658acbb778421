use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::order::{Address, OrderStatus, ShipmentStatus};

use super::{
    BuyerRow, FlatItem, LineItemRow, OrderDetailRow, OrderFilter, OrderFlatRow, OrderRow,
    OrderStore, Page, ShipmentRow, StorageError,
};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Concrete storage boundary over a sqlx connection pool. Each call checks a
// connection out of the pool for the duration of one query and returns it on
// every exit path, success or failure. Statuses are stored as text and parsed
// back on read; a value the domain does not know is a decode error, never a
// silently dropped row.
//
// ============================================================================

pub struct PgOrderStore {
    pool: PgPool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS buyers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        city TEXT NOT NULL,
        street TEXT NOT NULL,
        zipcode TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        price BIGINT NOT NULL,
        stock_quantity INT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS shipments (
        id UUID PRIMARY KEY,
        city TEXT NOT NULL,
        street TEXT NOT NULL,
        zipcode TEXT NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        buyer_id UUID NOT NULL REFERENCES buyers(id),
        shipment_id UUID NOT NULL REFERENCES shipments(id),
        order_date TIMESTAMPTZ NOT NULL,
        status TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS line_items (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders(id),
        product_id UUID NOT NULL REFERENCES products(id),
        unit_price BIGINT NOT NULL,
        quantity INT NOT NULL,
        seq BIGSERIAL
    )",
    "CREATE INDEX IF NOT EXISTS line_items_order_idx ON line_items (order_id, seq)",
];

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the order schema if it does not exist yet.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Order schema ready");
        Ok(())
    }

    pub async fn has_orders(&self) -> Result<bool, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn insert_buyer(&self, name: &str, address: &Address) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO buyers (id, name, city, street, zipcode) VALUES ($1, $2, $3, $4, $5)")
            .bind(id)
            .bind(name)
            .bind(&address.city)
            .bind(&address.street)
            .bind(&address.zipcode)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn insert_product(
        &self,
        name: &str,
        price: i64,
        stock_quantity: i32,
    ) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO products (id, name, price, stock_quantity) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(name)
            .bind(price)
            .bind(stock_quantity)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    /// Insert an order with its shipment and line items in one transaction.
    /// The order owns both; either everything is persisted or nothing is.
    pub async fn insert_order(
        &self,
        buyer_id: Uuid,
        ship_to: &Address,
        items: &[(Uuid, i64, i32)],
    ) -> Result<Uuid, StorageError> {
        let order_id = Uuid::new_v4();
        let shipment_id = Uuid::new_v4();
        let order_date = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO shipments (id, city, street, zipcode, status) VALUES ($1, $2, $3, $4, $5)")
            .bind(shipment_id)
            .bind(&ship_to.city)
            .bind(&ship_to.street)
            .bind(&ship_to.zipcode)
            .bind(ShipmentStatus::Ready.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO orders (id, buyer_id, shipment_id, order_date, status) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order_id)
        .bind(buyer_id)
        .bind(shipment_id)
        .bind(order_date)
        .bind(OrderStatus::Placed.as_str())
        .execute(&mut *tx)
        .await?;

        // seq is assigned by the store; insertion order here is line-item order
        for (product_id, unit_price, quantity) in items {
            sqlx::query(
                "INSERT INTO line_items (id, order_id, product_id, unit_price, quantity) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(product_id)
            .bind(unit_price)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(order_id = %order_id, item_count = items.len(), "✅ Order persisted");
        Ok(order_id)
    }
}

/// Append the filter's predicates to a query whose FROM clause aliases
/// orders as `o` and buyers as `b`.
fn apply_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    if filter.buyer_name.is_none() && filter.status.is_none() {
        return;
    }
    qb.push(" WHERE ");
    if let Some(name) = &filter.buyer_name {
        qb.push("b.name = ").push_bind(name.clone());
        if filter.status.is_some() {
            qb.push(" AND ");
        }
    }
    if let Some(status) = filter.status {
        qb.push("o.status = ").push_bind(status.as_str());
    }
}

fn parse_order_status(s: &str) -> Result<OrderStatus, StorageError> {
    OrderStatus::parse(s).ok_or_else(|| StorageError::Decode(format!("unknown order status: {s}")))
}

fn parse_shipment_status(s: &str) -> Result<ShipmentStatus, StorageError> {
    ShipmentStatus::parse(s)
        .ok_or_else(|| StorageError::Decode(format!("unknown shipment status: {s}")))
}

type DetailTuple = (Uuid, String, DateTime<Utc>, String, String, String, String);

fn detail_row_from(tuple: DetailTuple) -> Result<OrderDetailRow, StorageError> {
    let (id, buyer_name, order_date, status, city, street, zipcode) = tuple;
    Ok(OrderDetailRow {
        id,
        buyer_name,
        order_date,
        status: parse_order_status(&status)?,
        shipping_address: Address { city, street, zipcode },
    })
}

const DETAIL_SELECT: &str = "SELECT o.id, b.name, o.order_date, o.status, \
    s.city, s.street, s.zipcode \
    FROM orders o \
    JOIN buyers b ON b.id = o.buyer_id \
    JOIN shipments s ON s.id = o.shipment_id";

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn fetch_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderRow>, StorageError> {
        // buyers are joined for the predicate only; the projection stays root-level
        let mut qb = QueryBuilder::new(
            "SELECT o.id, o.buyer_id, o.shipment_id, o.order_date, o.status \
             FROM orders o JOIN buyers b ON b.id = o.buyer_id",
        );
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY o.order_date, o.id");

        let tuples: Vec<(Uuid, Uuid, Uuid, DateTime<Utc>, String)> =
            qb.build_query_as().fetch_all(&self.pool).await?;

        tracing::debug!(count = tuples.len(), "Fetched order roots");

        tuples
            .into_iter()
            .map(|(id, buyer_id, shipment_id, order_date, status)| {
                Ok(OrderRow {
                    id,
                    buyer_id,
                    shipment_id,
                    order_date,
                    status: parse_order_status(&status)?,
                })
            })
            .collect()
    }

    async fn fetch_buyer(&self, buyer_id: Uuid) -> Result<BuyerRow, StorageError> {
        let (id, name, city, street, zipcode): (Uuid, String, String, String, String) =
            sqlx::query_as("SELECT id, name, city, street, zipcode FROM buyers WHERE id = $1")
                .bind(buyer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(BuyerRow {
            id,
            name,
            address: Address { city, street, zipcode },
        })
    }

    async fn fetch_shipment(&self, shipment_id: Uuid) -> Result<ShipmentRow, StorageError> {
        let (id, city, street, zipcode, status): (Uuid, String, String, String, String) =
            sqlx::query_as("SELECT id, city, street, zipcode, status FROM shipments WHERE id = $1")
                .bind(shipment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(ShipmentRow {
            id,
            address: Address { city, street, zipcode },
            status: parse_shipment_status(&status)?,
        })
    }

    async fn fetch_line_items(&self, order_id: Uuid) -> Result<Vec<LineItemRow>, StorageError> {
        let tuples: Vec<(Uuid, String, i64, i32)> = sqlx::query_as(
            "SELECT li.order_id, p.name, li.unit_price, li.quantity \
             FROM line_items li JOIN products p ON p.id = li.product_id \
             WHERE li.order_id = $1 ORDER BY li.seq",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tuples
            .into_iter()
            .map(|(order_id, product_name, unit_price, quantity)| LineItemRow {
                order_id,
                product_name,
                unit_price,
                quantity,
            })
            .collect())
    }

    async fn fetch_orders_with_details(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderDetailRow>, StorageError> {
        let mut qb = QueryBuilder::new(DETAIL_SELECT);
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY o.order_date, o.id");

        let tuples: Vec<DetailTuple> = qb.build_query_as().fetch_all(&self.pool).await?;
        tracing::debug!(count = tuples.len(), "Fetched order roots with details");

        tuples.into_iter().map(detail_row_from).collect()
    }

    async fn fetch_orders_with_details_paged(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Vec<OrderDetailRow>, StorageError> {
        let mut qb = QueryBuilder::new(DETAIL_SELECT);
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY o.order_date, o.id");
        qb.push(" OFFSET ").push_bind(page.offset);
        qb.push(" LIMIT ").push_bind(page.limit);

        let tuples: Vec<DetailTuple> = qb.build_query_as().fetch_all(&self.pool).await?;
        tracing::debug!(
            count = tuples.len(),
            offset = page.offset,
            limit = page.limit,
            "Fetched paged order roots with details"
        );

        tuples.into_iter().map(detail_row_from).collect()
    }

    async fn fetch_line_items_for_orders(
        &self,
        order_ids: &[Uuid],
    ) -> Result<Vec<LineItemRow>, StorageError> {
        let tuples: Vec<(Uuid, String, i64, i32)> = sqlx::query_as(
            "SELECT li.order_id, p.name, li.unit_price, li.quantity \
             FROM line_items li JOIN products p ON p.id = li.product_id \
             WHERE li.order_id = ANY($1) ORDER BY li.seq",
        )
        .bind(order_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(
            roots = order_ids.len(),
            rows = tuples.len(),
            "Batched line item fetch"
        );

        Ok(tuples
            .into_iter()
            .map(|(order_id, product_name, unit_price, quantity)| LineItemRow {
                order_id,
                product_name,
                unit_price,
                quantity,
            })
            .collect())
    }

    async fn fetch_order_flat_rows(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderFlatRow>, StorageError> {
        let mut qb = QueryBuilder::new(
            "SELECT o.id, b.name, o.order_date, o.status, \
             s.city, s.street, s.zipcode, \
             p.name, li.unit_price, li.quantity \
             FROM orders o \
             JOIN buyers b ON b.id = o.buyer_id \
             JOIN shipments s ON s.id = o.shipment_id \
             LEFT JOIN line_items li ON li.order_id = o.id \
             LEFT JOIN products p ON p.id = li.product_id",
        );
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY o.order_date, o.id, li.seq");

        type FlatTuple = (
            Uuid,
            String,
            DateTime<Utc>,
            String,
            String,
            String,
            String,
            Option<String>,
            Option<i64>,
            Option<i32>,
        );
        let tuples: Vec<FlatTuple> = qb.build_query_as().fetch_all(&self.pool).await?;
        tracing::debug!(rows = tuples.len(), "Fetched flat order projection");

        tuples
            .into_iter()
            .map(|(id, buyer_name, order_date, status, city, street, zipcode, product_name, unit_price, quantity)| {
                let item = match (product_name, unit_price, quantity) {
                    (Some(product_name), Some(unit_price), Some(quantity)) => Some(FlatItem {
                        product_name,
                        unit_price,
                        quantity,
                    }),
                    (None, None, None) => None,
                    _ => {
                        return Err(StorageError::Decode(
                            "flat row with partially null item columns".to_string(),
                        ))
                    }
                };
                Ok(OrderFlatRow {
                    id,
                    buyer_name,
                    order_date,
                    status: parse_order_status(&status)?,
                    shipping_address: Address { city, street, zipcode },
                    item,
                })
            })
            .collect()
    }
}

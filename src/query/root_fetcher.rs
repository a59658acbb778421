use std::sync::Arc;

use crate::store::{OrderDetailRow, OrderFilter, OrderStore, Page};

use super::errors::OrderQueryError;

// ============================================================================
// Root Fetcher
// ============================================================================
//
// Retrieves Order roots together with their single-valued associations
// (buyer, shipment). These join with cardinality <= 1, so they can be merged
// into the root query without duplicating rows. The one-to-many line-item
// collection is never joined here; it belongs to the batch loader.
//
// Result ordering is whatever storage returns and is preserved as-is.
//
// ============================================================================

pub struct RootFetcher {
    store: Arc<dyn OrderStore>,
}

impl RootFetcher {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Worst-case control: roots without joins, then one buyer and one
    /// shipment round trip per root. 2N+1 queries for N roots; kept only as
    /// a baseline to compare the other strategies against.
    pub async fn fetch_roots_only(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderDetailRow>, OrderQueryError> {
        let roots = self.store.fetch_orders(filter).await?;

        let mut details = Vec::with_capacity(roots.len());
        for root in roots {
            let buyer = self.store.fetch_buyer(root.buyer_id).await?;
            let shipment = self.store.fetch_shipment(root.shipment_id).await?;
            details.push(OrderDetailRow {
                id: root.id,
                buyer_name: buyer.name,
                order_date: root.order_date,
                status: root.status,
                shipping_address: shipment.address,
            });
        }

        tracing::debug!(roots = details.len(), "Resolved roots with per-root round trips");
        Ok(details)
    }

    /// Roots with buyer and shipment in one query.
    pub async fn fetch_roots_with_joins(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderDetailRow>, OrderQueryError> {
        let details = self.store.fetch_orders_with_details(filter).await?;
        Ok(details)
    }

    /// Same as [`fetch_roots_with_joins`](RootFetcher::fetch_roots_with_joins)
    /// with offset/limit applied at the storage layer. A limit on joined
    /// single-valued rows is a limit on distinct roots, which is why paging
    /// composes with the batch loader and never with a collection join.
    pub async fn fetch_roots_with_joins_paged(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Vec<OrderDetailRow>, OrderQueryError> {
        let details = self
            .store
            .fetch_orders_with_details_paged(filter, page)
            .await?;
        Ok(details)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::test_support::FakeOrderStore;

    #[tokio::test]
    async fn test_roots_only_issues_one_query_per_association_per_root() {
        let mut fake = FakeOrderStore::new();
        fake.add_order("userA", "Seoul", &[("BookX", 10_000, 1)]);
        fake.add_order("userB", "Busan", &[("BookZ", 30_000, 3)]);
        let store = Arc::new(fake);

        let fetcher = RootFetcher::new(store.clone());
        let details = fetcher.fetch_roots_only(&OrderFilter::default()).await.unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].buyer_name, "userA");
        assert_eq!(details[1].buyer_name, "userB");
        // 1 root query + (buyer + shipment) per root
        assert_eq!(store.count_of("fetch_orders"), 1);
        assert_eq!(store.count_of("fetch_buyer"), 2);
        assert_eq!(store.count_of("fetch_shipment"), 2);
    }

    #[tokio::test]
    async fn test_joined_fetch_is_a_single_query() {
        let mut fake = FakeOrderStore::new();
        fake.add_order("userA", "Seoul", &[("BookX", 10_000, 1)]);
        fake.add_order("userB", "Busan", &[]);
        let store = Arc::new(fake);

        let fetcher = RootFetcher::new(store.clone());
        let details = fetcher
            .fetch_roots_with_joins(&OrderFilter::default())
            .await
            .unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(store.query_count(), 1);
        assert_eq!(store.queries(), vec!["fetch_orders_with_details"]);
    }

    #[tokio::test]
    async fn test_paged_fetch_applies_offset_and_limit() {
        let mut fake = FakeOrderStore::new();
        for n in 0..5 {
            fake.add_order(&format!("user{n}"), "Seoul", &[]);
        }
        let store = Arc::new(fake);

        let fetcher = RootFetcher::new(store);
        let details = fetcher
            .fetch_roots_with_joins_paged(&OrderFilter::default(), Page { offset: 1, limit: 2 })
            .await
            .unwrap();

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].buyer_name, "user1");
        assert_eq!(details[1].buyer_name, "user2");
    }

    #[tokio::test]
    async fn test_filter_is_passed_through_to_storage() {
        let mut fake = FakeOrderStore::new();
        fake.add_order("userA", "Seoul", &[]);
        fake.add_order("userB", "Busan", &[]);
        let store = Arc::new(fake);

        let fetcher = RootFetcher::new(store);
        let filter = OrderFilter {
            buyer_name: Some("userB".to_string()),
            status: None,
        };
        let details = fetcher.fetch_roots_with_joins(&filter).await.unwrap();

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].buyer_name, "userB");
    }
}

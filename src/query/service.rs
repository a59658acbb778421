use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::{LineItemView, OrderAggregate};
use crate::store::{OrderDetailRow, OrderFilter, OrderStore, Page};

use super::batch_loader::CollectionBatchLoader;
use super::errors::OrderQueryError;
use super::flat;
use super::root_fetcher::RootFetcher;

// ============================================================================
// Order Query Service - Strategy Selector
// ============================================================================
//
// One entry point per loading strategy, all returning the same logical
// result: an ordered sequence of fully populated order aggregates. Callers
// pick a strategy explicitly and can swap it without changing downstream
// handling. No strategy mutates storage or retries; retry policy belongs to
// the transport layer.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Roots first, then every association with its own round trip. The N+1
    /// worst-case control.
    RootsOnly,
    /// Roots with buyer/shipment joined, line items batch-loaded.
    SingleValuedJoin,
    /// Paged roots with buyer/shipment joined, line items batch-loaded.
    /// The only strategy that accepts a page.
    PagedBatch,
    /// One denormalized query, regrouped in memory.
    FlatProjection,
}

pub struct OrderQueryService {
    store: Arc<dyn OrderStore>,
    root_fetcher: RootFetcher,
    batch_loader: CollectionBatchLoader,
}

impl OrderQueryService {
    pub fn new(store: Arc<dyn OrderStore>, max_chunk_size: usize) -> Self {
        Self {
            root_fetcher: RootFetcher::new(store.clone()),
            batch_loader: CollectionBatchLoader::new(store.clone(), max_chunk_size),
            store,
        }
    }

    /// List orders with the given strategy. `page` is accepted only by
    /// [`FetchStrategy::PagedBatch`]; anything else is rejected before any
    /// query is issued.
    pub async fn list_orders(
        &self,
        strategy: FetchStrategy,
        filter: &OrderFilter,
        page: Option<Page>,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        tracing::info!(strategy = ?strategy, "Listing orders");

        if page.is_some() && strategy != FetchStrategy::PagedBatch {
            return Err(OrderQueryError::InvalidStrategyUsage {
                strategy,
                reason: "pagination is only supported by PagedBatch".to_string(),
            });
        }

        match strategy {
            FetchStrategy::RootsOnly => self.orders_roots_only(filter).await,
            FetchStrategy::SingleValuedJoin => self.orders_with_joins(filter).await,
            FetchStrategy::PagedBatch => {
                let page = page.ok_or_else(|| OrderQueryError::InvalidStrategyUsage {
                    strategy,
                    reason: "PagedBatch requires a page".to_string(),
                })?;
                self.orders_paged(filter, page).await
            }
            FetchStrategy::FlatProjection => self.orders_flat(filter).await,
        }
    }

    /// Baseline: roots only, every association resolved per root.
    pub async fn orders_roots_only(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        let roots = self.root_fetcher.fetch_roots_only(filter).await?;

        // one line-item query per root: the N+1 shape the other strategies avoid
        let mut aggregates = Vec::with_capacity(roots.len());
        for root in roots {
            let rows = self.store.fetch_line_items(root.id).await?;
            let items = rows.into_iter().map(LineItemView::from).collect();
            aggregates.push(root.into_aggregate(items));
        }
        Ok(aggregates)
    }

    /// Single-valued joins for the roots, one batched load for the
    /// collections: 1 + ceil(N / chunk) queries total.
    pub async fn orders_with_joins(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        let roots = self.root_fetcher.fetch_roots_with_joins(filter).await?;
        self.attach_line_items(roots).await
    }

    /// Paged variant of [`orders_with_joins`](OrderQueryService::orders_with_joins).
    pub async fn orders_paged(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        validate_page(page)?;
        let roots = self
            .root_fetcher
            .fetch_roots_with_joins_paged(filter, page)
            .await?;
        self.attach_line_items(roots).await
    }

    /// One flat query, regrouped in memory. No pagination option.
    pub async fn orders_flat(
        &self,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        let rows = self.store.fetch_order_flat_rows(filter).await?;
        Ok(flat::reconstruct(rows))
    }

    async fn attach_line_items(
        &self,
        roots: Vec<OrderDetailRow>,
    ) -> Result<Vec<OrderAggregate>, OrderQueryError> {
        let ids: Vec<Uuid> = roots.iter().map(|root| root.id).collect();
        let mut groups = self.batch_loader.load_for(&ids).await?;

        Ok(roots
            .into_iter()
            .map(|root| {
                let items = groups.remove(&root.id).unwrap_or_default();
                root.into_aggregate(items)
            })
            .collect())
    }
}

fn validate_page(page: Page) -> Result<(), OrderQueryError> {
    if page.limit <= 0 {
        return Err(OrderQueryError::InvalidStrategyUsage {
            strategy: FetchStrategy::PagedBatch,
            reason: format!("limit must be positive, got {}", page.limit),
        });
    }
    if page.offset < 0 {
        return Err(OrderQueryError::InvalidStrategyUsage {
            strategy: FetchStrategy::PagedBatch,
            reason: format!("offset must not be negative, got {}", page.offset),
        });
    }
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

// ============================================================================
// Query Subsystem - Loading Strategies for the Order Aggregate
// ============================================================================
//
// The recurring problem this module solves: traversing the
// one-to-many-to-one graph (order -> buyer/shipment, order -> line items ->
// product) without issuing one query per parent row per collection, and
// without fetching a cartesian product that duplicates parents per child.
//
// - root_fetcher: roots plus their single-valued associations
// - batch_loader: the one-to-many collection, bounded in-clause batches
// - flat:         single denormalized query regrouped in memory
// - service:      one entry point per strategy
//
// ============================================================================

pub mod batch_loader;
pub mod errors;
pub mod flat;
pub mod root_fetcher;
pub mod service;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use batch_loader::CollectionBatchLoader;
pub use errors::OrderQueryError;
pub use root_fetcher::RootFetcher;
pub use service::{FetchStrategy, OrderQueryService};

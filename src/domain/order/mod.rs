// ============================================================================
// Order Domain - Read Model for the Order Aggregate
// ============================================================================
//
// This module contains the shared vocabulary of the query subsystem:
// - Value objects (Address, OrderStatus, ShipmentStatus)
// - Aggregate views (OrderAggregate, LineItemView)
//
// Associations are unidirectional: line items carry their order id, orders
// never hold back-references. Everything here is plain immutable data; all
// fetching lives in the query and store modules.
//
// ============================================================================

pub mod aggregate;
pub mod value_objects;

// Re-export for convenience
pub use aggregate::*;
pub use value_objects::*;

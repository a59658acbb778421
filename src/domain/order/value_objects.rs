use serde::{Deserialize, Serialize};

// ============================================================================
// Order Value Objects
// ============================================================================

/// Embedded address value object. No identity of its own; copied by value
/// wherever a buyer or shipment carries one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub zipcode: String,
}

impl Address {
    pub fn new(city: &str, street: &str, zipcode: &str) -> Self {
        Self {
            city: city.to_string(),
            street: street.to_string(),
            zipcode: zipcode.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

impl OrderStatus {
    /// Storage representation. The store keeps statuses as text columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLACED" => Some(OrderStatus::Placed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShipmentStatus {
    Ready,
    InProgress,
    Complete,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Ready => "READY",
            ShipmentStatus::InProgress => "IN_PROGRESS",
            ShipmentStatus::Complete => "COMPLETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(ShipmentStatus::Ready),
            "IN_PROGRESS" => Some(ShipmentStatus::InProgress),
            "COMPLETE" => Some(ShipmentStatus::Complete),
            _ => None,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

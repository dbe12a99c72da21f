//! Order status state machine.

use serde::{Deserialize, Serialize};

/// Where the session is in its order cycle.
///
/// State transitions:
/// ```text
/// Idle ──► Submitting ──┬──► Placed ──► Idle
///   ▲         ▲         │
///   │         └─retry── ▼
///   └──────dismiss──── Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// The customer is building an order.
    #[default]
    Idle,

    /// An order is in flight to the submission service.
    Submitting,

    /// The order was accepted; awaiting "place another order".
    Placed,

    /// Submission failed; the cart is intact and may be resubmitted.
    Failed,
}

impl OrderStatus {
    /// Returns true if cart lines can be changed in this state.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Idle | OrderStatus::Failed)
    }

    /// Returns true if an order can be submitted in this state.
    pub fn can_submit(&self) -> bool {
        matches!(self, OrderStatus::Idle | OrderStatus::Failed)
    }

    /// Returns true while a submission outcome is awaited.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, OrderStatus::Submitting)
    }

    /// Returns true if a new order cycle can be started from this state.
    pub fn can_start_new_order(&self) -> bool {
        matches!(self, OrderStatus::Placed | OrderStatus::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Idle => "Idle",
            OrderStatus::Submitting => "Submitting",
            OrderStatus::Placed => "Placed",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! The per-session cart and its order lifecycle.

mod events;
mod line;
mod state;
mod store;

pub use events::CartEvent;
pub use line::CartLine;
pub use state::OrderStatus;
pub use store::{CartStore, CartView, EVENT_CAPACITY};

use thiserror::Error;

use crate::catalog::MenuItemId;

/// Precondition failures on cart operations.
///
/// These indicate a caller bug or a disabled control being bypassed, not a
/// condition the customer can fix by retrying. The cart is unchanged whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Submission attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Submission attempted while another one is in flight.
    #[error("An order is already being submitted")]
    SubmissionInFlight,

    /// The operation is not valid in the current order status.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: OrderStatus,
        action: &'static str,
    },

    /// Customer name is required to submit.
    #[error("Customer name is required")]
    CustomerNameRequired,

    /// The item is not on the menu.
    #[error("Unknown menu item: {0}")]
    UnknownItem(MenuItemId),

    /// Adding the item would push a quantity or the total out of range.
    #[error("Cart total is too large")]
    TotalOverflow,

    /// A submission outcome arrived with no order in flight.
    #[error("No order submission is pending")]
    NothingPending,
}

//! Change notifications published by the cart store.

use serde::{Deserialize, Serialize};

use crate::catalog::MenuItemId;
use crate::money::Money;
use crate::table::TableId;

use super::OrderStatus;

/// Something observable changed in the cart store.
///
/// Presentation layers subscribe to these and re-read whatever they render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// One unit was added; `quantity` is the line's new quantity.
    ItemAdded {
        item_id: MenuItemId,
        quantity: u32,
        total_amount: Money,
    },

    /// One unit was removed; `quantity` is zero when the line was deleted.
    UnitRemoved {
        item_id: MenuItemId,
        quantity: u32,
        total_amount: Money,
    },

    /// A whole line was deleted.
    LineDeleted {
        item_id: MenuItemId,
        total_amount: Money,
    },

    /// All lines were removed.
    CartCleared,

    /// The session was bound to a table.
    TableBound {
        table: TableId,
        previous: Option<TableId>,
    },

    /// The order status moved.
    StatusChanged { from: OrderStatus, to: OrderStatus },

    /// The submission service accepted the order.
    OrderPlaced {
        order_ref: String,
        total_amount: Money,
    },

    /// The submission service rejected the order.
    OrderFailed { reason: String },

    /// Everything, including the table binding, was cleared.
    SessionReset,
}

impl CartEvent {
    /// Returns the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded { .. } => "ItemAdded",
            CartEvent::UnitRemoved { .. } => "UnitRemoved",
            CartEvent::LineDeleted { .. } => "LineDeleted",
            CartEvent::CartCleared => "CartCleared",
            CartEvent::TableBound { .. } => "TableBound",
            CartEvent::StatusChanged { .. } => "StatusChanged",
            CartEvent::OrderPlaced { .. } => "OrderPlaced",
            CartEvent::OrderFailed { .. } => "OrderFailed",
            CartEvent::SessionReset => "SessionReset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_names() {
        let event = CartEvent::ItemAdded {
            item_id: MenuItemId::new(1),
            quantity: 2,
            total_amount: Money::from_cents(3798),
        };
        assert_eq!(event.event_type(), "ItemAdded");
        assert_eq!(CartEvent::CartCleared.event_type(), "CartCleared");
        assert_eq!(
            CartEvent::StatusChanged {
                from: OrderStatus::Idle,
                to: OrderStatus::Submitting
            }
            .event_type(),
            "StatusChanged"
        );
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = CartEvent::TableBound {
            table: TableId::new("12"),
            previous: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "TableBound");
        assert_eq!(value["data"]["table"], "12");

        let back: CartEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }
}

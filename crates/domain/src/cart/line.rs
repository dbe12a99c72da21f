use serde::Serialize;

use crate::catalog::{MenuItem, MenuItemId};
use crate::money::Money;

/// A menu item and how many units of it are in the cart.
///
/// A line only exists while its quantity is at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    item: MenuItem,
    quantity: u32,
}

impl CartLine {
    pub(crate) fn new(item: MenuItem) -> Self {
        Self { item, quantity: 1 }
    }

    /// Returns the menu item.
    pub fn item(&self) -> &MenuItem {
        &self.item
    }

    /// Returns the item ID.
    pub fn item_id(&self) -> MenuItemId {
        self.item.id
    }

    /// Returns the quantity (always ≥ 1).
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns price × quantity.
    pub fn subtotal(&self) -> Money {
        self.item.price.multiply(self.quantity)
    }

    pub(crate) fn increment(&mut self) {
        self.quantity += 1;
    }

    /// Decrements and returns the remaining quantity. Callers delete the line
    /// instead of decrementing from one.
    pub(crate) fn decrement(&mut self) -> u32 {
        debug_assert!(self.quantity > 1);
        self.quantity -= 1;
        self.quantity
    }
}

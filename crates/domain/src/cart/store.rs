//! Cart store: the session's cart, table binding and order lifecycle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::catalog::{MenuItem, MenuItemId};
use crate::money::Money;
use crate::order::{
    CompletedOrder, CustomerInfo, OrderLine, OrderSnapshot, PaymentMethod, SubmissionAck,
    SubmissionError,
};
use crate::table::TableId;

use super::{CartError, CartEvent, CartLine, OrderStatus};

/// Buffered notifications per subscriber before the oldest are dropped.
pub const EVENT_CAPACITY: usize = 64;

/// The cart state machine for one ordering session.
///
/// Every operation is synchronous and leaves the store consistent: the total
/// is recomputed from the lines on each mutation and every change is
/// published as a [`CartEvent`]. Submission is split into
/// [`begin_submission`](Self::begin_submission), which captures the snapshot
/// and moves to `Submitting`, and [`finish_submission`](Self::finish_submission),
/// which applies the service outcome. Nothing but the status changes in
/// between.
#[derive(Debug)]
pub struct CartStore {
    /// Lines in insertion order, unique by item ID.
    lines: Vec<CartLine>,

    /// Σ price × quantity over `lines`.
    total_amount: Money,

    table: Option<TableId>,

    status: OrderStatus,

    /// Set only while `status` is `Failed`.
    last_error: Option<SubmissionError>,

    /// Last accepted order, until the next order cycle starts.
    completed_order: Option<CompletedOrder>,

    /// The snapshot in flight, set only while `status` is `Submitting`.
    pending: Option<OrderSnapshot>,

    events: broadcast::Sender<CartEvent>,
}

/// Serializable read model of the store for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<OrderLine>,
    pub total_amount: Money,
    pub total_quantity: u32,
    pub table: Option<TableId>,
    pub status: OrderStatus,
    pub last_error: Option<String>,
    pub completed_order: Option<CompletedOrder>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

// Query methods
impl CartStore {
    /// Creates an empty, unbound store in `Idle`.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            lines: Vec::new(),
            total_amount: Money::zero(),
            table: None,
            status: OrderStatus::Idle,
            last_error: None,
            completed_order: None,
            pending: None,
            events,
        }
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for an item, if present.
    pub fn line(&self, item_id: MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id() == item_id)
    }

    /// Returns how many units of an item are in the cart.
    pub fn quantity_of(&self, item_id: MenuItemId) -> u32 {
        self.line(item_id).map_or(0, CartLine::quantity)
    }

    /// Returns the cart total.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(CartLine::quantity).sum()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the bound table.
    pub fn table(&self) -> Option<&TableId> {
        self.table.as_ref()
    }

    /// Returns the order status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the last submission failure, present only in `Failed`.
    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    /// Returns the last accepted order.
    pub fn completed_order(&self) -> Option<&CompletedOrder> {
        self.completed_order.as_ref()
    }

    /// Returns the snapshot currently being submitted.
    pub fn pending_order(&self) -> Option<&OrderSnapshot> {
        self.pending.as_ref()
    }

    /// Builds a read model of the current state.
    pub fn view(&self) -> CartView {
        CartView {
            lines: self.lines.iter().map(OrderLine::from).collect(),
            total_amount: self.total_amount,
            total_quantity: self.total_quantity(),
            table: self.table.clone(),
            status: self.status,
            last_error: self.last_error.as_ref().map(ToString::to_string),
            completed_order: self.completed_order.clone(),
        }
    }
}

// Cart mutations
impl CartStore {
    /// Adds one unit of an item. Returns the line's new quantity.
    pub fn add_item(&mut self, item: &MenuItem) -> Result<u32, CartError> {
        self.ensure_modifiable("add item")?;
        self.total_amount
            .checked_add(item.price)
            .ok_or(CartError::TotalOverflow)?;

        let quantity = match self.position(item.id) {
            Some(index) => {
                let line = &mut self.lines[index];
                line.quantity()
                    .checked_add(1)
                    .ok_or(CartError::TotalOverflow)?;
                line.increment();
                line.quantity()
            }
            None => {
                self.lines.push(CartLine::new(item.clone()));
                1
            }
        };
        self.recompute_total();

        metrics::counter!("cart_items_added_total").increment(1);
        tracing::debug!(item_id = %item.id, quantity, total = %self.total_amount, "item added");
        self.publish(CartEvent::ItemAdded {
            item_id: item.id,
            quantity,
            total_amount: self.total_amount,
        });

        Ok(quantity)
    }

    /// Removes one unit of an item, deleting the line at quantity one.
    ///
    /// Returns the remaining quantity, or `None` if the item was not in the
    /// cart (nothing changes in that case).
    pub fn remove_one_unit(&mut self, item_id: MenuItemId) -> Result<Option<u32>, CartError> {
        self.ensure_modifiable("remove item")?;

        let Some(index) = self.position(item_id) else {
            return Ok(None);
        };
        let remaining = if self.lines[index].quantity() == 1 {
            self.lines.remove(index);
            0
        } else {
            self.lines[index].decrement()
        };
        self.recompute_total();

        tracing::debug!(%item_id, remaining, total = %self.total_amount, "unit removed");
        self.publish(CartEvent::UnitRemoved {
            item_id,
            quantity: remaining,
            total_amount: self.total_amount,
        });

        Ok(Some(remaining))
    }

    /// Removes an item's line regardless of quantity. Returns true if a line
    /// was removed.
    pub fn delete_line(&mut self, item_id: MenuItemId) -> Result<bool, CartError> {
        self.ensure_modifiable("delete line")?;

        let before = self.lines.len();
        self.lines.retain(|line| line.item_id() != item_id);
        self.recompute_total();

        let removed = self.lines.len() != before;
        if removed {
            tracing::debug!(%item_id, total = %self.total_amount, "line deleted");
            self.publish(CartEvent::LineDeleted {
                item_id,
                total_amount: self.total_amount,
            });
        }

        Ok(removed)
    }

    /// Removes every line. The table binding and status are untouched.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.ensure_modifiable("clear cart")?;

        self.lines.clear();
        self.recompute_total();

        tracing::debug!("cart cleared");
        self.publish(CartEvent::CartCleared);
        Ok(())
    }

    /// Binds the session to a table, replacing any earlier binding.
    ///
    /// Returns the previous table. An order already in flight keeps the table
    /// it was submitted with.
    pub fn bind_table(&mut self, table: TableId) -> Option<TableId> {
        let previous = self.table.replace(table.clone());
        match &previous {
            Some(old) if *old != table => {
                tracing::warn!(previous = %old, %table, "table binding replaced");
            }
            _ => tracing::info!(%table, "table bound"),
        }
        self.publish(CartEvent::TableBound {
            table,
            previous: previous.clone(),
        });
        previous
    }
}

// Order lifecycle
impl CartStore {
    /// Starts submitting the cart as an order.
    ///
    /// Validates the preconditions, moves to `Submitting` and returns the
    /// snapshot to hand to the submission service. The lines are left as they
    /// are until [`finish_submission`](Self::finish_submission) is called with
    /// the outcome.
    pub fn begin_submission(
        &mut self,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
        submitted_at: DateTime<Utc>,
    ) -> Result<OrderSnapshot, CartError> {
        if self.status.is_in_flight() {
            return Err(CartError::SubmissionInFlight);
        }
        if !self.status.can_submit() {
            return Err(CartError::InvalidStateTransition {
                current_state: self.status,
                action: "submit order",
            });
        }
        if self.lines.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let customer_info = customer.normalized()?;

        let snapshot = OrderSnapshot {
            lines: self.lines.iter().map(OrderLine::from).collect(),
            total_amount: self.total_amount,
            customer_info,
            payment_method,
            table: self.table.clone(),
            submitted_at,
        };
        self.pending = Some(snapshot.clone());
        self.last_error = None;

        tracing::info!(
            total = %snapshot.total_amount,
            lines = snapshot.lines.len(),
            payment_method = payment_method.as_str(),
            "order submission started"
        );
        self.transition(OrderStatus::Submitting);

        Ok(snapshot)
    }

    /// Applies the submission outcome to the in-flight order.
    ///
    /// On success the snapshot becomes the completed order, the cart is
    /// emptied and the status moves to `Placed`. On failure the error is kept
    /// in `last_error`, the status moves to `Failed` and the cart is left
    /// exactly as it was submitted.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionAck, SubmissionError>,
    ) -> Result<(), CartError> {
        let Some(order) = self.pending.take().filter(|_| self.status.is_in_flight()) else {
            return Err(CartError::NothingPending);
        };

        match outcome {
            Ok(ack) => {
                let total_amount = order.total_amount;
                let order_ref = ack.order_ref.clone();
                self.completed_order = Some(CompletedOrder { order, ack });
                self.lines.clear();
                self.recompute_total();

                tracing::info!(%order_ref, total = %total_amount, "order placed");
                self.transition(OrderStatus::Placed);
                self.publish(CartEvent::OrderPlaced {
                    order_ref,
                    total_amount,
                });
            }
            Err(error) => {
                tracing::warn!(%error, "order submission failed");
                let reason = error.reason().to_string();
                self.last_error = Some(error);
                self.transition(OrderStatus::Failed);
                self.publish(CartEvent::OrderFailed { reason });
            }
        }

        Ok(())
    }

    /// Starts a new order cycle after a placed or failed order.
    ///
    /// From `Placed` the completed order is dropped; from `Failed` the error is
    /// dismissed and the cart kept. The table binding survives both. A no-op
    /// in `Idle`.
    pub fn reset_for_new_order(&mut self) -> Result<(), CartError> {
        if self.status == OrderStatus::Idle {
            return Ok(());
        }
        if !self.status.can_start_new_order() {
            return Err(CartError::InvalidStateTransition {
                current_state: self.status,
                action: "start a new order",
            });
        }

        self.completed_order = None;
        self.last_error = None;
        self.transition(OrderStatus::Idle);
        Ok(())
    }

    /// Clears the whole session, table binding included.
    pub fn reset_session(&mut self) -> Result<(), CartError> {
        if self.status.is_in_flight() {
            return Err(CartError::InvalidStateTransition {
                current_state: self.status,
                action: "reset session",
            });
        }

        self.lines.clear();
        self.recompute_total();
        self.table = None;
        self.last_error = None;
        self.completed_order = None;
        if self.status != OrderStatus::Idle {
            self.transition(OrderStatus::Idle);
        }

        tracing::info!("session reset");
        self.publish(CartEvent::SessionReset);
        Ok(())
    }
}

// Helpers
impl CartStore {
    fn ensure_modifiable(&self, action: &'static str) -> Result<(), CartError> {
        if self.status.can_modify_items() {
            Ok(())
        } else {
            Err(CartError::InvalidStateTransition {
                current_state: self.status,
                action,
            })
        }
    }

    fn position(&self, item_id: MenuItemId) -> Option<usize> {
        self.lines.iter().position(|line| line.item_id() == item_id)
    }

    fn recompute_total(&mut self) {
        self.total_amount = self.lines.iter().map(CartLine::subtotal).sum();
    }

    fn transition(&mut self, to: OrderStatus) {
        let from = std::mem::replace(&mut self.status, to);
        tracing::debug!(%from, %to, "order status changed");
        self.publish(CartEvent::StatusChanged { from, to });
    }

    fn publish(&self, event: CartEvent) {
        // Sending only fails when nobody is subscribed.
        let _ = self.events.send(event);
    }
}

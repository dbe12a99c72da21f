//! Ordering session: one customer's cart, table binding and submissions.

use std::sync::Arc;

use chrono::Utc;
use common::SessionId;
use domain::{
    CartError, CartEvent, CartStore, CartView, Catalog, CustomerInfo, MenuItemId, OrderSnapshot,
    OrderStatus, PaymentMethod, SubmissionAck, TableId, TableResolver,
};
use tokio::sync::{Mutex, broadcast};

use crate::error::{OrderingError, Result};
use crate::services::OrderSubmissionService;

/// Drives one ordering session.
///
/// The session owns its [`CartStore`] and is the construction and teardown
/// boundary for it: create one per customer session and [`close`](Self::close)
/// it when the session ends. Cart mutations are applied under a lock one at a
/// time. Submission releases the lock while the service is working, so readers
/// observe `Submitting` and a second submission is rejected instead of queued.
pub struct OrderingSession<S>
where
    S: OrderSubmissionService,
{
    id: SessionId,
    catalog: Arc<Catalog>,
    resolver: TableResolver,
    service: S,
    store: Mutex<CartStore>,
}

impl<S> OrderingSession<S>
where
    S: OrderSubmissionService,
{
    /// Starts a new session with an empty cart.
    pub fn new(catalog: Arc<Catalog>, resolver: TableResolver, service: S) -> Self {
        let id = SessionId::new();
        tracing::info!(session = %id.short(), menu_items = catalog.len(), "ordering session started");
        Self {
            id,
            catalog,
            resolver,
            service,
            store: Mutex::new(CartStore::new()),
        }
    }

    /// Returns the session ID.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the menu.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the submission service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Subscribes to cart change notifications.
    pub async fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.store.lock().await.subscribe()
    }

    /// Returns a read model of the cart.
    pub async fn view(&self) -> CartView {
        self.store.lock().await.view()
    }

    /// Returns the order status.
    pub async fn status(&self) -> OrderStatus {
        self.store.lock().await.status()
    }

    /// Adds one unit of a menu item. Returns the line's new quantity.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn add_item(&self, item_id: MenuItemId) -> Result<u32> {
        let item = self
            .catalog
            .get(item_id)
            .ok_or(CartError::UnknownItem(item_id))?;
        Ok(self.store.lock().await.add_item(item)?)
    }

    /// Removes one unit of a menu item.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn remove_one_unit(&self, item_id: MenuItemId) -> Result<Option<u32>> {
        Ok(self.store.lock().await.remove_one_unit(item_id)?)
    }

    /// Deletes a menu item's line.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn delete_line(&self, item_id: MenuItemId) -> Result<bool> {
        Ok(self.store.lock().await.delete_line(item_id)?)
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn clear_cart(&self) -> Result<()> {
        Ok(self.store.lock().await.clear_cart()?)
    }

    /// Binds the session to a table. Returns the previous binding.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn bind_table(&self, table: TableId) -> Option<TableId> {
        self.store.lock().await.bind_table(table)
    }

    /// Resolves a scanned payload and binds the resulting table.
    ///
    /// An invalid payload leaves the current binding untouched.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn bind_table_from_payload(&self, raw: &str) -> Result<TableId> {
        match self.resolver.resolve(raw) {
            Ok(table) => {
                self.store.lock().await.bind_table(table.clone());
                Ok(table)
            }
            Err(e) => {
                metrics::counter!("table_decode_failures_total").increment(1);
                tracing::warn!(error = %e, "table code rejected");
                Err(e.into())
            }
        }
    }

    /// Submits the cart as an order and waits for the outcome.
    ///
    /// The cart moves to `Submitting` before the service is called and is only
    /// changed again once the service answers: emptied and `Placed` on
    /// success, untouched and `Failed` on failure.
    pub async fn submit_order(
        &self,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
    ) -> Result<SubmissionAck> {
        let snapshot = self.begin_order(customer, payment_method).await?;
        self.complete_order(snapshot).await
    }

    /// Moves the cart to `Submitting` and returns the order to hand over.
    ///
    /// Item mutations are refused from the moment this returns. Follow with
    /// [`complete_order`](Self::complete_order).
    #[tracing::instrument(skip(self, customer), fields(session = %self.id.short()))]
    pub async fn begin_order(
        &self,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderSnapshot> {
        let snapshot =
            self.store
                .lock()
                .await
                .begin_submission(customer, payment_method, Utc::now())?;
        metrics::counter!("orders_submitted_total").increment(1);
        Ok(snapshot)
    }

    /// Hands a begun order to the service and applies the outcome.
    ///
    /// The store lock is not held while the service works.
    #[tracing::instrument(skip(self, snapshot), fields(session = %self.id.short()))]
    pub async fn complete_order(&self, snapshot: OrderSnapshot) -> Result<SubmissionAck> {
        let started = std::time::Instant::now();

        let outcome = self.service.submit(&snapshot).await;

        metrics::histogram!("order_submission_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        self.store
            .lock()
            .await
            .finish_submission(outcome.clone())?;

        match outcome {
            Ok(ack) => {
                metrics::counter!("orders_placed_total").increment(1);
                tracing::info!(order_ref = %ack.order_ref, table = ?snapshot.table, "order placed");
                Ok(ack)
            }
            Err(e) => {
                metrics::counter!("orders_failed_total").increment(1);
                Err(OrderingError::Submission(e))
            }
        }
    }

    /// Starts a new order cycle after a placed or failed order.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn reset_for_new_order(&self) -> Result<()> {
        Ok(self.store.lock().await.reset_for_new_order()?)
    }

    /// Clears the cart, order state and table binding.
    #[tracing::instrument(skip(self), fields(session = %self.id.short()))]
    pub async fn reset_session(&self) -> Result<()> {
        Ok(self.store.lock().await.reset_session()?)
    }

    /// Ends the session, returning its final state.
    pub fn close(self) -> CartView {
        let view = self.store.into_inner().view();
        tracing::info!(
            session = %self.id.short(),
            status = %view.status,
            items_left = view.total_quantity,
            "ordering session closed"
        );
        view
    }
}

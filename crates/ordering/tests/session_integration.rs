//! Integration tests for the ordering session.
//!
//! A gated submission service holds each order until the test releases it, so
//! the `Submitting` window can be observed deterministically.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{
    CartError, CartEvent, Catalog, CustomerInfo, MenuItemId, Money, OrderSnapshot, OrderStatus,
    PaymentMethod, SubmissionAck, SubmissionError, TableId, TableResolver,
};
use ordering::{
    OrderSubmissionService, OrderingError, OrderingSession, SimulatedSubmissionService,
};
use tokio::sync::Notify;

#[derive(Clone, Default)]
struct GatedService {
    entered: Arc<Notify>,
    release: Arc<Notify>,
    fail: bool,
}

#[async_trait]
impl OrderSubmissionService for GatedService {
    async fn submit(&self, _order: &OrderSnapshot) -> Result<SubmissionAck, SubmissionError> {
        self.entered.notify_one();
        self.release.notified().await;
        if self.fail {
            Err(SubmissionError::Unavailable("kitchen offline".to_string()))
        } else {
            Ok(SubmissionAck {
                order_ref: "ORD-GATED".to_string(),
            })
        }
    }
}

fn simulated_session() -> (
    OrderingSession<SimulatedSubmissionService>,
    SimulatedSubmissionService,
) {
    let service = SimulatedSubmissionService::with_latency(Duration::ZERO);
    let session = OrderingSession::new(
        Arc::new(Catalog::demo()),
        TableResolver::default(),
        service.clone(),
    );
    (session, service)
}

fn gated_session(fail: bool) -> (Arc<OrderingSession<GatedService>>, GatedService) {
    let service = GatedService {
        fail,
        ..GatedService::default()
    };
    let session = OrderingSession::new(
        Arc::new(Catalog::demo()),
        TableResolver::default(),
        service.clone(),
    );
    (Arc::new(session), service)
}

mod scenarios {
    use super::*;

    #[tokio::test]
    async fn burger_twice_then_sandwich_then_remove_burger() {
        let (session, _) = simulated_session();

        session.add_item(MenuItemId::new(1)).await.unwrap();
        session.add_item(MenuItemId::new(1)).await.unwrap();
        let view = session.view().await;
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.total_amount, Money::from_cents(3798));

        session.clear_cart().await.unwrap();
        session.add_item(MenuItemId::new(1)).await.unwrap();
        session.add_item(MenuItemId::new(2)).await.unwrap();
        session.remove_one_unit(MenuItemId::new(1)).await.unwrap();

        let view = session.view().await;
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].item_id, MenuItemId::new(2));
        assert_eq!(view.total_amount, Money::from_cents(1599));
    }

    #[tokio::test]
    async fn demo_table_and_invalid_code() {
        let (session, _) = simulated_session();

        let result = session.bind_table_from_payload("not-json").await;
        assert!(matches!(result, Err(OrderingError::Decode(_))));
        assert!(session.view().await.table.is_none());

        let table = session.bind_table_from_payload("Demo-123").await.unwrap();
        assert_eq!(table, TableId::new("Demo-123"));
        assert_eq!(session.view().await.table, Some(table));
    }

    #[tokio::test]
    async fn fries_order_is_placed() {
        let (session, service) = simulated_session();
        session.add_item(MenuItemId::new(4)).await.unwrap();
        session.add_item(MenuItemId::new(4)).await.unwrap();

        session
            .submit_order(CustomerInfo::new("Mei"), PaymentMethod::Cash)
            .await
            .unwrap();

        let view = session.view().await;
        let completed = view.completed_order.unwrap();
        assert_eq!(completed.order.total_amount, Money::from_cents(1700));
        assert_eq!(completed.order.lines[0].quantity, 2);
        assert!(view.lines.is_empty());
        assert_eq!(view.status, OrderStatus::Placed);

        let orders = service.submitted_orders().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].1, completed.order);
    }
}

mod in_flight {
    use super::*;

    #[tokio::test]
    async fn second_submission_is_rejected_while_submitting() {
        let (session, service) = gated_session(false);
        session.add_item(MenuItemId::new(3)).await.unwrap();

        let first = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .submit_order(CustomerInfo::new("Ana"), PaymentMethod::Card)
                    .await
            })
        };
        service.entered.notified().await;

        assert_eq!(session.status().await, OrderStatus::Submitting);
        let second = session
            .submit_order(CustomerInfo::new("Ana"), PaymentMethod::Card)
            .await;
        assert_eq!(
            second,
            Err(OrderingError::Cart(CartError::SubmissionInFlight))
        );

        service.release.notify_one();
        let ack = first.await.unwrap().unwrap();
        assert_eq!(ack.order_ref, "ORD-GATED");
        assert_eq!(session.status().await, OrderStatus::Placed);
    }

    #[tokio::test]
    async fn cart_is_untouched_until_outcome_is_known() {
        let (session, service) = gated_session(false);
        session.add_item(MenuItemId::new(5)).await.unwrap();
        session.add_item(MenuItemId::new(5)).await.unwrap();

        let submit = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .submit_order(CustomerInfo::new("Ana"), PaymentMethod::GrabPay)
                    .await
            })
        };
        service.entered.notified().await;

        let during = session.view().await;
        assert_eq!(during.total_quantity, 2);
        assert_eq!(during.total_amount, Money::from_cents(2198));
        assert!(matches!(
            session.add_item(MenuItemId::new(1)).await,
            Err(OrderingError::Cart(CartError::InvalidStateTransition { .. }))
        ));

        service.release.notify_one();
        submit.await.unwrap().unwrap();
        assert!(session.view().await.lines.is_empty());
    }

    #[tokio::test]
    async fn failure_then_retry() {
        let (session, service) = gated_session(true);
        session.bind_table(TableId::new("11")).await;
        session.add_item(MenuItemId::new(1)).await.unwrap();

        let submit = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .submit_order(CustomerInfo::new("Lee"), PaymentMethod::DuitNow)
                    .await
            })
        };
        service.entered.notified().await;
        service.release.notify_one();

        let result = submit.await.unwrap();
        assert!(matches!(
            result,
            Err(OrderingError::Submission(SubmissionError::Unavailable(_)))
        ));
        let view = session.view().await;
        assert_eq!(view.status, OrderStatus::Failed);
        assert_eq!(view.total_amount, Money::from_cents(1899));
        assert_eq!(view.table, Some(TableId::new("11")));
        assert!(view.last_error.is_some());

        // Dismiss and confirm the cart is kept for another attempt.
        session.reset_for_new_order().await.unwrap();
        let view = session.view().await;
        assert_eq!(view.status, OrderStatus::Idle);
        assert!(view.last_error.is_none());
        assert_eq!(view.total_quantity, 1);
    }
}

mod notifications {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let (session, _) = simulated_session();
        let mut rx = session.subscribe().await;

        session.bind_table_from_payload(r#"{"tableNumber": 3}"#).await.unwrap();
        session.add_item(MenuItemId::new(2)).await.unwrap();
        session.delete_line(MenuItemId::new(2)).await.unwrap();

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            types.push(event.event_type());
        }
        assert_eq!(types, vec!["TableBound", "ItemAdded", "LineDeleted"]);
    }

    #[tokio::test]
    async fn session_reset_clears_table() {
        let (session, _) = simulated_session();
        let mut rx = session.subscribe().await;
        session.bind_table(TableId::new("4")).await;
        session.add_item(MenuItemId::new(1)).await.unwrap();

        session.reset_session().await.unwrap();

        let view = session.view().await;
        assert!(view.table.is_none());
        assert!(view.lines.is_empty());

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert_eq!(last, Some(CartEvent::SessionReset));
    }

    #[tokio::test]
    async fn submission_request_wire_shape() {
        let (session, service) = simulated_session();
        session.bind_table(TableId::new("Demo-123")).await;
        session.add_item(MenuItemId::new(4)).await.unwrap();

        session
            .submit_order(
                CustomerInfo::new("Mei").with_notes("extra salt"),
                PaymentMethod::TouchNGo,
            )
            .await
            .unwrap();

        let orders = service.submitted_orders().await;
        let json = serde_json::to_value(&orders[0].1).unwrap();
        assert_eq!(json["lines"][0]["name"], "French Fries");
        assert_eq!(json["lines"][0]["price"], "8.50");
        assert_eq!(json["totalAmount"], "8.50");
        assert_eq!(json["customerInfo"]["notes"], "extra salt");
        assert_eq!(json["paymentMethod"], "tng");
        assert_eq!(json["table"], "Demo-123");
    }
}

//! Order submission types: the snapshot sent to the submission service and
//! the outcome it reports back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartError, CartLine};
use crate::catalog::MenuItemId;
use crate::money::Money;
use crate::table::TableId;

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Pay at the counter.
    #[default]
    Cash,

    /// Credit or debit card.
    Card,

    /// DuitNow QR / online banking transfer.
    #[serde(rename = "duitnow")]
    DuitNow,

    /// Touch 'n Go eWallet.
    #[serde(rename = "tng")]
    TouchNGo,

    /// GrabPay eWallet.
    #[serde(rename = "grabpay")]
    GrabPay,
}

impl PaymentMethod {
    /// All methods in the order they are offered to the customer.
    pub const ALL: [PaymentMethod; 5] = [
        PaymentMethod::DuitNow,
        PaymentMethod::TouchNGo,
        PaymentMethod::GrabPay,
        PaymentMethod::Card,
        PaymentMethod::Cash,
    ];

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::DuitNow => "duitnow",
            PaymentMethod::TouchNGo => "tng",
            PaymentMethod::GrabPay => "grabpay",
        }
    }

    /// Returns the customer-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::DuitNow => "DuitNow",
            PaymentMethod::TouchNGo => "Touch 'n Go eWallet",
            PaymentMethod::GrabPay => "GrabPay",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == wanted)
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

/// Who placed the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Name called out when the order is served.
    pub name: String,

    /// Allergies or special requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CustomerInfo {
    /// Creates customer info without notes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: None,
        }
    }

    /// Adds special instructions.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trims fields and drops blank notes; the name must not be blank.
    pub(crate) fn normalized(self) -> Result<Self, CartError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(CartError::CustomerNameRequired);
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Self { name, notes })
    }
}

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: MenuItemId,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl OrderLine {
    /// Returns price × quantity.
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item().id,
            name: line.item().name.clone(),
            price: line.item().price,
            quantity: line.quantity(),
        }
    }
}

/// Immutable copy of the cart taken when an order is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub lines: Vec<OrderLine>,
    pub total_amount: Money,
    pub customer_info: CustomerInfo,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableId>,
    pub submitted_at: DateTime<Utc>,
}

impl OrderSnapshot {
    /// Returns the total number of units ordered.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

/// Acknowledgement returned by the submission service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionAck {
    /// Reference the kitchen uses for the order.
    pub order_ref: String,
}

/// A successfully placed order, kept for the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedOrder {
    pub order: OrderSnapshot,
    pub ack: SubmissionAck,
}

/// Order submission failed. The customer may retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The service refused the order.
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached.
    #[error("Order service unavailable: {0}")]
    Unavailable(String),
}

impl SubmissionError {
    /// Returns the human-readable reason.
    pub fn reason(&self) -> &str {
        match self {
            SubmissionError::Rejected(reason) | SubmissionError::Unavailable(reason) => reason,
        }
    }

    /// Every submission failure leaves the cart intact, so the customer can
    /// always try again.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert_eq!("TNG".parse::<PaymentMethod>().unwrap(), PaymentMethod::TouchNGo);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert_eq!(PaymentMethod::TouchNGo.to_string(), "Touch 'n Go eWallet");
        assert_eq!(PaymentMethod::Card.label(), "Credit/Debit Card");
    }

    #[test]
    fn test_customer_info_normalization() {
        let info = CustomerInfo::new("  Aisyah ").with_notes("   ");
        let info = info.normalized().unwrap();
        assert_eq!(info.name, "Aisyah");
        assert_eq!(info.notes, None);

        let info = CustomerInfo::new("Ben")
            .with_notes(" no peanuts ")
            .normalized()
            .unwrap();
        assert_eq!(info.notes.as_deref(), Some("no peanuts"));

        assert_eq!(
            CustomerInfo::new("   ").normalized(),
            Err(CartError::CustomerNameRequired)
        );
    }

    #[test]
    fn test_snapshot_wire_format() {
        let snapshot = OrderSnapshot {
            lines: vec![OrderLine {
                item_id: MenuItemId::new(4),
                name: "French Fries".to_string(),
                price: Money::from_cents(850),
                quantity: 2,
            }],
            total_amount: Money::from_cents(1700),
            customer_info: CustomerInfo::new("Ben"),
            payment_method: PaymentMethod::GrabPay,
            table: Some(TableId::new("12")),
            submitted_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["lines"][0]["itemId"], 4);
        assert_eq!(value["lines"][0]["price"], "8.50");
        assert_eq!(value["totalAmount"], "17.00");
        assert_eq!(value["customerInfo"]["name"], "Ben");
        assert!(value["customerInfo"].get("notes").is_none());
        assert_eq!(value["paymentMethod"], "grabpay");
        assert_eq!(value["table"], "12");
        assert!(value["submittedAt"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
        assert_eq!(snapshot.total_quantity(), 2);
        assert_eq!(snapshot.lines[0].subtotal().cents(), 1700);
    }

    #[test]
    fn test_submission_error_reason() {
        let err = SubmissionError::Rejected("Failed to place order. Please try again.".into());
        assert_eq!(err.reason(), "Failed to place order. Please try again.");
        assert_eq!(err.to_string(), "Failed to place order. Please try again.");

        let err = SubmissionError::Unavailable("timeout".into());
        assert_eq!(err.reason(), "timeout");
        assert_eq!(err.to_string(), "Order service unavailable: timeout");
        assert!(err.is_retryable());
    }
}

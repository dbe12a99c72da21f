//! Domain layer for the QR table ordering system.
//!
//! This crate provides the core ordering abstractions:
//! - Money and the read-only menu Catalog
//! - CartStore, the per-session cart state machine with its order lifecycle
//! - Order snapshots and the submission outcome types
//! - Table binding: payload resolution and scan debouncing

pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;
pub mod table;

pub use cart::{CartError, CartEvent, CartLine, CartStore, CartView, OrderStatus};
pub use catalog::{Catalog, CatalogError, MAX_ITEM_PRICE, MenuItem, MenuItemId};
pub use money::{Money, MoneyParseError};
pub use order::{
    CompletedOrder, CustomerInfo, OrderLine, OrderSnapshot, PaymentMethod, SubmissionAck,
    SubmissionError,
};
pub use table::{DEFAULT_DEMO_TABLE, DecodeError, ScanSession, TableId, TableResolver};

//! Order submission for the QR ordering system.
//!
//! This crate connects the synchronous cart state machine to the outside
//! world:
//! 1. `OrderSubmissionService` is the contract for handing an order to the
//!    kitchen, with a simulated implementation that only waits.
//! 2. `OrderingSession` owns one customer's cart store, resolves table codes
//!    and drives submission asynchronously, applying the outcome once known.

pub mod error;
pub mod services;
pub mod session;

pub use error::{OrderingError, Result};
pub use services::{OrderSubmissionService, SimulatedSubmissionService};
pub use session::OrderingSession;

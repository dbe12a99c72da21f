//! Shared identifier types for the QR ordering system.

mod types;

pub use types::{SessionId, ShortSessionId};

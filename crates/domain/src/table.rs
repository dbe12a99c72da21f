//! Table binding: turning a scanned QR payload into a table identifier.
//!
//! Table QR codes carry a small JSON object such as `{"tableNumber": "12"}`.
//! A pre-agreed demo identifier is accepted verbatim so a session can start
//! without a camera.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Identifier accepted without decoding when no QR code is available.
pub const DEFAULT_DEMO_TABLE: &str = "Demo-123";

/// Identifier of a physical table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Creates a table ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the table ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A scanned payload that is not a valid table code.
///
/// Recoverable: the customer may rescan or use the demo table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload is not a JSON object.
    #[error("Invalid QR code. Please scan a valid table QR code. ({0})")]
    Malformed(String),

    /// The payload decoded but carries no usable table number.
    #[error("Invalid QR code. Please scan a valid table QR code. (no table number)")]
    MissingTableNumber,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TablePayload {
    #[serde(default)]
    table_number: Option<Value>,
}

/// Stateless decoder from raw scan payloads to table identifiers.
#[derive(Debug, Clone)]
pub struct TableResolver {
    demo_table: TableId,
}

impl TableResolver {
    /// Creates a resolver that accepts `demo_table` as a literal.
    pub fn new(demo_table: impl Into<TableId>) -> Self {
        Self {
            demo_table: demo_table.into(),
        }
    }

    /// Returns the literal accepted without decoding.
    pub fn demo_table(&self) -> &TableId {
        &self.demo_table
    }

    /// Resolves a raw payload into a table identifier.
    pub fn resolve(&self, raw: &str) -> Result<TableId, DecodeError> {
        let raw = raw.trim();
        if raw == self.demo_table.as_str() {
            return Ok(self.demo_table.clone());
        }

        let payload: TablePayload =
            serde_json::from_str(raw).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        match payload.table_number {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(TableId::new(s.trim())),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(number) if number > 0 => Ok(TableId::new(number.to_string())),
                _ => Err(DecodeError::MissingTableNumber),
            },
            _ => Err(DecodeError::MissingTableNumber),
        }
    }
}

impl Default for TableResolver {
    fn default() -> Self {
        Self::new(DEFAULT_DEMO_TABLE)
    }
}

/// Debounces one physical scan.
///
/// A camera decoder keeps reporting the same code for every frame it sees.
/// Only the first payload delivered to a scan session is accepted; the session
/// is closed afterwards and a new one must be started to scan again.
#[derive(Debug, Default)]
pub struct ScanSession {
    accepted: bool,
    ignored: u32,
}

impl ScanSession {
    /// Starts a new scan session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a decoded payload; returns it only for the first delivery.
    pub fn offer<'a>(&mut self, raw: &'a str) -> Option<&'a str> {
        if self.accepted {
            self.ignored += 1;
            tracing::debug!(ignored = self.ignored, "duplicate scan payload ignored");
            return None;
        }
        self.accepted = true;
        Some(raw)
    }

    /// Returns true once a payload has been accepted.
    pub fn is_closed(&self) -> bool {
        self.accepted
    }

    /// Returns how many duplicate payloads were dropped.
    pub fn ignored_count(&self) -> u32 {
        self.ignored
    }
}

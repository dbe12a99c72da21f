use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a customer ordering session.
///
/// A session starts when the ordering page is opened and ends when it is
/// closed or explicitly reset. It scopes one cart and one table binding.
/// Log lines carry the [`short`](Self::short) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Starts a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the first eight hex digits.
    pub fn short(&self) -> ShortSessionId {
        let bytes = self.0.as_bytes();
        ShortSessionId([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Leading four bytes of a [`SessionId`], shown as eight hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortSessionId([u8; 4]);

impl std::fmt::Display for ShortSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

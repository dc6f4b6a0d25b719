//! Type-safe subscriber identifier.
//!
//! [`SubscriberId`] is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! subscriber identities cannot be confused with other UUIDs, and so that
//! registry removal can compare identities instead of keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for one open event stream.
///
/// Assigned when the subscription handshake completes and never reused while
/// the stream is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    /// Creates a new random `SubscriberId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(SubscriberId::new(), SubscriberId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let id = SubscriberId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 36);
        assert_eq!(s, id.as_uuid().to_string());
    }

    #[test]
    fn serializes_as_bare_uuid_string() {
        let id = SubscriberId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }
}

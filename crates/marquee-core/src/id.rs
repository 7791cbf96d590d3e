//! Entity identifiers.
//!
//! Ids are 128-bit v4 UUIDs, globally unique by construction and decoupled
//! from any display concerns. Human-facing surfaces that want a short handle
//! use [`EventId::short`] / [`UserId::short`], which truncate the rendered
//! form only — never the identity itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(Uuid);

/// Unique identifier for a user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl EventId {
    /// Generate a fresh, globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex characters, for compact human output.
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.0.as_simple().to_string();
        full[..8].to_string()
    }
}

impl UserId {
    /// Generate a fresh, globally unique id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 hex characters, for compact human output.
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.0.as_simple().to_string();
        full[..8].to_string()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventId, UserId};
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<EventId> = (0..1000).map(|_| EventId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn short_form_is_a_prefix_of_the_full_form() {
        let id = UserId::generate();
        let full = id.to_string().replace('-', "");
        assert_eq!(id.short().len(), 8);
        assert!(full.starts_with(&id.short()));
    }

    #[test]
    fn ids_roundtrip_through_json() {
        let id = EventId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        let back: EventId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }
}

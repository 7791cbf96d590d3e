use std::collections::{HashMap, HashSet};

use crate::id::{EventId, UserId};

/// Bidirectional category index: label → event ids and label → user ids.
///
/// The substrate for overlap matching. An id is listed under a label iff the
/// stored entity currently carries that label; the engine writes to this
/// index and the entity store in the same call to keep the two in step.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    events: HashMap<String, HashSet<EventId>>,
    users: HashMap<String, HashSet<UserId>>,
}

impl CategoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an event carries `label`. Returns false if it was
    /// already indexed under that label.
    pub fn index_event(&mut self, label: &str, id: EventId) -> bool {
        self.events.entry(label.to_string()).or_default().insert(id)
    }

    /// Record that a user favors `label`. Returns false if already indexed.
    pub fn index_user(&mut self, label: &str, id: UserId) -> bool {
        self.users.entry(label.to_string()).or_default().insert(id)
    }

    /// Event ids carrying `label`. Empty for unknown labels; the lookup
    /// never allocates a bucket.
    pub fn events_with<'a>(&'a self, label: &str) -> impl Iterator<Item = EventId> + 'a {
        self.events.get(label).into_iter().flatten().copied()
    }

    /// User ids favoring `label`. Empty for unknown labels.
    pub fn users_with<'a>(&'a self, label: &str) -> impl Iterator<Item = UserId> + 'a {
        self.users.get(label).into_iter().flatten().copied()
    }

    /// Every label present on at least one indexed entity.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        let mut all: Vec<&str> = self
            .events
            .keys()
            .chain(self.users.keys())
            .map(String::as_str)
            .collect();
        all.sort_unstable();
        all.dedup();
        all.into_iter()
    }
}

//! The recommendation engine.
//!
//! [`Recommender`] owns the entity store, the three indexes, and the two
//! derived pair sets. Every insertion updates the store and all relevant
//! indexes in the same call, then recomputes only the match deltas touching
//! the new entity — the match set is never rebuilt from scratch after
//! construction, and it must always remain equal to what a full recompute
//! over the store would produce.
//!
//! # Writer model
//!
//! Single-writer: mutating operations take `&mut self` and assume at most
//! one in-flight mutation. Callers that want concurrent writers wrap the
//! whole engine in one external lock; no finer-grained scheme is needed or
//! provided.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::id::{EventId, UserId};
use crate::index::{Calendar, CategoryIndex, SpatialGrid};
use crate::model::{Coord, Event, User};

/// A recommendation pair: an event and a user sharing at least one category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Match {
    pub event: EventId,
    pub user: UserId,
}

impl Match {
    #[must_use]
    pub const fn new(event: EventId, user: UserId) -> Self {
        Self { event, user }
    }
}

/// Incremental multi-index matching engine.
#[derive(Debug, Clone)]
pub struct Recommender {
    config: EngineConfig,
    events: HashMap<EventId, Event>,
    users: HashMap<UserId, User>,
    categories: CategoryIndex,
    grid: SpatialGrid,
    calendar: Calendar,
    /// Derived: present iff event and user currently share a category.
    matches: HashSet<Match>,
    /// Pairs already surfaced by [`Recommender::take_pending`].
    delivered: HashSet<Match>,
}

impl Recommender {
    /// Create an empty engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for zero-sized dimensions.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            events: HashMap::new(),
            users: HashMap::new(),
            categories: CategoryIndex::new(),
            grid: SpatialGrid::new(config.grid_size),
            calendar: Calendar::new(config.num_days),
            matches: HashSet::new(),
            delivered: HashSet::new(),
            config,
        })
    }

    /// Build an engine from an initial batch.
    ///
    /// Every entity is validated before anything is stored, so a single bad
    /// entity rejects the whole batch. The batch then flows through the same
    /// incremental insertion paths as live traffic; insertion order does not
    /// affect the resulting match set.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or [`Error::InvalidConfig`].
    pub fn with_entities(
        config: EngineConfig,
        events: Vec<Event>,
        users: Vec<User>,
    ) -> Result<Self> {
        let mut engine = Self::new(config)?;
        for event in &events {
            event.validate(&engine.config)?;
        }
        for user in &users {
            user.validate(&engine.config)?;
        }
        for event in events {
            engine.insert_event(event)?;
        }
        for user in users {
            engine.insert_user(user)?;
        }
        info!(
            events = engine.events.len(),
            users = engine.users.len(),
            matches = engine.matches.len(),
            "engine constructed"
        );
        Ok(engine)
    }

    /// Insert one event: store it, index every category, bucket it in the
    /// grid and calendar, and add a match for every user already sharing one
    /// of its categories.
    ///
    /// Each category is indexed before the cross step reads the user side,
    /// so an event and a user carrying the same label produce their pair
    /// exactly once regardless of which was inserted first.
    ///
    /// # Errors
    ///
    /// Validation errors leave the engine untouched.
    pub fn insert_event(&mut self, event: Event) -> Result<()> {
        event.validate(&self.config)?;

        let id = event.id;
        let mut fresh = 0_usize;
        for label in &event.categories {
            self.categories.index_event(label, id);
            for user in self.categories.users_with(label) {
                if self.matches.insert(Match::new(id, user)) {
                    fresh += 1;
                }
            }
        }
        self.grid.insert(event.coord, id);
        self.calendar.insert(event.day, id);
        self.events.insert(id, event);
        debug!(event = %id, new_matches = fresh, "event inserted");
        Ok(())
    }

    /// Insert one user: store it, index every favorite, and add a match for
    /// every event already carrying one of them. Users are not bucketed in
    /// the grid or calendar; their coordinate and birthday are query origins
    /// only.
    ///
    /// # Errors
    ///
    /// Validation errors leave the engine untouched.
    pub fn insert_user(&mut self, user: User) -> Result<()> {
        user.validate(&self.config)?;

        let id = user.id;
        let mut fresh = 0_usize;
        for label in &user.favorites {
            self.categories.index_user(label, id);
            for event in self.categories.events_with(label) {
                if self.matches.insert(Match::new(event, id)) {
                    fresh += 1;
                }
            }
        }
        self.users.insert(id, user);
        debug!(user = %id, new_matches = fresh, "user inserted");
        Ok(())
    }

    /// Add a category to a stored event, running the event half of the
    /// insertion update for that one label. The grid and calendar are not
    /// touched. Adding a label the event already carries is a no-op.
    ///
    /// # Errors
    ///
    /// [`Error::EventNotFound`] for unknown ids, [`Error::EmptyCategory`]
    /// for the empty label; either way the engine is untouched.
    pub fn add_category(&mut self, event_id: EventId, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if label.is_empty() {
            return Err(Error::EmptyCategory);
        }
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(Error::EventNotFound(event_id))?;
        if !event.categories.insert(label.clone()) {
            return Ok(());
        }

        self.categories.index_event(&label, event_id);
        let mut fresh = 0_usize;
        for user in self.categories.users_with(&label) {
            if self.matches.insert(Match::new(event_id, user)) {
                fresh += 1;
            }
        }
        debug!(event = %event_id, label, new_matches = fresh, "category added");
        Ok(())
    }

    /// Event ids within Chebyshev distance 1 of `origin` (3×3 block, no
    /// wrap-around at the grid edges). Read-only.
    #[must_use]
    pub fn nearby_events(&self, origin: Coord) -> Vec<EventId> {
        self.grid.nearby(origin)
    }

    /// Event ids scheduled within a `window`-day cyclic run around the
    /// user's birthday. Read-only.
    ///
    /// # Errors
    ///
    /// [`Error::UserNotFound`] for unknown ids.
    pub fn events_near_birthday(&self, user_id: UserId, window: u32) -> Result<Vec<EventId>> {
        let user = self.users.get(&user_id).ok_or(Error::UserNotFound(user_id))?;
        Ok(self.calendar.window_around(user.birthday, window))
    }

    /// Drain every match not yet delivered, marking the returned pairs as
    /// delivered in the same call.
    ///
    /// Under pure insertion this is at-most-once: a pair surfaces in exactly
    /// one drain, and a drain that finds nothing new changes nothing. The
    /// result is sorted for stable output; pair order carries no meaning.
    pub fn take_pending(&mut self) -> Vec<Match> {
        let mut pending: Vec<Match> = self
            .matches
            .difference(&self.delivered)
            .copied()
            .collect();
        pending.sort_unstable();
        self.delivered.extend(pending.iter().copied());
        if !pending.is_empty() {
            info!(count = pending.len(), "pending recommendations drained");
        }
        pending
    }

    // ------------------------------------------------------------------
    // Read-only projections
    // ------------------------------------------------------------------

    /// Look up a stored event.
    ///
    /// # Errors
    ///
    /// [`Error::EventNotFound`] for unknown ids.
    pub fn event(&self, id: EventId) -> Result<&Event> {
        self.events.get(&id).ok_or(Error::EventNotFound(id))
    }

    /// Look up a stored user.
    ///
    /// # Errors
    ///
    /// [`Error::UserNotFound`] for unknown ids.
    pub fn user(&self, id: UserId) -> Result<&User> {
        self.users.get(&id).ok_or(Error::UserNotFound(id))
    }

    /// All stored events, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    /// All stored users, in no particular order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// The current match set (delivered or not).
    #[must_use]
    pub const fn matches(&self) -> &HashSet<Match> {
        &self.matches
    }

    /// Pairs already surfaced to the dispatch collaborator.
    #[must_use]
    pub const fn delivered(&self) -> &HashSet<Match> {
        &self.delivered
    }

    /// Event ids currently indexed under `label`.
    pub fn events_in_category<'a>(&'a self, label: &str) -> impl Iterator<Item = EventId> + 'a {
        self.categories.events_with(label)
    }

    /// User ids currently indexed under `label`.
    pub fn users_with_favorite<'a>(&'a self, label: &str) -> impl Iterator<Item = UserId> + 'a {
        self.categories.users_with(label)
    }

    /// Every label present on at least one stored entity.
    pub fn category_labels(&self) -> impl Iterator<Item = &str> {
        self.categories.labels()
    }

    /// Occupied grid cells and their event ids.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coord, Vec<EventId>)> + '_ {
        self.grid.occupied_cells()
    }

    /// Scheduled calendar days and their event ids.
    pub fn scheduled_days(&self) -> impl Iterator<Item = (u32, Vec<EventId>)> + '_ {
        self.calendar.scheduled_days()
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::{Match, Recommender};
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::model::{Coord, Event, User};

    fn engine() -> Recommender {
        Recommender::new(EngineConfig::default()).expect("default config")
    }

    #[test]
    fn insertion_order_is_commutative() {
        let event = Event::new(["rock"], Coord::new(1, 1), 10);
        let user = User::new(["rock"], Coord::new(2, 2), 20);
        let expected = Match::new(event.id, user.id);

        let mut event_first = engine();
        event_first.insert_event(event.clone()).expect("insert event");
        event_first.insert_user(user.clone()).expect("insert user");

        let mut user_first = engine();
        user_first.insert_user(user).expect("insert user");
        user_first.insert_event(event).expect("insert event");

        assert_eq!(event_first.matches().len(), 1);
        assert!(event_first.matches().contains(&expected));
        assert_eq!(event_first.matches(), user_first.matches());
    }

    #[test]
    fn disjoint_categories_never_match() {
        let mut rec = engine();
        rec.insert_event(Event::new(["rap"], Coord::new(1, 1), 1))
            .expect("insert event");
        rec.insert_user(User::new(["rock", "folk"], Coord::new(2, 2), 2))
            .expect("insert user");

        assert!(rec.matches().is_empty());
        assert!(rec.take_pending().is_empty());
    }

    #[test]
    fn shared_category_counts_once_per_pair() {
        let mut rec = engine();
        let event = Event::new(["rock", "pop"], Coord::new(1, 1), 1);
        let user = User::new(["rock", "pop"], Coord::new(2, 2), 2);
        let (event_id, user_id) = (event.id, user.id);
        rec.insert_event(event).expect("insert event");
        rec.insert_user(user).expect("insert user");

        // Two shared labels still yield a single pair.
        assert_eq!(rec.matches().len(), 1);
        assert!(rec.matches().contains(&Match::new(event_id, user_id)));
    }

    #[test]
    fn delivery_is_at_most_once() {
        let mut rec = engine();
        let event = Event::new(["rock"], Coord::new(1, 1), 1);
        let user = User::new(["rock"], Coord::new(2, 2), 2);
        rec.insert_event(event).expect("insert event");
        rec.insert_user(user).expect("insert user");

        assert_eq!(rec.take_pending().len(), 1);
        assert!(rec.take_pending().is_empty());

        // A later insertion surfaces only the new pairs.
        let second = User::new(["rock"], Coord::new(3, 3), 3);
        let second_id = second.id;
        rec.insert_user(second).expect("insert user");
        let drained = rec.take_pending();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].user, second_id);
    }

    #[test]
    fn category_addition_triggers_matching() {
        let mut rec = engine();
        let event = Event::new(Vec::<String>::new(), Coord::new(1, 1), 1);
        let event_id = event.id;
        let user = User::new(["rock"], Coord::new(2, 2), 2);
        let user_id = user.id;
        rec.insert_event(event).expect("insert event");
        rec.insert_user(user).expect("insert user");
        assert!(rec.take_pending().is_empty());

        rec.add_category(event_id, "rock").expect("add category");
        assert_eq!(rec.take_pending(), vec![Match::new(event_id, user_id)]);

        // Re-adding the same label changes nothing.
        rec.add_category(event_id, "rock").expect("duplicate add");
        assert!(rec.take_pending().is_empty());
        assert_eq!(rec.event(event_id).expect("stored").categories.len(), 1);
    }

    #[test]
    fn add_category_rejects_unknown_event_and_empty_label() {
        let mut rec = engine();
        let stray = Event::new(["rock"], Coord::new(1, 1), 1);
        assert!(matches!(
            rec.add_category(stray.id, "rock"),
            Err(Error::EventNotFound(id)) if id == stray.id
        ));

        rec.insert_event(stray.clone()).expect("insert event");
        assert_eq!(rec.add_category(stray.id, ""), Err(Error::EmptyCategory));
    }

    #[test]
    fn failed_insertion_touches_nothing() {
        let mut rec = engine();
        let bad = Event::new(["rock"], Coord::new(99, 0), 1);
        assert!(rec.insert_event(bad).expect_err("must fail").is_validation());

        assert_eq!(rec.event_count(), 0);
        assert_eq!(rec.events_in_category("rock").count(), 0);
        assert_eq!(rec.occupied_cells().count(), 0);
        assert_eq!(rec.scheduled_days().count(), 0);
        assert!(rec.matches().is_empty());
    }

    #[test]
    fn batch_construction_rejects_the_whole_batch_on_one_bad_entity() {
        let good = Event::new(["rock"], Coord::new(1, 1), 1);
        let bad = Event::new(["pop"], Coord::new(1, 1), 400);
        let result = Recommender::with_entities(
            EngineConfig::default(),
            vec![good, bad],
            vec![User::new(["rock"], Coord::new(2, 2), 2)],
        );
        assert!(matches!(result, Err(Error::DayOutOfRange { day: 400, .. })));
    }

    #[test]
    fn grid_queries_respect_edges() {
        let mut rec = engine();
        let event = Event::new(["rock"], Coord::new(0, 0), 1);
        let id = event.id;
        rec.insert_event(event).expect("insert event");

        assert_eq!(rec.nearby_events(Coord::new(0, 0)), vec![id]);
        assert_eq!(rec.nearby_events(Coord::new(1, 1)), vec![id]);
        assert!(rec.nearby_events(Coord::new(9, 9)).is_empty());
    }

    #[test]
    fn birthday_window_wraps_the_year() {
        let mut rec = engine();
        let below = Event::new(["a"], Coord::new(1, 1), 363);
        let above = Event::new(["b"], Coord::new(1, 1), 2);
        let far = Event::new(["c"], Coord::new(1, 1), 100);
        let (below_id, above_id) = (below.id, above.id);
        for event in [below, above, far] {
            rec.insert_event(event).expect("insert event");
        }
        let user = User::new(["a"], Coord::new(2, 2), 0);
        let user_id = user.id;
        rec.insert_user(user).expect("insert user");

        let found = rec.events_near_birthday(user_id, 7).expect("query");
        assert_eq!(found.len(), 2);
        assert!(found.contains(&below_id));
        assert!(found.contains(&above_id));

        let ghost = User::new(["a"], Coord::new(2, 2), 0);
        assert!(matches!(
            rec.events_near_birthday(ghost.id, 7),
            Err(Error::UserNotFound(id)) if id == ghost.id
        ));
    }

    #[test]
    fn seeded_batch_end_to_end() {
        let event_a = Event::new(["rock", "pop"], Coord::new(4, 5), 360);
        let event_b = Event::new(["rap"], Coord::new(7, 7), 180);
        let user_x = User::new(["rock", "folk"], Coord::new(5, 5), 50);
        let user_y = User::new(["rock", "pop"], Coord::new(6, 6), 150);
        let user_z = User::new(Vec::<String>::new(), Coord::new(0, 0), 363);

        let (a, x, y, z) = (event_a.id, user_x.id, user_y.id, user_z.id);
        let mut rec = Recommender::with_entities(
            EngineConfig::default(),
            vec![event_a, event_b],
            vec![user_x, user_y, user_z],
        )
        .expect("batch build");

        let expected: std::collections::HashSet<Match> =
            [Match::new(a, x), Match::new(a, y)].into_iter().collect();
        assert_eq!(rec.matches(), &expected);

        // Day 360 falls within 7 days of birthday 363.
        assert_eq!(rec.events_near_birthday(z, 7).expect("query"), vec![a]);
        // Nothing within one cell of the origin.
        assert!(rec.nearby_events(Coord::new(0, 0)).is_empty());

        let drained = rec.take_pending();
        assert_eq!(drained.len(), 2);
        assert!(rec.take_pending().is_empty());
    }
}

//! Invariant oracle for the matching engine.
//!
//! The engine's match set is derived state: it must always equal what a full
//! recompute over the entity store would produce, and the three indexes must
//! agree with the store exactly. The oracle checks those invariants from the
//! outside, through the engine's read-only projections, so it can run after
//! every simulated operation.

use std::collections::{HashMap, HashSet};

use marquee_core::{Coord, Event, EventId, Match, Recommender, User, UserId};

use crate::rng::DeterministicRng;

// ── Core result types ─────────────────────────────────────────────────────────

/// Oracle result for an invariant check.
///
/// Returned by each checker and by [`MatchOracle::check_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResult {
    /// `true` iff no violations were found.
    pub passed: bool,
    /// Detailed description of every invariant that was violated.
    pub violations: Vec<InvariantViolation>,
}

impl OracleResult {
    #[must_use]
    fn pass() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    #[must_use]
    fn fail(violations: Vec<InvariantViolation>) -> Self {
        Self {
            passed: false,
            violations,
        }
    }

    #[must_use]
    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        if violations.is_empty() {
            Self::pass()
        } else {
            Self::fail(violations)
        }
    }

    /// Merge another result into this one (failures accumulate).
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if !other.passed {
            self.passed = false;
            self.violations.extend(other.violations);
        }
        self
    }
}

// ── Invariant violation diagnostics ──────────────────────────────────────────

/// Diagnostic information for a single failed invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The incremental match set diverged from a full recompute.
    ///
    /// Emitted by `check_rederivability`.
    Rederivability {
        /// Pairs a full recompute produces but the engine is missing.
        missing: Vec<Match>,
        /// Pairs the engine holds that no category overlap justifies.
        extra: Vec<Match>,
    },

    /// Re-inserting the same entities in a shuffled order produced a
    /// different match set.
    ///
    /// Emitted by `check_commutativity`.
    Commutativity {
        /// Zero-based index of the shuffled permutation that diverged.
        permutation: usize,
        /// Pairs present in the engine but absent after reordering.
        missing: Vec<Match>,
        /// Pairs present after reordering but absent from the engine.
        extra: Vec<Match>,
    },

    /// An event is absent from its own grid cell, or bucketed elsewhere.
    ///
    /// Emitted by `check_index_consistency`.
    GridPlacement {
        event: EventId,
        expected: Coord,
        /// Every cell the id was actually found in.
        found_in: Vec<Coord>,
    },

    /// A grid cell holds an id the store does not know.
    GridStray { event: EventId, cell: Coord },

    /// An event is absent from its own calendar day, or bucketed elsewhere.
    CalendarPlacement {
        event: EventId,
        expected: u32,
        /// Every day the id was actually found on.
        found_on: Vec<u32>,
    },

    /// A calendar day holds an id the store does not know.
    CalendarStray { event: EventId, day: u32 },

    /// The category index and the stored entities disagree for one label.
    CategoryDrift {
        label: String,
        missing_events: Vec<EventId>,
        extra_events: Vec<EventId>,
        missing_users: Vec<UserId>,
        extra_users: Vec<UserId>,
    },

    /// A delivered pair is not in the match set.
    ///
    /// Under pure insertion `delivered ⊆ matches` must hold.
    DeliveryLeak { pair: Match },

    /// A drain returned a pair that an earlier drain already surfaced.
    ///
    /// Emitted by the campaign's drain bookkeeping, not by `check_all`.
    Redelivery { pair: Match },
}

// ── Oracle ───────────────────────────────────────────────────────────────────

/// The oracle itself: stateless; every check reads one engine snapshot.
pub struct MatchOracle;

impl MatchOracle {
    /// Run every snapshot check. (Redelivery needs drain history and is
    /// checked by the campaign runner instead.)
    #[must_use]
    pub fn check_all(
        engine: &Recommender,
        rng: &mut DeterministicRng,
        permutations: usize,
    ) -> OracleResult {
        Self::check_rederivability(engine)
            .merge(Self::check_commutativity(engine, rng, permutations))
            .merge(Self::check_index_consistency(engine))
            .merge(Self::check_delivery(engine))
    }

    /// Recompute the match set from scratch and diff it against the
    /// incrementally maintained one.
    #[must_use]
    pub fn check_rederivability(engine: &Recommender) -> OracleResult {
        let mut expected: HashSet<Match> = HashSet::new();
        for event in engine.events() {
            for user in engine.users() {
                let overlaps = event
                    .categories
                    .intersection(&user.favorites)
                    .next()
                    .is_some();
                if overlaps {
                    expected.insert(Match::new(event.id, user.id));
                }
            }
        }

        let missing: Vec<Match> = expected.difference(engine.matches()).copied().collect();
        let extra: Vec<Match> = engine.matches().difference(&expected).copied().collect();
        if missing.is_empty() && extra.is_empty() {
            OracleResult::pass()
        } else {
            OracleResult::fail(vec![InvariantViolation::Rederivability { missing, extra }])
        }
    }

    /// Re-insert the engine's entities in shuffled orders into fresh engines
    /// and require the same final match set each time.
    #[must_use]
    pub fn check_commutativity(
        engine: &Recommender,
        rng: &mut DeterministicRng,
        permutations: usize,
    ) -> OracleResult {
        enum Entity {
            Event(Event),
            User(User),
        }

        // Sort so the shuffle input does not depend on map iteration order.
        let mut events: Vec<Event> = engine.events().cloned().collect();
        events.sort_by_key(|e| e.id);
        let mut users: Vec<User> = engine.users().cloned().collect();
        users.sort_by_key(|u| u.id);

        let mut entities: Vec<Entity> = events
            .into_iter()
            .map(Entity::Event)
            .chain(users.into_iter().map(Entity::User))
            .collect();

        let mut violations = Vec::new();
        for permutation in 0..permutations {
            rng.shuffle(&mut entities);
            let mut fresh =
                Recommender::new(*engine.config()).expect("config came from a running engine");
            for entity in &entities {
                match entity {
                    Entity::Event(event) => fresh
                        .insert_event(event.clone())
                        .expect("entity revalidates"),
                    Entity::User(user) => {
                        fresh.insert_user(user.clone()).expect("entity revalidates");
                    }
                }
            }

            let missing: Vec<Match> = engine
                .matches()
                .difference(fresh.matches())
                .copied()
                .collect();
            let extra: Vec<Match> = fresh
                .matches()
                .difference(engine.matches())
                .copied()
                .collect();
            if !missing.is_empty() || !extra.is_empty() {
                violations.push(InvariantViolation::Commutativity {
                    permutation,
                    missing,
                    extra,
                });
            }
        }
        OracleResult::from_violations(violations)
    }

    /// Every event sits in exactly one grid cell and on exactly one calendar
    /// day — its own — and the category index mirrors the stored entities
    /// label for label.
    #[must_use]
    pub fn check_index_consistency(engine: &Recommender) -> OracleResult {
        let mut violations = Vec::new();

        // Grid: id → cells it occupies.
        let mut cells_by_id: HashMap<EventId, Vec<Coord>> = HashMap::new();
        for (cell, ids) in engine.occupied_cells() {
            for id in ids {
                cells_by_id.entry(id).or_default().push(cell);
                if engine.event(id).is_err() {
                    violations.push(InvariantViolation::GridStray { event: id, cell });
                }
            }
        }
        for event in engine.events() {
            let found_in = cells_by_id.remove(&event.id).unwrap_or_default();
            if found_in != vec![event.coord] {
                violations.push(InvariantViolation::GridPlacement {
                    event: event.id,
                    expected: event.coord,
                    found_in,
                });
            }
        }

        // Calendar: id → days it is scheduled on.
        let mut days_by_id: HashMap<EventId, Vec<u32>> = HashMap::new();
        for (day, ids) in engine.scheduled_days() {
            for id in ids {
                days_by_id.entry(id).or_default().push(day);
                if engine.event(id).is_err() {
                    violations.push(InvariantViolation::CalendarStray { event: id, day });
                }
            }
        }
        for event in engine.events() {
            let found_on = days_by_id.remove(&event.id).unwrap_or_default();
            if found_on != vec![event.day] {
                violations.push(InvariantViolation::CalendarPlacement {
                    event: event.id,
                    expected: event.day,
                    found_on,
                });
            }
        }

        // Categories: union of labels from the index and from the entities.
        let mut labels: Vec<String> = engine
            .category_labels()
            .map(ToString::to_string)
            .collect();
        for event in engine.events() {
            labels.extend(event.categories.iter().cloned());
        }
        for user in engine.users() {
            labels.extend(user.favorites.iter().cloned());
        }
        labels.sort_unstable();
        labels.dedup();

        for label in labels {
            let indexed_events: HashSet<EventId> = engine.events_in_category(&label).collect();
            let actual_events: HashSet<EventId> = engine
                .events()
                .filter(|e| e.categories.contains(&label))
                .map(|e| e.id)
                .collect();
            let indexed_users: HashSet<UserId> = engine.users_with_favorite(&label).collect();
            let actual_users: HashSet<UserId> = engine
                .users()
                .filter(|u| u.favorites.contains(&label))
                .map(|u| u.id)
                .collect();

            if indexed_events != actual_events || indexed_users != actual_users {
                violations.push(InvariantViolation::CategoryDrift {
                    label,
                    missing_events: actual_events.difference(&indexed_events).copied().collect(),
                    extra_events: indexed_events.difference(&actual_events).copied().collect(),
                    missing_users: actual_users.difference(&indexed_users).copied().collect(),
                    extra_users: indexed_users.difference(&actual_users).copied().collect(),
                });
            }
        }

        OracleResult::from_violations(violations)
    }

    /// `delivered ⊆ matches`: under pure insertion a delivered pair can
    /// never leave the match set.
    #[must_use]
    pub fn check_delivery(engine: &Recommender) -> OracleResult {
        let violations: Vec<InvariantViolation> = engine
            .delivered()
            .difference(engine.matches())
            .map(|pair| InvariantViolation::DeliveryLeak { pair: *pair })
            .collect();
        OracleResult::from_violations(violations)
    }
}

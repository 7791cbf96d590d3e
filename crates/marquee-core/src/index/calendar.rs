use std::collections::{HashMap, HashSet};

use crate::id::EventId;

/// Calendar index bucketing event ids by day of year.
///
/// Days are cyclic: window queries wrap modulo `num_days` in both
/// directions. An event id lives under exactly one day.
#[derive(Debug, Clone)]
pub struct Calendar {
    num_days: u32,
    days: HashMap<u32, HashSet<EventId>>,
}

impl Calendar {
    #[must_use]
    pub fn new(num_days: u32) -> Self {
        Self {
            num_days,
            days: HashMap::new(),
        }
    }

    /// Bucket an event id under its day. The caller has already validated
    /// the day against `[0, num_days)`.
    pub fn insert(&mut self, day: u32, id: EventId) {
        self.days.entry(day).or_default().insert(id);
    }

    /// Event ids scheduled on one day. Empty for unknown days; never
    /// allocates.
    pub fn on_day(&self, day: u32) -> impl Iterator<Item = EventId> + '_ {
        self.days.get(&day).into_iter().flatten().copied()
    }

    /// Event ids within a `window`-day run centered on `day`.
    ///
    /// The half-width is `window / 2` with integer floor division, so an odd
    /// window covers `[day - half, day + half]` inclusive while an even
    /// window sits one day short on the high side — `window = 6` covers
    /// `[day - 3, day + 2]`. The run wraps past both ends of the year.
    ///
    /// Spans longer than the year clamp to `num_days`, so no day is visited
    /// twice and no id duplicates.
    #[must_use]
    pub fn window_around(&self, day: u32, window: u32) -> Vec<EventId> {
        let span = u64::from(window.min(self.num_days));
        let half = span / 2;
        let num_days = u64::from(self.num_days);
        let start = (u64::from(day) + num_days - half) % num_days;

        let mut found = Vec::new();
        for offset in 0..span {
            let d = u32::try_from((start + offset) % num_days).expect("modulo num_days fits u32");
            found.extend(self.on_day(d));
        }
        found
    }

    /// Scheduled days and their contents, for read-only enumeration.
    pub fn scheduled_days(&self) -> impl Iterator<Item = (u32, Vec<EventId>)> + '_ {
        self.days
            .iter()
            .map(|(day, ids)| (*day, ids.iter().copied().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::Calendar;
    use crate::id::EventId;

    #[test]
    fn window_wraps_below_day_zero() {
        let mut calendar = Calendar::new(365);
        let before = EventId::generate();
        let after = EventId::generate();
        let far = EventId::generate();
        calendar.insert(363, before);
        calendar.insert(2, after);
        calendar.insert(100, far);

        let found = calendar.window_around(0, 7);
        assert!(found.contains(&before));
        assert!(found.contains(&after));
        assert!(!found.contains(&far));
    }

    #[test]
    fn window_wraps_past_year_end() {
        let mut calendar = Calendar::new(365);
        let early = EventId::generate();
        calendar.insert(1, early);

        let found = calendar.window_around(363, 7);
        assert_eq!(found, vec![early]);
    }

    #[test]
    fn even_window_is_floor_asymmetric() {
        let mut calendar = Calendar::new(365);
        let low_edge = EventId::generate();
        let high_edge = EventId::generate();
        let past_high = EventId::generate();
        calendar.insert(97, low_edge);
        calendar.insert(102, high_edge);
        calendar.insert(103, past_high);

        // window = 6, half = 3: days 97..=102, not 103.
        let found = calendar.window_around(100, 6);
        assert!(found.contains(&low_edge));
        assert!(found.contains(&high_edge));
        assert!(!found.contains(&past_high));
    }

    #[test]
    fn zero_window_finds_nothing() {
        let mut calendar = Calendar::new(365);
        calendar.insert(5, EventId::generate());
        assert!(calendar.window_around(5, 0).is_empty());
    }

    #[test]
    fn oversized_window_clamps_to_one_full_year() {
        let mut calendar = Calendar::new(5);
        let ids: Vec<EventId> = (0..5)
            .map(|day| {
                let id = EventId::generate();
                calendar.insert(day, id);
                id
            })
            .collect();

        let found = calendar.window_around(2, 40);
        assert_eq!(found.len(), 5);
        for id in ids {
            assert!(found.contains(&id));
        }
    }
}

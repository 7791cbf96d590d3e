use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::id::EventId;
use crate::model::Coord;

/// An event in the catalog: a set of interest categories, a grid location,
/// and the day of year it takes place.
///
/// Immutable once inserted, except that new categories may be added through
/// [`Recommender::add_category`], which re-runs incremental indexing for the
/// one new label.
///
/// [`Recommender::add_category`]: crate::engine::Recommender::add_category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Category labels; duplicates collapse, insertion order is irrelevant.
    pub categories: BTreeSet<String>,
    pub coord: Coord,
    /// Day of year in `[0, num_days)`.
    pub day: u32,
}

impl Event {
    /// Build an event with a freshly generated id.
    pub fn new<I, S>(categories: I, coord: Coord, day: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: EventId::generate(),
            categories: categories.into_iter().map(Into::into).collect(),
            coord,
            day,
        }
    }

    /// Range/label validation against the engine's configured dimensions.
    pub(crate) fn validate(&self, config: &EngineConfig) -> Result<()> {
        if !self.coord.in_grid(config.grid_size) {
            return Err(Error::CoordOutOfRange {
                coord: self.coord,
                grid_size: config.grid_size,
            });
        }
        if self.day >= config.num_days {
            return Err(Error::DayOutOfRange {
                day: self.day,
                num_days: config.num_days,
            });
        }
        if self.categories.iter().any(String::is_empty) {
            return Err(Error::EmptyCategory);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Event;
    use crate::config::EngineConfig;
    use crate::error::Error;
    use crate::model::Coord;

    #[test]
    fn duplicate_categories_collapse() {
        let event = Event::new(["rock", "rock", "pop"], Coord::new(1, 1), 0);
        assert_eq!(event.categories.len(), 2);
        assert!(event.categories.contains("rock"));
        assert!(event.categories.contains("pop"));
    }

    #[test]
    fn categories_may_be_empty() {
        let event = Event::new(Vec::<String>::new(), Coord::new(0, 0), 0);
        assert!(event.categories.is_empty());
        assert!(event.validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = EngineConfig::default();

        let event = Event::new(["rock"], Coord::new(10, 0), 0);
        assert!(matches!(
            event.validate(&config),
            Err(Error::CoordOutOfRange { grid_size: 10, .. })
        ));

        let event = Event::new(["rock"], Coord::new(0, 0), 365);
        assert!(matches!(
            event.validate(&config),
            Err(Error::DayOutOfRange {
                day: 365,
                num_days: 365
            })
        ));
    }

    #[test]
    fn empty_label_is_rejected() {
        let event = Event::new(["rock", ""], Coord::new(0, 0), 0);
        assert_eq!(
            event.validate(&EngineConfig::default()),
            Err(Error::EmptyCategory)
        );
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::id::UserId;
use crate::model::Coord;

/// A user in the catalog: favorite categories, a grid location used as a
/// query origin, and a birthday. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Favorite category labels; may be empty.
    pub favorites: BTreeSet<String>,
    pub coord: Coord,
    /// Day of year in `[0, num_days)`.
    pub birthday: u32,
}

impl User {
    /// Build a user with a freshly generated id.
    pub fn new<I, S>(favorites: I, coord: Coord, birthday: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: UserId::generate(),
            favorites: favorites.into_iter().map(Into::into).collect(),
            coord,
            birthday,
        }
    }

    pub(crate) fn validate(&self, config: &EngineConfig) -> Result<()> {
        if !self.coord.in_grid(config.grid_size) {
            return Err(Error::CoordOutOfRange {
                coord: self.coord,
                grid_size: config.grid_size,
            });
        }
        if self.birthday >= config.num_days {
            return Err(Error::DayOutOfRange {
                day: self.birthday,
                num_days: config.num_days,
            });
        }
        if self.favorites.iter().any(String::is_empty) {
            return Err(Error::EmptyCategory);
        }
        Ok(())
    }
}

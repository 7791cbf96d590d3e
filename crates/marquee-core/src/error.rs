use crate::id::{EventId, UserId};
use crate::model::Coord;

/// Errors returned by the matching engine.
///
/// Validation failures are raised before any state is touched: an insertion
/// that fails leaves the store, every index, and the match set exactly as
/// they were.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A coordinate component falls outside `[0, grid_size)`.
    #[error("coordinate {coord} outside grid 0..{grid_size}")]
    CoordOutOfRange { coord: Coord, grid_size: u32 },

    /// A day or birthday falls outside `[0, num_days)`.
    #[error("day {day} outside calendar 0..{num_days}")]
    DayOutOfRange { day: u32, num_days: u32 },

    /// A category label was empty. Labels are opaque exact-match strings,
    /// but the empty string is never a valid label.
    #[error("category labels must be non-empty")]
    EmptyCategory,

    /// Engine configuration rejected at construction.
    #[error("invalid engine config: {0}")]
    InvalidConfig(&'static str),

    /// No event with the given id is stored.
    #[error("no event with id {0}")]
    EventNotFound(EventId),

    /// No user with the given id is stored.
    #[error("no user with id {0}")]
    UserNotFound(UserId),
}

impl Error {
    /// True for errors raised by range/label validation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::CoordOutOfRange { .. }
                | Self::DayOutOfRange { .. }
                | Self::EmptyCategory
                | Self::InvalidConfig(_)
        )
    }

    /// True for lookups that referenced an unknown entity id.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_) | Self::UserNotFound(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//! The three indexes the recommendation engine keeps consistent on every
//! insertion: category label → ids, spatial grid cell → event ids, and
//! calendar day → event ids.
//!
//! Lookups for keys with no entries return empty views and never create a
//! persisted bucket, so read traffic cannot grow memory.

mod calendar;
mod category;
mod grid;

pub use calendar::Calendar;
pub use category::CategoryIndex;
pub use grid::SpatialGrid;

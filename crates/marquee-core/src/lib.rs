//! marquee-core: an in-memory interest-matching engine.
//!
//! A catalog of events and users, three indexes kept consistent on every
//! insertion (category → ids, spatial grid, calendar day), and the derived
//! set of (event, user) recommendation pairs with at-most-once delivery
//! tracking.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`error::Result`]; validation
//!   failures never leave state partially updated.
//! - **Logging**: `tracing` macros (`info!`, `debug!`) on mutation paths.

pub mod config;
pub mod engine;
pub mod error;
pub mod id;
pub mod index;
pub mod model;

pub use config::EngineConfig;
pub use engine::{Match, Recommender};
pub use error::{Error, Result};
pub use id::{EventId, UserId};
pub use model::{Coord, Event, User};

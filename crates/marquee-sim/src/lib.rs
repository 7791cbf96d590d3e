//! marquee-sim: deterministic simulation harness for the matching engine.
//!
//! A seeded RNG, a reproducible entity generator, an invariant oracle that
//! diffs the engine's derived state against full recomputation, and a
//! campaign runner that drives many seeds through random operation mixes.

pub mod campaign;
pub mod generate;
pub mod oracle;
pub mod rng;

pub use campaign::{CampaignConfig, CampaignReport, SeedFailure, run_campaign, run_single_seed};
pub use generate::{CATEGORY_POOL, EntityGen};
pub use oracle::{InvariantViolation, MatchOracle, OracleResult};
pub use rng::DeterministicRng;

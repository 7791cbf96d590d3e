//! Campaign runner for deterministic simulation campaigns.
//!
//! Executes many seeds, each driving a fresh engine through a random mix of
//! insertions, category additions, and drains, with the oracle checked after
//! every step. Collects pass/fail results and the first failing seed for
//! replay.

use std::collections::HashSet;
use std::ops::Range;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::debug;

use marquee_core::{EngineConfig, EventId, Match, Recommender};

use crate::generate::EntityGen;
use crate::oracle::{InvariantViolation, MatchOracle};
use crate::rng::DeterministicRng;

/// Campaign-level configuration: how many seeds, how many steps per seed,
/// and how the random operation mix is weighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Range of seeds to execute, e.g. `0..100`.
    pub seed_range: Range<u64>,
    /// Operations per seed.
    pub steps: u32,
    /// Engine dimensions each seed runs under.
    pub engine: EngineConfig,
    /// Chance an insertion step inserts a user rather than an event
    /// (percent, 0–100).
    pub user_percent: u8,
    /// Chance a step adds a category to a random existing event instead of
    /// inserting (percent, 0–100).
    pub add_category_percent: u8,
    /// Drain pending recommendations every N steps (0 = never drain).
    pub drain_every: u32,
    /// Shuffled re-insertion orders the commutativity check tries per step.
    pub permutations: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            seed_range: 0..50,
            steps: 40,
            engine: EngineConfig::default(),
            user_percent: 40,
            add_category_percent: 15,
            drain_every: 5,
            permutations: 2,
        }
    }
}

impl CampaignConfig {
    /// Validate configuration before running.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.seed_range.is_empty() {
            bail!("seed_range must not be empty");
        }
        if self.steps == 0 {
            bail!("steps must be > 0");
        }
        if self.user_percent > 100 || self.add_category_percent > 100 {
            bail!("percentages must be <= 100");
        }
        self.engine.validate()?;
        Ok(())
    }
}

/// Failure details for a single seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFailure {
    /// The seed that failed.
    pub seed: u64,
    /// Invariant violations found, rendered as text.
    pub violations: Vec<String>,
}

/// Aggregate report produced by a campaign run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Total seeds executed.
    pub seeds_run: usize,
    /// Seeds that passed all invariants.
    pub seeds_passed: usize,
    /// First seed that failed (for prioritized replay).
    pub first_failure: Option<u64>,
    /// All seed failures with violation details.
    pub failures: Vec<SeedFailure>,
}

impl CampaignReport {
    /// True if every seed passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run a full campaign across all seeds in the config.
///
/// # Errors
///
/// Returns an error if config validation fails or a simulated operation
/// encounters an internal engine error.
pub fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    config.validate()?;

    let mut seeds_run = 0_usize;
    let mut seeds_passed = 0_usize;
    let mut first_failure: Option<u64> = None;
    let mut failures = Vec::new();

    for seed in config.seed_range.clone() {
        seeds_run += 1;
        match run_single_seed(seed, config)? {
            Ok(()) => seeds_passed += 1,
            Err(violations) => {
                if first_failure.is_none() {
                    first_failure = Some(seed);
                }
                failures.push(SeedFailure {
                    seed,
                    violations: violations.iter().map(format_violation).collect(),
                });
            }
        }
    }

    Ok(CampaignReport {
        seeds_run,
        seeds_passed,
        first_failure,
        failures,
    })
}

/// Run a single seed and return `Ok(())` on pass, `Err(violations)` on
/// failure.
///
/// # Errors
///
/// Returns an `anyhow::Error` if the engine itself errors on an operation
/// the campaign believed valid. The inner `Result` distinguishes pass from
/// invariant violations.
pub fn run_single_seed(
    seed: u64,
    config: &CampaignConfig,
) -> Result<std::result::Result<(), Vec<InvariantViolation>>> {
    let mut rng = DeterministicRng::new(seed);
    let mut entity_gen = EntityGen::new(seed.wrapping_add(0xBEEF), config.engine);
    let mut engine = Recommender::new(config.engine)?;

    // Insertion-ordered id list: map iteration order must not steer the
    // campaign, or replays would diverge.
    let mut event_ids: Vec<EventId> = Vec::new();
    let mut drained_history: HashSet<Match> = HashSet::new();
    let mut violations: Vec<InvariantViolation> = Vec::new();

    for step in 0..config.steps {
        let draining = config.drain_every > 0 && step % config.drain_every == config.drain_every - 1;
        if draining {
            for pair in engine.take_pending() {
                if !drained_history.insert(pair) {
                    violations.push(InvariantViolation::Redelivery { pair });
                }
            }
        } else if !event_ids.is_empty() && rng.hit_rate_percent(config.add_category_percent) {
            let target = event_ids[rng.next_bounded(event_ids.len() as u64) as usize];
            engine.add_category(target, entity_gen.label())?;
        } else if rng.hit_rate_percent(config.user_percent) {
            engine.insert_user(entity_gen.user())?;
        } else {
            let event = entity_gen.event();
            event_ids.push(event.id);
            engine.insert_event(event)?;
        }

        let mut oracle_rng =
            DeterministicRng::new(seed.wrapping_add(u64::from(step)).wrapping_mul(0xDEAD));
        let result = MatchOracle::check_all(&engine, &mut oracle_rng, config.permutations);
        if !result.passed {
            violations.extend(result.violations);
            debug!(seed, step, "oracle failed, aborting seed");
            break;
        }
    }

    if violations.is_empty() {
        Ok(Ok(()))
    } else {
        Ok(Err(violations))
    }
}

/// Format an invariant violation into a human-readable string.
fn format_violation(v: &InvariantViolation) -> String {
    match v {
        InvariantViolation::Rederivability { missing, extra } => format!(
            "Rederivability: match set diverges from full recompute \
             (missing={}, extra={})",
            missing.len(),
            extra.len()
        ),
        InvariantViolation::Commutativity {
            permutation,
            missing,
            extra,
        } => format!(
            "Commutativity: permutation {permutation} diverges \
             (missing={}, extra={})",
            missing.len(),
            extra.len()
        ),
        InvariantViolation::GridPlacement {
            event,
            expected,
            found_in,
        } => format!(
            "GridPlacement: event {event} expected at {expected}, found in {} cell(s)",
            found_in.len()
        ),
        InvariantViolation::GridStray { event, cell } => {
            format!("GridStray: unknown event {event} in cell {cell}")
        }
        InvariantViolation::CalendarPlacement {
            event,
            expected,
            found_on,
        } => format!(
            "CalendarPlacement: event {event} expected on day {expected}, found on {} day(s)",
            found_on.len()
        ),
        InvariantViolation::CalendarStray { event, day } => {
            format!("CalendarStray: unknown event {event} on day {day}")
        }
        InvariantViolation::CategoryDrift { label, .. } => {
            format!("CategoryDrift: index and store disagree for label '{label}'")
        }
        InvariantViolation::DeliveryLeak { pair } => format!(
            "DeliveryLeak: delivered pair ({}, {}) missing from match set",
            pair.event, pair.user
        ),
        InvariantViolation::Redelivery { pair } => format!(
            "Redelivery: pair ({}, {}) surfaced by two drains",
            pair.event, pair.user
        ),
    }
}

//! Deterministic entity construction.
//!
//! The engine requires fully-populated entities; filling unspecified fields
//! with random in-range values is the construction collaborator's job. This
//! is that collaborator for simulations: seeded, reproducible, drawing
//! category labels from a fixed pool.

use marquee_core::{Coord, EngineConfig, Event, User};

use crate::rng::DeterministicRng;

/// Fixed label pool entities draw from. Small enough that overlap between
/// events and users is common at default campaign sizes.
pub const CATEGORY_POOL: [&str; 12] = [
    "rock", "pop", "rap", "folk", "jazz", "metal", "indie", "techno", "blues", "country",
    "classical", "punk",
];

/// Seeded generator for random events and users.
#[derive(Debug, Clone)]
pub struct EntityGen {
    rng: DeterministicRng,
    config: EngineConfig,
}

impl EntityGen {
    #[must_use]
    pub const fn new(seed: u64, config: EngineConfig) -> Self {
        Self {
            rng: DeterministicRng::new(seed),
            config,
        }
    }

    /// A random event: up to 3 pool labels, uniform coordinate and day.
    pub fn event(&mut self) -> Event {
        let labels = self.label_set();
        Event::new(labels, self.coord(), self.day())
    }

    /// A random user: up to 3 favorite labels (possibly none), uniform
    /// coordinate and birthday.
    pub fn user(&mut self) -> User {
        let labels = self.label_set();
        User::new(labels, self.coord(), self.day())
    }

    /// One random label from the pool.
    pub fn label(&mut self) -> String {
        let i = self.rng.next_bounded(CATEGORY_POOL.len() as u64) as usize;
        CATEGORY_POOL[i].to_string()
    }

    fn label_set(&mut self) -> Vec<String> {
        let count = self.rng.next_bounded(4);
        (0..count).map(|_| self.label()).collect()
    }

    fn coord(&mut self) -> Coord {
        Coord::new(
            self.rng.next_u32_bounded(self.config.grid_size),
            self.rng.next_u32_bounded(self.config.grid_size),
        )
    }

    fn day(&mut self) -> u32 {
        self.rng.next_u32_bounded(self.config.num_days)
    }
}

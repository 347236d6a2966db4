//! Synthetic reading generator.
//!
//! There is no hardware behind the habitat sensor: each field is drawn
//! uniformly from its documented range and rounded to two decimals.

use crate::sensor::types::{round2, Reading, SensorField};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces one reading per cycle.
pub struct ReadingGenerator<R: Rng = StdRng> {
    rng: R,
}

impl ReadingGenerator<StdRng> {
    /// Create a generator seeded from the OS entropy source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator, mostly useful in tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ReadingGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ReadingGenerator<R> {
    /// Wrap an existing random source.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a fresh reading.
    pub fn generate(&mut self) -> Reading {
        let mut values = [0.0; 6];
        for (slot, field) in values.iter_mut().zip(SensorField::ALL) {
            *slot = round2(self.rng.gen_range(field.range()));
        }
        Reading::from_values(values)
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Random level generation with bounded retries and a guaranteed fallback.
//!
//! Each attempt samples an obstacle layout and keeps it only if the
//! reachability checker confirms the target can still be reached. When the
//! attempt budget runs out without a solvable candidate, the generator
//! returns the fixed starter level instead, so it never emits an
//! unsolvable level and never loops unboundedly.

pub mod reachability;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use robo_blocks_core::{CellCoord, Command, Heading, LevelConfig};

use crate::reachability::is_reachable;

const GRID_SIZE: i32 = 5;
const MIN_OBSTACLES: usize = 3;
const MAX_OBSTACLES: usize = 7;

/// Attempt budget used by interactive sessions.
pub const DEFAULT_ATTEMPT_BUDGET: u32 = 100;

/// Configuration parameters required to construct the generator.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    attempt_budget: u32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided budget and seed.
    #[must_use]
    pub const fn new(attempt_budget: u32, rng_seed: u64) -> Self {
        Self {
            attempt_budget,
            rng_seed,
        }
    }
}

/// System that produces solvable random levels on demand.
#[derive(Debug)]
pub struct LevelGeneration {
    rng: ChaCha8Rng,
    attempt_budget: u32,
}

impl LevelGeneration {
    /// Creates a deterministic generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            attempt_budget: config.attempt_budget,
        }
    }

    /// Creates a generator seeded from the operating system entropy pool.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
        }
    }

    /// Emits a `LoadLevel` command carrying a freshly generated level.
    pub fn handle(&mut self, out: &mut Vec<Command>) {
        out.push(Command::LoadLevel {
            level: self.generate(),
        });
    }

    /// Generates a solvable level, falling back to the starter level when
    /// the attempt budget is exhausted.
    pub fn generate(&mut self) -> LevelConfig {
        let start = CellCoord::new(0, GRID_SIZE - 1);
        let target = CellCoord::new(GRID_SIZE - 1, 0);

        for _ in 0..self.attempt_budget {
            let obstacles = self.sample_obstacles(start, target);
            if !is_reachable(GRID_SIZE, start, target, &obstacles) {
                continue;
            }

            if let Ok(level) = LevelConfig::new(GRID_SIZE, start, Heading::East, target, obstacles)
            {
                return level;
            }
        }

        LevelConfig::starter()
    }

    /// Rejection-samples distinct obstacle cells that avoid the start and
    /// target until the drawn count is met.
    fn sample_obstacles(&mut self, start: CellCoord, target: CellCoord) -> Vec<CellCoord> {
        let count = self.rng.gen_range(MIN_OBSTACLES..=MAX_OBSTACLES);
        let mut obstacles: Vec<CellCoord> = Vec::with_capacity(count);

        while obstacles.len() < count {
            let cell = CellCoord::new(
                self.rng.gen_range(0..GRID_SIZE),
                self.rng.gen_range(0..GRID_SIZE),
            );
            if cell == start || cell == target || obstacles.contains(&cell) {
                continue;
            }
            obstacles.push(cell);
        }

        obstacles
    }
}

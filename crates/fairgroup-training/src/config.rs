//! Parameters of a genetic search.

use std::num::NonZeroUsize;

use fairgroup_model::ConfigError;
use serde::{Deserialize, Serialize};

/// Immutable parameters threaded through the evolution driver.
///
/// Every field has a default, so a partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of candidate assignments per generation.
    pub generation_size: usize,
    /// Share of the ranked generation kept as the breeding pool, in `(0, 1]`.
    pub selection_rate: f64,
    /// Probability that a child is built by single-point crossover, in `[0, 1]`.
    pub crossover_rate: f64,
    /// Probability that a child gets one relabelled position, in `[0, 1]`.
    pub mutation_rate: f64,
    /// Number of reproduction rounds. Zero evaluates the initial generation only.
    pub max_generations: usize,
    /// Stop after this many consecutive generations without a new best score. Must be positive.
    pub stagnation_limit: Option<usize>,
    /// Number of top assignments copied unchanged into the next generation.
    pub elite_count: usize,
    /// Seed for the default generator. A random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Worker threads for fitness evaluation. Defaults to the available parallelism.
    pub evaluation_threads: Option<NonZeroUsize>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generation_size: 150,
            selection_rate: 0.2,
            crossover_rate: 0.5,
            mutation_rate: 0.5,
            max_generations: 300,
            stagnation_limit: None,
            elite_count: 1,
            seed: None,
            evaluation_threads: None,
        }
    }
}

impl EvolutionConfig {
    /// Checks every parameter against its valid range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation_size == 0 {
            return Err(ConfigError::ZeroGenerationSize);
        }
        if self.stagnation_limit == Some(0) {
            return Err(ConfigError::ZeroStagnationLimit);
        }
        if self.selection_rate.is_nan() || self.selection_rate <= 0.0 || self.selection_rate > 1.0 {
            return Err(ConfigError::RateOutOfRange {
                name: "selection rate",
                range: "(0, 1]",
                value: self.selection_rate,
            });
        }
        for (name, value) in [
            ("crossover rate", self.crossover_rate),
            ("mutation rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange {
                    name,
                    range: "[0, 1]",
                    value,
                });
            }
        }
        if self.elite_count > self.generation_size {
            return Err(ConfigError::EliteCountTooLarge {
                elite_count: self.elite_count,
                generation_size: self.generation_size,
            });
        }
        Ok(())
    }

    pub(crate) fn thread_count(&self) -> usize {
        self.evaluation_threads
            .or_else(|| std::thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get)
    }
}

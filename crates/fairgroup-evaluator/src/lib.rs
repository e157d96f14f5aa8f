//! Fitness evaluation for candidate groupings.
//!
//! The evaluator scores an [`Assignment`](fairgroup_model::Assignment) against the
//! population it partitions. The score is a sum over groups; higher is better and
//! only the relative order of scores matters.
//!
//! # Modules
//!
//! - [`weights`] - relative importance of group size and of every trait
//! - [`profile`] - per-group member counts by (trait, value) slot
//! - [`group_evaluator`] - the fitness function itself
//!
//! # Example
//!
//! ```
//! use fairgroup_evaluator::{group_evaluator::GroupingEvaluator, weights::FitnessWeights};
//! use fairgroup_model::{Assignment, Individual, TraitCatalogue};
//!
//! let individuals = vec![
//!     Individual::new("a", ["dev"]),
//!     Individual::new("b", ["ops"]),
//!     Individual::new("c", ["dev"]),
//!     Individual::new("d", ["ops"]),
//! ];
//! let catalogue = TraitCatalogue::build(&individuals, &["discipline"]).unwrap();
//! let evaluator =
//!     GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 2).unwrap();
//!
//! let mixed = evaluator.score(&Assignment::new(vec![0, 0, 1, 1]));
//! let split = evaluator.score(&Assignment::new(vec![0, 1, 0, 1]));
//! assert!(mixed > split);
//! ```

use fairgroup_model::{ConfigError, SchemaError};

pub mod group_evaluator;
pub mod profile;
pub mod weights;

pub use self::group_evaluator::score_assignment;

/// Failure to set up an evaluator for a population.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvaluatorError {
    #[display("{_0}")]
    Schema(SchemaError),
    #[display("{_0}")]
    Config(ConfigError),
}

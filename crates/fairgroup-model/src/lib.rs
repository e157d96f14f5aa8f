//! Record model for fair grouping.
//!
//! This crate holds the data the rest of the workspace operates on:
//!
//! - [`Individual`] - one person to be grouped, with an identifier and categorical trait values
//! - [`TraitCatalogue`] - distinct values of every trait and their proportions in the whole population
//! - [`Assignment`] - a candidate grouping, one group label per individual
//!
//! It also defines the two fatal error types shared by the evaluator and the training crates:
//! [`SchemaError`] for malformed input records and [`ConfigError`] for invalid run parameters.

pub use self::{assignment::*, catalogue::*, individual::*};

pub mod assignment;
pub mod catalogue;
pub mod individual;

/// Input records do not match the declared trait schema.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SchemaError {
    #[display("population is empty")]
    EmptyPopulation,
    #[display("trait '{name}' is declared more than once")]
    DuplicateTrait { name: String },
    #[display("individual '{individual}' has no value for trait '{trait_name}'")]
    MissingTrait {
        individual: String,
        trait_name: String,
    },
    #[display("individual '{individual}' has an empty value for trait '{trait_name}'")]
    EmptyTraitValue {
        individual: String,
        trait_name: String,
    },
    #[display("individual '{individual}' has value '{value}' for trait '{trait_name}' not present in the catalogue")]
    UnknownTraitValue {
        individual: String,
        trait_name: String,
        value: String,
    },
    #[display("catalogue was built from {expected} individuals, got {actual}")]
    PopulationMismatch { expected: usize, actual: usize },
}

/// Run parameters are outside their valid range.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("group count must be positive")]
    ZeroGroups,
    #[display("group count {group_count} exceeds population size {population_size}")]
    TooManyGroups {
        group_count: usize,
        population_size: usize,
    },
    #[display("generation size must be positive")]
    ZeroGenerationSize,
    #[display("stagnation limit must be positive")]
    ZeroStagnationLimit,
    #[display("{name} must be within {range}, got {value}")]
    RateOutOfRange {
        name: &'static str,
        range: &'static str,
        value: f64,
    },
    #[display("elite count {elite_count} exceeds generation size {generation_size}")]
    EliteCountTooLarge {
        elite_count: usize,
        generation_size: usize,
    },
    #[display("weight for {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: String, value: f64 },
    #[display("weight given for unknown trait '{name}'")]
    UnknownTrait { name: String },
    #[display("initial assignment #{index} is invalid: {source}")]
    InvalidInitialAssignment {
        index: usize,
        source: InvalidAssignment,
    },
}

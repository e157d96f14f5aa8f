//! Genetic search for fair groupings.
//!
//! This crate drives the search over assignments of a population into groups. It
//! knows nothing about how a grouping is scored beyond calling the
//! [`GroupingEvaluator`](fairgroup_evaluator::group_evaluator::GroupingEvaluator).
//!
//! # How the Search Works
//!
//! 1. **Initialize** - Build a generation of random assignments (optionally seeded
//!    with caller-supplied ones)
//! 2. **Evaluate** - Score every assignment and rank the generation, best first
//! 3. **Select** - Keep the top share of the ranked generation as the breeding pool
//! 4. **Reproduce** - Carry the elites over, then fill the generation with children
//!    built by single-point crossover and single-position mutation
//! 5. **Repeat** - Until the generation limit or the stagnation limit is reached
//!
//! # Modules
//!
//! - [`config`] - [`EvolutionConfig`](config::EvolutionConfig), the immutable run parameters
//! - [`genetic`] - [`Generation`](genetic::Generation), ranked scored assignments
//! - [`operators`] - initialization, selection, crossover, mutation and reproduction
//! - [`evolution`] - [`Evolution`](evolution::Evolution), the generational state machine
//!
//! # Reproducibility
//!
//! All randomness is drawn from one generator owned by the driver. Reproduction is
//! sequential; only fitness evaluation runs on several threads, and it draws no
//! random numbers. A fixed seed therefore yields the same outcome regardless of the
//! number of evaluation threads.
//!
//! # Current Limitations
//!
//! - **No global optimality**: the search returns the best grouping it has seen
//! - **Fixed schema**: traits and their weights are inputs, never inferred
//! - **No persistence**: a search cannot be saved and resumed

pub mod config;
pub mod evolution;
pub mod genetic;
pub mod operators;

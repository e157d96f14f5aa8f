//! Genetic operators on group assignments.
//!
//! These functions are the building blocks the [`Evolution`](crate::evolution::Evolution)
//! driver composes into one reproduction round:
//!
//! - **Initialization**: [`random_assignment`] draws every label uniformly from `[0, group_count)`
//! - **Selection**: [`select`] keeps the top `ceil(selection_rate × generation_size)` ranked members
//! - **Crossover**: [`crossover`] performs single-point crossover with probability `crossover_rate`
//! - **Mutation**: [`mutate`] relabels at most one position with probability `mutation_rate`
//! - **Reproduction**: [`Reproduction::reproduce`] carries the elites over and fills the rest with children
//!
//! Every operator returns a new [`Assignment`]; parents are never modified. All
//! randomness comes from the generator passed in, so a seeded generator makes the
//! whole search reproducible.

use fairgroup_model::Assignment;
use rand::Rng;

use crate::genetic::{Generation, ScoredAssignment};

/// Draws a uniformly random assignment of `len` individuals to `group_count` groups.
///
/// # Panics
///
/// Panics if `group_count` is zero and `len` is not.
pub fn random_assignment<R>(rng: &mut R, len: usize, group_count: usize) -> Assignment
where
    R: Rng + ?Sized,
{
    Assignment::new((0..len).map(|_| rng.random_range(0..group_count)).collect())
}

/// Size of the breeding pool: `ceil(selection_rate × generation_size)`, at least one
/// and at most the whole generation.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn breeding_pool_size(generation_size: usize, selection_rate: f64) -> usize {
    let size = (selection_rate * generation_size as f64).ceil() as usize;
    size.clamp(1, generation_size.max(1))
}

/// Truncation selection: returns the top-ranked members as the breeding pool.
///
/// # Panics
///
/// Panics if the generation has not been ranked.
#[must_use]
pub fn select(generation: &Generation, selection_rate: f64) -> &[ScoredAssignment] {
    assert!(generation.is_ranked(), "selection requires a ranked generation");
    let size = breeding_pool_size(generation.len(), selection_rate);
    &generation.members()[..size]
}

/// Single-point crossover at a fixed cut.
///
/// The child takes positions `[0, cut)` from `a` and `[cut, len)` from `b`.
///
/// # Panics
///
/// Panics if the parents differ in length or `cut` exceeds it.
#[must_use]
pub fn crossover_at(a: &Assignment, b: &Assignment, cut: usize) -> Assignment {
    assert_eq!(a.len(), b.len());
    let mut labels = Vec::with_capacity(a.len());
    labels.extend_from_slice(&a.labels()[..cut]);
    labels.extend_from_slice(&b.labels()[cut..]);
    Assignment::new(labels)
}

/// Produces a child of two parents.
///
/// With probability `rate` the child is the single-point crossover of `a` and `b`
/// at a cut drawn uniformly from `[1, len - 1]`. Otherwise, or when the parents are
/// too short to cut, the child is a copy of `a`.
///
/// # Panics
///
/// Panics if the parents differ in length or `rate` is outside `[0, 1]`.
pub fn crossover<R>(a: &Assignment, b: &Assignment, rate: f64, rng: &mut R) -> Assignment
where
    R: Rng + ?Sized,
{
    assert_eq!(a.len(), b.len());
    if a.len() >= 2 && rng.random_bool(rate) {
        let cut = rng.random_range(1..a.len());
        crossover_at(a, b, cut)
    } else {
        a.clone()
    }
}

/// Returns a copy of `assignment`, mutated with probability `rate`.
///
/// A mutation picks one position uniformly and moves it to a uniformly drawn group
/// other than its current one. With fewer than two groups there is nothing to move
/// to and the copy is unchanged.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate<R>(assignment: &Assignment, rate: f64, group_count: usize, rng: &mut R) -> Assignment
where
    R: Rng + ?Sized,
{
    if group_count < 2 || assignment.is_empty() || !rng.random_bool(rate) {
        return assignment.clone();
    }
    let position = rng.random_range(0..assignment.len());
    let current = assignment.labels()[position];
    let drawn = rng.random_range(0..group_count - 1);
    let label = if drawn >= current { drawn + 1 } else { drawn };
    assignment.with_label(position, label)
}

/// Parameters of one reproduction round.
#[derive(Debug, Clone, Copy)]
pub struct Reproduction {
    pub generation_size: usize,
    pub elite_count: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub group_count: usize,
}

impl Reproduction {
    /// Builds the next generation's members from a ranked generation and its breeding pool.
    ///
    /// 1. The top `elite_count` members are carried over unchanged, with their score
    /// 2. Until the generation is full, two parents are drawn uniformly (with
    ///    replacement) from the pool, crossed over, and the child is mutated
    ///
    /// Returns `(carried, children)`; children still need scoring.
    ///
    /// # Panics
    ///
    /// Panics if the generation is not ranked or the pool is empty.
    pub fn reproduce<R>(
        &self,
        generation: &Generation,
        pool: &[ScoredAssignment],
        rng: &mut R,
    ) -> (Vec<ScoredAssignment>, Vec<Assignment>)
    where
        R: Rng + ?Sized,
    {
        assert!(generation.is_ranked());
        assert!(!pool.is_empty(), "breeding pool must not be empty");

        let elite_count = self.elite_count.min(generation.len());
        let carried = generation.members()[..elite_count].to_vec();

        let child_count = self.generation_size.saturating_sub(carried.len());
        let mut children = Vec::with_capacity(child_count);
        while children.len() < child_count {
            let a = &pool[rng.random_range(0..pool.len())];
            let b = &pool[rng.random_range(0..pool.len())];
            let child = crossover(a.assignment(), b.assignment(), self.crossover_rate, rng);
            children.push(mutate(&child, self.mutation_rate, self.group_count, rng));
        }
        (carried, children)
    }
}

//! Generations of scored candidate assignments.
//!
//! A [`Generation`] is the GA's working set at one iteration: every candidate
//! [`Assignment`] paired with its fitness. It is not to be confused with the
//! population of individuals being grouped.
//!
//! # Parallelization
//!
//! Fitness evaluation is pure, so [`Generation::score`] splits the candidates into
//! contiguous chunks and scores each chunk on its own scoped thread. Scores are
//! written back by index, so the result is identical to sequential scoring.

use std::{iter, thread};

use fairgroup_evaluator::group_evaluator::GroupingEvaluator;
use fairgroup_model::Assignment;
use fairgroup_stats::descriptive::DescriptiveStats;
use serde::Serialize;

/// A candidate assignment and its fitness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAssignment {
    assignment: Assignment,
    fitness: f64,
}

impl ScoredAssignment {
    #[must_use]
    pub fn new(assignment: Assignment, fitness: f64) -> Self {
        Self {
            assignment,
            fitness,
        }
    }

    #[must_use]
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Higher is better.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }
}

/// One generation of the genetic search.
#[derive(Debug, Clone)]
pub struct Generation {
    members: Vec<ScoredAssignment>,
    ranked: bool,
}

impl Generation {
    /// Builds a generation from already scored members, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if `members` is empty.
    #[must_use]
    pub fn new(members: Vec<ScoredAssignment>) -> Self {
        assert!(!members.is_empty(), "generation must not be empty");
        Self {
            members,
            ranked: false,
        }
    }

    /// Scores `fresh` assignments and appends them after `carried` members.
    ///
    /// Carried members keep their score; they are elites copied unchanged from
    /// the previous generation. The result is not ranked yet.
    ///
    /// # Panics
    ///
    /// Panics if both inputs are empty.
    #[must_use]
    pub fn score(
        carried: Vec<ScoredAssignment>,
        fresh: Vec<Assignment>,
        evaluator: &GroupingEvaluator,
        threads: usize,
    ) -> Self {
        let mut members = carried;
        members.extend(score_all(fresh, evaluator, threads));
        Self::new(members)
    }

    /// Sorts members by fitness, best first.
    ///
    /// The sort is stable: members with equal fitness keep their relative order.
    pub fn rank(&mut self) {
        self.members.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        self.ranked = true;
    }

    #[must_use]
    pub fn is_ranked(&self) -> bool {
        self.ranked
    }

    /// Returns the top-ranked member.
    ///
    /// # Panics
    ///
    /// Panics if the generation has not been ranked.
    #[must_use]
    pub fn best(&self) -> &ScoredAssignment {
        assert!(self.ranked, "generation must be ranked before taking the best");
        &self.members[0]
    }

    /// Replaces this generation wholesale; the previous members are dropped.
    pub fn replace(&mut self, next: Generation) {
        *self = next;
    }

    /// Members in their current order (ranked order after [`Self::rank`]).
    #[must_use]
    pub fn members(&self) -> &[ScoredAssignment] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Summarizes the fitness distribution of this generation.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.members.iter().map(ScoredAssignment::fitness))
    }
}

fn score_all(
    assignments: Vec<Assignment>,
    evaluator: &GroupingEvaluator,
    threads: usize,
) -> Vec<ScoredAssignment> {
    let mut scores = vec![0.0; assignments.len()];
    if threads <= 1 || assignments.len() < 2 {
        for (score, assignment) in iter::zip(&mut scores, &assignments) {
            *score = evaluator.score(assignment);
        }
    } else {
        let chunk_size = assignments.len().div_ceil(threads);
        thread::scope(|s| {
            for (scores, assignments) in
                iter::zip(scores.chunks_mut(chunk_size), assignments.chunks(chunk_size))
            {
                s.spawn(move || {
                    for (score, assignment) in iter::zip(scores, assignments) {
                        *score = evaluator.score(assignment);
                    }
                });
            }
        });
    }
    iter::zip(assignments, scores)
        .map(|(assignment, fitness)| ScoredAssignment::new(assignment, fitness))
        .collect()
}

#[cfg(test)]
mod tests {
    use fairgroup_evaluator::weights::FitnessWeights;
    use fairgroup_model::{Individual, TraitCatalogue};

    use super::*;

    fn scored(labels: &[usize], fitness: f64) -> ScoredAssignment {
        ScoredAssignment::new(Assignment::new(labels.to_vec()), fitness)
    }

    #[test]
    fn test_rank_descending_and_stable() {
        let mut generation = Generation::new(vec![
            scored(&[0], 1.0),
            scored(&[1], 3.0),
            scored(&[2], 1.0),
            scored(&[3], 3.0),
        ]);
        generation.rank();
        let order: Vec<_> = generation
            .members()
            .iter()
            .map(|m| m.assignment().labels()[0])
            .collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(generation.best().assignment().labels(), &[1]);
    }

    #[test]
    #[should_panic(expected = "ranked")]
    fn test_best_requires_ranking() {
        let generation = Generation::new(vec![scored(&[0], 1.0)]);
        let _ = generation.best();
    }

    #[test]
    fn test_replace_discards_previous() {
        let mut generation = Generation::new(vec![scored(&[0], 1.0), scored(&[1], 2.0)]);
        generation.rank();
        generation.replace(Generation::new(vec![scored(&[2], 0.5)]));
        assert_eq!(generation.len(), 1);
        assert!(!generation.is_ranked());
    }

    #[test]
    fn test_parallel_scoring_matches_sequential() {
        let individuals: Vec<_> = (0..10)
            .map(|i| Individual::new(format!("p{i}"), [["x", "y"][i % 2]]))
            .collect();
        let catalogue = TraitCatalogue::build(&individuals, &["kind"]).unwrap();
        let evaluator =
            GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 3)
                .unwrap();
        let assignments: Vec<_> = (0..7)
            .map(|k| Assignment::new((0..10).map(|i| (i * k + i / 3) % 3).collect()))
            .collect();

        let sequential = Generation::score(vec![], assignments.clone(), &evaluator, 1);
        let parallel = Generation::score(vec![], assignments, &evaluator, 3);
        assert_eq!(sequential.members(), parallel.members());
    }

    #[test]
    fn test_score_keeps_carried_first() {
        let individuals: Vec<_> = (0..4)
            .map(|i| Individual::new(format!("p{i}"), ["same"]))
            .collect();
        let catalogue = TraitCatalogue::build(&individuals, &["kind"]).unwrap();
        let evaluator =
            GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 2)
                .unwrap();
        let carried = scored(&[0, 0, 1, 1], 99.0);
        let generation = Generation::score(
            vec![carried.clone()],
            vec![Assignment::new(vec![0, 1, 0, 1])],
            &evaluator,
            2,
        );
        assert_eq!(generation.members()[0], carried);
        assert_eq!(generation.members()[1].fitness(), 4.0);
    }
}

//! The grouping fitness function.
//!
//! # Formula
//!
//! For every group `g` in `[0, group_count)` with `size_g` members:
//!
//! ```text
//! score(g) = size_score(g) + Σ_t trait_score(g, t)
//!
//! size_score(g)     = -w_size × |size_g - ideal|        if size_g > 0
//!                   = -w_size × population_size           if size_g = 0
//! ideal             = population_size / group_count
//!
//! trait_score(g, t) = 0                                   if size_g = 0
//!                   = w_t × represented / total           if represented < total
//!                   = w_t × (1 + (1 - distance / 2))      if represented = total
//! distance          = Σ_v |count_v / size_g - proportion_v|
//! ```
//!
//! `represented` is the number of the trait's distinct values present in the group,
//! `total` the number of distinct values in the whole population, and `proportion_v`
//! the global share of value `v` from the [`TraitCatalogue`]. The L1 distance between
//! two distributions lies in `[0, 2]`, so the refinement bonus lies in `[0, 1]` and a
//! fully represented trait always outscores a partially represented one.
//!
//! An empty group scores below any non-empty group: its size penalty is larger
//! than the worst possible deviation and it represents nothing.
//!
//! The total fitness is `Σ_g score(g)`. Summation order is fixed, so identical
//! inputs yield bit-identical scores.

use fairgroup_model::{Assignment, ConfigError, Individual, TraitCatalogue};
use serde::Serialize;

use crate::{EvaluatorError, profile::GroupProfile, weights::FitnessWeights};

#[derive(Debug, Clone)]
struct TraitLayout {
    offset: usize,
    len: usize,
    weight: f64,
}

/// Per-group components of the fitness score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupScore {
    pub group: usize,
    pub size: usize,
    pub size_score: f64,
    /// One entry per trait, in catalogue order.
    pub trait_scores: Vec<f64>,
    pub total: f64,
}

/// Scores assignments of one fixed population into a fixed number of groups.
///
/// Construction encodes every individual's trait values as catalogue slots once,
/// so scoring an assignment only counts integers. The evaluator holds no mutable
/// state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct GroupingEvaluator {
    group_count: usize,
    population_size: usize,
    slot_count: usize,
    ideal_size: f64,
    size_weight: f64,
    traits: Vec<TraitLayout>,
    proportions: Vec<f64>,
    member_slots: Vec<usize>,
}

impl GroupingEvaluator {
    /// Creates an evaluator for `individuals` partitioned into `group_count` groups.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::Config`] if `group_count` is zero or larger than the
    /// population, or a weight is invalid, and [`EvaluatorError::Schema`] if the
    /// individuals do not match the catalogue.
    pub fn new(
        catalogue: &TraitCatalogue,
        individuals: &[Individual],
        weights: &FitnessWeights,
        group_count: usize,
    ) -> Result<Self, EvaluatorError> {
        let population_size = catalogue.population_size();
        if group_count == 0 {
            return Err(ConfigError::ZeroGroups.into());
        }
        if group_count > population_size {
            return Err(ConfigError::TooManyGroups {
                group_count,
                population_size,
            }
            .into());
        }

        let trait_weights = weights.resolve(catalogue)?;
        let member_slots = catalogue.encode(individuals)?;

        let traits = catalogue
            .traits()
            .iter()
            .zip(trait_weights)
            .map(|(summary, weight)| TraitLayout {
                offset: summary.offset(),
                len: summary.value_count(),
                weight,
            })
            .collect();
        let proportions = catalogue
            .traits()
            .iter()
            .flat_map(|t| t.values().iter().map(|v| v.proportion))
            .collect();

        #[expect(clippy::cast_precision_loss)]
        let ideal_size = population_size as f64 / group_count as f64;

        Ok(Self {
            group_count,
            population_size,
            slot_count: catalogue.slot_count(),
            ideal_size,
            size_weight: weights.size,
            traits,
            proportions,
            member_slots,
        })
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    #[must_use]
    pub fn ideal_size(&self) -> f64 {
        self.ideal_size
    }

    /// Builds the profile of every group.
    ///
    /// # Panics
    ///
    /// Panics if the assignment length differs from the population size or a
    /// label is not below the group count.
    #[must_use]
    pub fn profiles(&self, assignment: &Assignment) -> Vec<GroupProfile> {
        assert_eq!(assignment.len(), self.population_size);
        let trait_count = self.traits.len();
        let mut profiles = vec![GroupProfile::new(self.slot_count); self.group_count];
        for (i, &label) in assignment.labels().iter().enumerate() {
            profiles[label].insert(&self.member_slots[i * trait_count..(i + 1) * trait_count]);
        }
        profiles
    }

    /// Computes the total fitness of an assignment. Higher is better.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::profiles`].
    #[must_use]
    pub fn score(&self, assignment: &Assignment) -> f64 {
        self.profiles(assignment)
            .iter()
            .map(|profile| self.group_score(profile))
            .sum()
    }

    /// Scores a single group.
    #[must_use]
    pub fn group_score(&self, profile: &GroupProfile) -> f64 {
        let mut score = self.size_score(profile.size());
        for layout in &self.traits {
            score += self.trait_score(layout, profile);
        }
        score
    }

    /// Splits the fitness of an assignment into its per-group components.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Self::profiles`].
    #[must_use]
    pub fn breakdown(&self, assignment: &Assignment) -> Vec<GroupScore> {
        self.profiles(assignment)
            .iter()
            .enumerate()
            .map(|(group, profile)| GroupScore {
                group,
                size: profile.size(),
                size_score: self.size_score(profile.size()),
                trait_scores: self
                    .traits
                    .iter()
                    .map(|layout| self.trait_score(layout, profile))
                    .collect(),
                total: self.group_score(profile),
            })
            .collect()
    }

    #[expect(clippy::cast_precision_loss)]
    fn size_score(&self, size: usize) -> f64 {
        let deviation = if size == 0 {
            self.population_size as f64
        } else {
            (size as f64 - self.ideal_size).abs()
        };
        0.0 - self.size_weight * deviation
    }

    #[expect(clippy::cast_precision_loss)]
    fn trait_score(&self, layout: &TraitLayout, profile: &GroupProfile) -> f64 {
        if profile.is_empty() || layout.len == 0 {
            return 0.0;
        }

        let represented = profile.represented(layout.offset, layout.len);
        if represented < layout.len {
            return layout.weight * represented as f64 / layout.len as f64;
        }

        let size = profile.size() as f64;
        let global = &self.proportions[layout.offset..layout.offset + layout.len];
        let distance: f64 = profile
            .trait_counts(layout.offset, layout.len)
            .iter()
            .zip(global)
            .map(|(&count, &proportion)| (count as f64 / size - proportion).abs())
            .sum();
        let bonus = (1.0 - distance / 2.0).max(0.0);
        layout.weight * (1.0 + bonus)
    }
}

/// Scores one assignment without keeping an evaluator around.
///
/// Prefer [`GroupingEvaluator`] when scoring many assignments of the same population.
///
/// # Errors
///
/// Same conditions as [`GroupingEvaluator::new`].
///
/// # Panics
///
/// Same conditions as [`GroupingEvaluator::profiles`].
pub fn score_assignment(
    assignment: &Assignment,
    individuals: &[Individual],
    catalogue: &TraitCatalogue,
    weights: &FitnessWeights,
    group_count: usize,
) -> Result<f64, EvaluatorError> {
    let evaluator = GroupingEvaluator::new(catalogue, individuals, weights, group_count)?;
    Ok(evaluator.score(assignment))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Disciplines A, B, C at indices 0-3, 4-7, 8-11; genders f f m m repeating.
    fn twelve() -> Vec<Individual> {
        (0..12)
            .map(|i| {
                let discipline = ["A", "B", "C"][i / 4];
                let gender = if i % 4 < 2 { "f" } else { "m" };
                Individual::new(format!("p{i}"), [gender, discipline])
            })
            .collect()
    }

    fn evaluator(individuals: &[Individual], group_count: usize) -> GroupingEvaluator {
        let catalogue = TraitCatalogue::build(individuals, &["gender", "discipline"]).unwrap();
        GroupingEvaluator::new(
            &catalogue,
            individuals,
            &FitnessWeights::default(),
            group_count,
        )
        .unwrap()
    }

    #[test]
    fn test_score_is_deterministic() {
        let individuals = twelve();
        let evaluator = evaluator(&individuals, 3);
        let assignment = Assignment::new(vec![0, 1, 2, 2, 1, 0, 0, 1, 1, 2, 0, 2]);
        let first = evaluator.score(&assignment);
        for _ in 0..10 {
            assert_eq!(evaluator.score(&assignment).to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_balanced_beats_skewed() {
        let individuals = twelve();
        let evaluator = evaluator(&individuals, 2);

        // even indices: f m f m f m / A A B B C C
        let balanced = Assignment::new((0..12).map(|i| i % 2).collect());
        // first half: A A A A B B, second half: B B C C C C
        let skewed = Assignment::new((0..12).map(|i| i / 6).collect());

        let balanced_score = evaluator.score(&balanced);
        assert!((balanced_score - 8.0).abs() < 1e-12);
        assert!(balanced_score > evaluator.score(&skewed));
    }

    #[test]
    fn test_proportional_beats_disproportional() {
        let individuals: Vec<_> = (0..12)
            .map(|i| Individual::new(format!("p{i}"), [["A", "B", "C"][i / 4]]))
            .collect();
        let catalogue = TraitCatalogue::build(&individuals, &["discipline"]).unwrap();
        let evaluator =
            GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 2)
                .unwrap();

        // A A B B C C | A A B B C C
        let even = Assignment::new(vec![0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1]);
        // A A A B C C | A B B B C C
        let uneven = Assignment::new(vec![0, 0, 0, 1, 0, 1, 1, 1, 0, 0, 1, 1]);

        let even_score = evaluator.score(&even);
        let uneven_score = evaluator.score(&uneven);
        assert!((even_score - 4.0).abs() < 1e-12);
        assert!(even_score > uneven_score);
        // both groups still represent every discipline
        assert!(uneven_score > 3.0);
    }

    #[test]
    fn test_partial_representation_gets_partial_credit() {
        let individuals: Vec<_> = (0..12)
            .map(|i| Individual::new(format!("p{i}"), [["A", "B", "C"][i / 4]]))
            .collect();
        let catalogue = TraitCatalogue::build(&individuals, &["discipline"]).unwrap();
        let evaluator =
            GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 3)
                .unwrap();

        // one discipline per group
        let assignment = Assignment::new((0..12).map(|i| i / 4).collect());
        for group in evaluator.breakdown(&assignment) {
            assert_eq!(group.size, 4);
            assert_eq!(group.size_score, 0.0);
            assert!((group.trait_scores[0] - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ideal_size_has_no_negative_zero() {
        let individuals = twelve();
        let evaluator = evaluator(&individuals, 2);
        let assignment = Assignment::new((0..12).map(|i| i % 2).collect());
        for group in evaluator.breakdown(&assignment) {
            assert!(group.size_score.is_sign_positive(), "{}", group.size_score);
            assert_eq!(format!("{:.3}", group.size_score), "0.000");
        }
    }

    #[test]
    fn test_empty_group_scores_minimally() {
        let individuals = twelve();
        let evaluator = evaluator(&individuals, 3);
        let assignment = Assignment::new((0..12).map(|i| i % 2).collect());

        let score = evaluator.score(&assignment);
        assert!(score.is_finite());

        let breakdown = evaluator.breakdown(&assignment);
        let empty = &breakdown[2];
        assert_eq!(empty.size, 0);
        assert_eq!(empty.size_score, -120.0);
        assert_eq!(empty.trait_scores, vec![0.0, 0.0]);
        assert!(breakdown[..2].iter().all(|g| g.total > empty.total));
    }

    #[test]
    fn test_breakdown_sums_to_score() {
        let individuals = twelve();
        let evaluator = evaluator(&individuals, 3);
        let assignment = Assignment::new(vec![0, 0, 1, 2, 1, 1, 0, 2, 2, 0, 1, 1]);
        let total: f64 = evaluator.breakdown(&assignment).iter().map(|g| g.total).sum();
        assert!((total - evaluator.score(&assignment)).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_group_count() {
        let individuals = twelve();
        let catalogue = TraitCatalogue::build(&individuals, &["gender", "discipline"]).unwrap();
        let weights = FitnessWeights::default();
        assert_eq!(
            GroupingEvaluator::new(&catalogue, &individuals, &weights, 0).unwrap_err(),
            EvaluatorError::Config(ConfigError::ZeroGroups)
        );
        assert!(matches!(
            GroupingEvaluator::new(&catalogue, &individuals, &weights, 13),
            Err(EvaluatorError::Config(ConfigError::TooManyGroups { .. }))
        ));
    }

    #[test]
    fn test_score_assignment_matches_evaluator() {
        let individuals = twelve();
        let catalogue = TraitCatalogue::build(&individuals, &["gender", "discipline"]).unwrap();
        let weights = FitnessWeights::default().with_trait("gender", 6.0);
        let assignment = Assignment::new((0..12).map(|i| i % 3).collect());
        let direct =
            score_assignment(&assignment, &individuals, &catalogue, &weights, 3).unwrap();
        let evaluator = GroupingEvaluator::new(&catalogue, &individuals, &weights, 3).unwrap();
        assert_eq!(direct.to_bits(), evaluator.score(&assignment).to_bits());
    }
}

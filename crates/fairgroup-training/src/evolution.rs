//! The generational loop.
//!
//! [`Evolution`] is a small state machine:
//!
//! ```text
//! Initializing → Evaluating → Selecting → Reproducing ─┐
//!                    ↑                                  │
//!                    └──────────────────────────────────┘
//!                    ↓ (generation limit or stagnation)
//!                Terminated
//! ```
//!
//! - **Initializing** builds the first generation from the caller's starting
//!   assignments, topped up with random ones
//! - **Evaluating** scores and ranks the generation, tracks the best-ever member and
//!   decides whether to stop
//! - **Selecting** takes the breeding pool from the ranked generation
//! - **Reproducing** builds the next generation's members (elites and children)
//!
//! The driver keeps the best assignment ever observed, independently of elitism,
//! and returns it in the [`EvolutionOutcome`].
//!
//! # Example
//!
//! ```
//! use fairgroup_evaluator::{group_evaluator::GroupingEvaluator, weights::FitnessWeights};
//! use fairgroup_model::{Individual, TraitCatalogue};
//! use fairgroup_training::{config::EvolutionConfig, evolution::Evolution};
//!
//! let individuals: Vec<_> = (0..8)
//!     .map(|i| Individual::new(format!("p{i}"), [["dev", "ops"][i % 2]]))
//!     .collect();
//! let catalogue = TraitCatalogue::build(&individuals, &["discipline"]).unwrap();
//! let evaluator =
//!     GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 2).unwrap();
//!
//! let config = EvolutionConfig {
//!     generation_size: 20,
//!     max_generations: 30,
//!     seed: Some(1),
//!     ..EvolutionConfig::default()
//! };
//! let outcome = Evolution::new(config, &evaluator).unwrap().run();
//! assert_eq!(outcome.best.assignment().group_sizes(2), vec![4, 4]);
//! ```

use fairgroup_evaluator::group_evaluator::GroupingEvaluator;
use fairgroup_model::{Assignment, ConfigError};
use fairgroup_stats::descriptive::DescriptiveStats;
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    config::EvolutionConfig,
    genetic::{Generation, ScoredAssignment},
    operators::{self, Reproduction},
};

/// Observable state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionState {
    Initializing,
    Evaluating,
    Selecting,
    Reproducing,
    Terminated,
}

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    /// `max_generations` reproduction rounds were run.
    GenerationLimit,
    /// The best score did not improve for `stagnation_limit` generations.
    Stagnation,
}

/// Progress after one generation has been evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    /// Zero-based index; generation 0 is the initial one.
    pub generation: usize,
    pub best_fitness: f64,
    pub best_ever_fitness: f64,
    /// Consecutive generations without a new best-ever score.
    pub stagnant_generations: usize,
    pub fitness: Option<DescriptiveStats>,
}

/// Result of a finished search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionOutcome {
    /// Best assignment observed across all generations.
    pub best: ScoredAssignment,
    /// Number of generations evaluated, including the initial one.
    pub generations: usize,
    pub termination: TerminationReason,
    /// Seed of the default generator; `None` when the caller supplied the generator.
    pub seed: Option<u64>,
}

#[derive(Debug)]
enum Stage {
    Initializing,
    Evaluating {
        carried: Vec<ScoredAssignment>,
        fresh: Vec<Assignment>,
    },
    Selecting,
    Reproducing {
        pool_size: usize,
    },
    Terminated {
        reason: TerminationReason,
        best: ScoredAssignment,
    },
}

/// Genetic search for a fair grouping.
#[derive(Debug)]
pub struct Evolution<'a, R = Pcg32> {
    config: EvolutionConfig,
    evaluator: &'a GroupingEvaluator,
    rng: R,
    seed: Option<u64>,
    initial: Vec<Assignment>,
    stage: Stage,
    generation: Option<Generation>,
    evaluated: usize,
    best: Option<ScoredAssignment>,
    stagnant: usize,
}

impl<'a> Evolution<'a, Pcg32> {
    /// Creates a driver using a [`Pcg32`] seeded from `config.seed`.
    ///
    /// Without a configured seed, one is drawn from the thread-local generator and
    /// reported in the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(
        config: EvolutionConfig,
        evaluator: &'a GroupingEvaluator,
    ) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut this = Self::with_rng(config, evaluator, Pcg32::seed_from_u64(seed))?;
        this.seed = Some(seed);
        Ok(this)
    }
}

impl<'a, R> Evolution<'a, R>
where
    R: Rng,
{
    /// Creates a driver drawing all randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_rng(
        config: EvolutionConfig,
        evaluator: &'a GroupingEvaluator,
        rng: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            evaluator,
            rng,
            seed: None,
            initial: vec![],
            stage: Stage::Initializing,
            generation: None,
            evaluated: 0,
            best: None,
            stagnant: 0,
        })
    }

    /// Places the given assignments at the front of the initial generation.
    ///
    /// Assignments beyond the generation size are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidInitialAssignment`] if an assignment does not
    /// fit the population or the group count.
    pub fn with_initial_assignments(
        mut self,
        mut initial: Vec<Assignment>,
    ) -> Result<Self, ConfigError> {
        for (index, assignment) in initial.iter().enumerate() {
            assignment
                .validate(
                    self.evaluator.population_size(),
                    self.evaluator.group_count(),
                )
                .map_err(|source| ConfigError::InvalidInitialAssignment { index, source })?;
        }
        if initial.len() > self.config.generation_size {
            log::warn!(
                "{} initial assignments given, keeping the first {}",
                initial.len(),
                self.config.generation_size
            );
            initial.truncate(self.config.generation_size);
        }
        self.initial = initial;
        Ok(self)
    }

    #[must_use]
    pub fn state(&self) -> EvolutionState {
        match self.stage {
            Stage::Initializing => EvolutionState::Initializing,
            Stage::Evaluating { .. } => EvolutionState::Evaluating,
            Stage::Selecting => EvolutionState::Selecting,
            Stage::Reproducing { .. } => EvolutionState::Reproducing,
            Stage::Terminated { .. } => EvolutionState::Terminated,
        }
    }

    /// The most recently evaluated generation, ranked best first.
    #[must_use]
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    /// Best member observed so far.
    #[must_use]
    pub fn best(&self) -> Option<&ScoredAssignment> {
        self.best.as_ref()
    }

    /// Advances the state machine by one state.
    ///
    /// Returns a report when the step evaluated a generation. Stepping a terminated
    /// driver does nothing.
    pub fn step(&mut self) -> Option<GenerationReport> {
        match std::mem::replace(&mut self.stage, Stage::Selecting) {
            Stage::Initializing => {
                self.stage = self.initialize();
                None
            }
            Stage::Evaluating { carried, fresh } => Some(self.evaluate(carried, fresh)),
            Stage::Selecting => {
                self.stage = match &self.generation {
                    Some(generation) => Stage::Reproducing {
                        pool_size: operators::select(generation, self.config.selection_rate)
                            .len(),
                    },
                    None => Stage::Initializing,
                };
                None
            }
            Stage::Reproducing { pool_size } => {
                self.stage = self.reproduce(pool_size);
                None
            }
            terminated @ Stage::Terminated { .. } => {
                self.stage = terminated;
                None
            }
        }
    }

    /// Runs the search to completion.
    #[must_use]
    pub fn run(self) -> EvolutionOutcome {
        self.run_with(|_| {})
    }

    /// Runs the search to completion, calling `observer` after every evaluated generation.
    pub fn run_with<F>(mut self, mut observer: F) -> EvolutionOutcome
    where
        F: FnMut(&GenerationReport),
    {
        loop {
            if let Some(report) = self.step() {
                observer(&report);
            }
            if let Stage::Terminated { reason, best } = self.stage {
                log::info!(
                    "evolution finished after {} generations ({reason:?}), best fitness {:.5}",
                    self.evaluated,
                    best.fitness()
                );
                return EvolutionOutcome {
                    best,
                    generations: self.evaluated,
                    termination: reason,
                    seed: self.seed,
                };
            }
        }
    }

    fn initialize(&mut self) -> Stage {
        let population_size = self.evaluator.population_size();
        let group_count = self.evaluator.group_count();
        log::info!(
            "starting evolution: {population_size} individuals into {group_count} groups, \
             generation size {}, seed {:?}",
            self.config.generation_size,
            self.seed
        );

        let mut fresh = std::mem::take(&mut self.initial);
        while fresh.len() < self.config.generation_size {
            fresh.push(operators::random_assignment(
                &mut self.rng,
                population_size,
                group_count,
            ));
        }
        Stage::Evaluating {
            carried: vec![],
            fresh,
        }
    }

    fn evaluate(
        &mut self,
        carried: Vec<ScoredAssignment>,
        fresh: Vec<Assignment>,
    ) -> GenerationReport {
        let mut next =
            Generation::score(carried, fresh, self.evaluator, self.config.thread_count());
        next.rank();
        let generation_best = next.best().clone();
        let fitness = next.fitness_stats();
        match &mut self.generation {
            Some(generation) => generation.replace(next),
            None => self.generation = Some(next),
        }

        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| generation_best.fitness() > best.fitness());
        if improved {
            self.best = Some(generation_best.clone());
            self.stagnant = 0;
        } else {
            self.stagnant += 1;
        }

        let generation_best_fitness = generation_best.fitness();
        let index = self.evaluated;
        self.evaluated += 1;
        let best_ever = self.best.clone().unwrap_or(generation_best);
        let report = GenerationReport {
            generation: index,
            best_fitness: generation_best_fitness,
            best_ever_fitness: best_ever.fitness(),
            stagnant_generations: self.stagnant,
            fitness,
        };
        log::debug!(
            "generation {index:>4}: best {:.5}, best ever {:.5}, stagnant {}",
            report.best_fitness,
            report.best_ever_fitness,
            report.stagnant_generations
        );

        self.stage = if index >= self.config.max_generations {
            Stage::Terminated {
                reason: TerminationReason::GenerationLimit,
                best: best_ever,
            }
        } else if self
            .config
            .stagnation_limit
            .is_some_and(|limit| self.stagnant >= limit)
        {
            Stage::Terminated {
                reason: TerminationReason::Stagnation,
                best: best_ever,
            }
        } else {
            Stage::Selecting
        };
        report
    }

    fn reproduce(&mut self, pool_size: usize) -> Stage {
        let Some(generation) = &self.generation else {
            return Stage::Initializing;
        };
        let params = Reproduction {
            generation_size: self.config.generation_size,
            elite_count: self.config.elite_count,
            crossover_rate: self.config.crossover_rate,
            mutation_rate: self.config.mutation_rate,
            group_count: self.evaluator.group_count(),
        };
        let pool = &generation.members()[..pool_size];
        let (carried, fresh) = params.reproduce(generation, pool, &mut self.rng);
        Stage::Evaluating { carried, fresh }
    }
}

#[cfg(test)]
mod tests {
    use fairgroup_evaluator::weights::FitnessWeights;
    use fairgroup_model::{Individual, TraitCatalogue};

    use super::*;

    fn disciplines() -> Vec<Individual> {
        (0..12)
            .map(|i| Individual::new(format!("p{i}"), [["A", "B", "C"][i / 4]]))
            .collect()
    }

    fn evaluator(individuals: &[Individual], group_count: usize) -> GroupingEvaluator {
        let catalogue = TraitCatalogue::build(individuals, &["discipline"]).unwrap();
        GroupingEvaluator::new(
            &catalogue,
            individuals,
            &FitnessWeights::default(),
            group_count,
        )
        .unwrap()
    }

    fn config(seed: u64) -> EvolutionConfig {
        EvolutionConfig {
            generation_size: 30,
            max_generations: 40,
            seed: Some(seed),
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_zero_generations_evaluates_initial_only() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 2);
        let config = EvolutionConfig {
            max_generations: 0,
            ..config(1)
        };
        let mut reports = vec![];
        let outcome = Evolution::new(config, &evaluator)
            .unwrap()
            .run_with(|r| reports.push(r.clone()));
        assert_eq!(outcome.generations, 1);
        assert_eq!(outcome.termination, TerminationReason::GenerationLimit);
        assert_eq!(reports.len(), 1);
        assert_eq!(outcome.best.fitness(), reports[0].best_fitness);
    }

    #[test]
    fn test_best_never_decreases_with_elitism() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 3);
        let mut bests = vec![];
        let outcome = Evolution::new(config(7), &evaluator)
            .unwrap()
            .run_with(|r| bests.push(r.best_fitness));
        assert_eq!(bests.len(), 41);
        assert!(bests.windows(2).all(|w| w[1] >= w[0]), "{bests:?}");
        assert_eq!(outcome.best.fitness(), *bests.last().unwrap());
    }

    #[test]
    fn test_best_ever_tracked_without_elitism() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 3);
        let config = EvolutionConfig {
            elite_count: 0,
            mutation_rate: 1.0,
            ..config(11)
        };
        let mut bests = vec![];
        let outcome = Evolution::new(config, &evaluator)
            .unwrap()
            .run_with(|r| bests.push(r.best_fitness));
        let max = bests.iter().copied().fold(f64::MIN, f64::max);
        assert_eq!(outcome.best.fitness(), max);
        assert_eq!(outcome.best.fitness(), evaluator.score(outcome.best.assignment()));
    }

    #[test]
    fn test_stagnation_stops_early() {
        let individuals: Vec<_> = (0..4)
            .map(|i| Individual::new(format!("p{i}"), ["same"]))
            .collect();
        // a single group: every assignment scores the same
        let evaluator = evaluator(&individuals, 1);
        let config = EvolutionConfig {
            max_generations: 1000,
            stagnation_limit: Some(3),
            ..config(3)
        };
        let outcome = Evolution::new(config, &evaluator).unwrap().run();
        assert_eq!(outcome.termination, TerminationReason::Stagnation);
        assert_eq!(outcome.generations, 4);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 3);
        let a = Evolution::new(config(5), &evaluator).unwrap().run();
        let b = Evolution::new(config(5), &evaluator).unwrap().run();
        assert_eq!(a, b);
        assert_eq!(a.seed, Some(5));
    }

    #[test]
    fn test_state_transitions() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 2);
        let mut evolution = Evolution::new(config(9), &evaluator).unwrap();
        assert_eq!(evolution.state(), EvolutionState::Initializing);
        assert!(evolution.step().is_none());
        assert_eq!(evolution.state(), EvolutionState::Evaluating);
        let report = evolution.step().unwrap();
        assert_eq!(report.generation, 0);
        assert_eq!(evolution.state(), EvolutionState::Selecting);
        assert!(evolution.generation().unwrap().is_ranked());
        assert!(evolution.step().is_none());
        assert_eq!(evolution.state(), EvolutionState::Reproducing);
        assert!(evolution.step().is_none());
        assert_eq!(evolution.state(), EvolutionState::Evaluating);
        let report = evolution.step().unwrap();
        assert_eq!(report.generation, 1);
        assert_eq!(evolution.generation().unwrap().len(), 30);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 2);

        let bad_rate = EvolutionConfig {
            crossover_rate: 2.0,
            ..config(1)
        };
        assert!(matches!(
            Evolution::new(bad_rate, &evaluator),
            Err(ConfigError::RateOutOfRange { .. })
        ));

        let short = Assignment::new(vec![0; 11]);
        let err = Evolution::new(config(1), &evaluator)
            .unwrap()
            .with_initial_assignments(vec![short])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidInitialAssignment { index: 0, .. }
        ));
    }

    #[test]
    fn test_balances_uneven_starting_assignment() {
        let individuals = disciplines();
        let evaluator = evaluator(&individuals, 2);

        // A A A A B B | B B C C C C
        let start = Assignment::new((0..12).map(|i| i / 6).collect());
        let start_score = evaluator.score(&start);

        let config = EvolutionConfig {
            generation_size: 40,
            max_generations: 100,
            seed: Some(2024),
            ..EvolutionConfig::default()
        };
        let outcome = Evolution::new(config, &evaluator)
            .unwrap()
            .with_initial_assignments(vec![start])
            .unwrap()
            .run();

        assert!(outcome.best.fitness() > start_score);
        let best = outcome.best.assignment();
        assert_eq!(best.group_sizes(2), vec![6, 6]);
        for group in evaluator.breakdown(best) {
            // every discipline is present in every group
            assert!(group.trait_scores[0] >= 1.0, "{group:?}");
        }
    }
}

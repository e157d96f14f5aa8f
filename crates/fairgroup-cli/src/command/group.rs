use std::{num::NonZeroUsize, path::PathBuf};

use chrono::Utc;
use fairgroup_training::evolution::{Evolution, GenerationReport};

use crate::{
    command::settings::{self, OutputFormat, SettingsArg},
    report,
    schema::{config::GroupingConfig, report::GroupingReport},
    util::Output,
};

const DEFAULT_PROGRESS_EVERY: usize = 10;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GroupArg {
    #[clap(flatten)]
    settings: SettingsArg,
    /// Number of groups to form
    #[arg(long, short)]
    groups: Option<usize>,
    /// Candidate assignments per generation
    #[arg(long)]
    generation_size: Option<usize>,
    /// Share of each generation kept for breeding, in (0, 1]
    #[arg(long)]
    selection_rate: Option<f64>,
    /// Probability of single-point crossover per child, in [0, 1]
    #[arg(long)]
    crossover_rate: Option<f64>,
    /// Probability of relabelling one individual per child, in [0, 1]
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Number of generations to breed
    #[arg(long)]
    max_generations: Option<usize>,
    /// Stop after this many generations without improvement
    #[arg(long)]
    stagnation_limit: Option<usize>,
    /// Best assignments carried unchanged into the next generation
    #[arg(long)]
    elite_count: Option<usize>,
    /// Random seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads for fitness evaluation
    #[arg(long)]
    threads: Option<NonZeroUsize>,
    /// Log progress every N generations [default: 10]
    #[arg(long)]
    progress_every: Option<usize>,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl GroupArg {
    fn apply(&self, config: &mut GroupingConfig) {
        if let Some(groups) = self.groups {
            config.group_count = groups;
        }
        let evolution = &mut config.evolution;
        override_with(&mut evolution.generation_size, self.generation_size);
        override_with(&mut evolution.selection_rate, self.selection_rate);
        override_with(&mut evolution.crossover_rate, self.crossover_rate);
        override_with(&mut evolution.mutation_rate, self.mutation_rate);
        override_with(&mut evolution.max_generations, self.max_generations);
        override_with(&mut evolution.elite_count, self.elite_count);
        if self.stagnation_limit.is_some() {
            evolution.stagnation_limit = self.stagnation_limit;
        }
        if self.seed.is_some() {
            evolution.seed = self.seed;
        }
        if self.threads.is_some() {
            evolution.evaluation_threads = self.threads;
        }
    }
}

fn override_with<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

pub(crate) fn run(arg: &GroupArg) -> anyhow::Result<()> {
    let mut config = arg.settings.load_config()?;
    arg.apply(&mut config);
    let GroupingConfig {
        group_count,
        evolution,
        weights,
    } = config;

    let (individuals, catalogue) = arg.settings.load_population()?;
    let evaluator = settings::build_evaluator(&catalogue, &individuals, &weights, group_count)?;

    let progress_every = arg.progress_every.unwrap_or(DEFAULT_PROGRESS_EVERY).max(1);
    let max_generations = evolution.max_generations;
    let outcome = Evolution::new(evolution, &evaluator)?.run_with(|report| {
        if report.generation % progress_every == 0 || report.generation == max_generations {
            log_progress(report);
        }
    });

    let best = outcome.best.assignment();
    let breakdown = evaluator.breakdown(best);
    log::info!(
        "Best fitness {:.5} after {} generations ({:?}, seed {})",
        outcome.best.fitness(),
        outcome.generations,
        outcome.termination,
        outcome
            .seed
            .map_or_else(|| "n/a".to_owned(), |s| s.to_string())
    );

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        OutputFormat::Text => {
            report::write_groups(&mut output, &individuals, best, &breakdown)?;
            output.finish()?;
        }
        OutputFormat::Json => {
            let grouping = GroupingReport {
                generated_at: Utc::now(),
                group_count,
                fitness: outcome.best.fitness(),
                generations: outcome.generations,
                termination: outcome.termination,
                seed: outcome.seed,
                groups: report::group_reports(&individuals, &catalogue, best, &breakdown),
                assignment: best.clone(),
            };
            output.write_json(&grouping)?;
        }
    }
    if let Some(path) = &arg.output {
        log::info!("Grouping saved to {}", path.display());
    }
    Ok(())
}

fn log_progress(report: &GenerationReport) {
    match &report.fitness {
        Some(stats) => log::info!(
            "Gen {:>4} - best: {:.5} - mean: {:.5} - std dev: {:.5}",
            report.generation,
            report.best_fitness,
            stats.mean,
            stats.std_dev
        ),
        None => log::info!(
            "Gen {:>4} - best: {:.5}",
            report.generation,
            report.best_fitness
        ),
    }
}

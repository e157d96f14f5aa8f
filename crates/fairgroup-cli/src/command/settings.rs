use std::path::PathBuf;

use anyhow::Context as _;
use fairgroup_evaluator::{group_evaluator::GroupingEvaluator, weights::FitnessWeights};
use fairgroup_model::{Individual, TraitCatalogue};

use crate::{
    input::{self, TRAIT_NAMES},
    schema::config::GroupingConfig,
    util,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Input table and fitness weights shared by every subcommand.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SettingsArg {
    /// CSV input file (reads stdin when omitted)
    #[arg(long, short)]
    pub(crate) input: Option<PathBuf>,
    /// JSON file with group count, evolution parameters and weights
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Weight of a trait, as NAME=WEIGHT (repeatable)
    #[arg(long = "weight", value_parser = parse_weight)]
    pub(crate) weights: Vec<(String, f64)>,
    /// Weight of the group size balance
    #[arg(long)]
    pub(crate) size_weight: Option<f64>,
}

impl SettingsArg {
    /// Loads the config file, if any, and applies the weight flags on top of it.
    pub(crate) fn load_config(&self) -> anyhow::Result<GroupingConfig> {
        let mut config: GroupingConfig = match &self.config {
            Some(path) => util::read_json_file("config", path)?,
            None => GroupingConfig::default(),
        };
        apply_weights(&mut config.weights, self.size_weight, &self.weights);
        Ok(config)
    }

    pub(crate) fn load_population(&self) -> anyhow::Result<(Vec<Individual>, TraitCatalogue)> {
        let reader = util::open_input(self.input.as_deref())?;
        let individuals = input::read_individuals(reader)?;
        let catalogue =
            TraitCatalogue::build(&individuals, &TRAIT_NAMES).context("Invalid input table")?;
        Ok((individuals, catalogue))
    }
}

pub(crate) fn build_evaluator(
    catalogue: &TraitCatalogue,
    individuals: &[Individual],
    weights: &FitnessWeights,
    group_count: usize,
) -> anyhow::Result<GroupingEvaluator> {
    GroupingEvaluator::new(catalogue, individuals, weights, group_count)
        .context("Invalid grouping parameters")
}

fn apply_weights(weights: &mut FitnessWeights, size: Option<f64>, traits: &[(String, f64)]) {
    if let Some(size) = size {
        weights.size = size;
    }
    for (name, weight) in traits {
        weights.traits.insert(name.clone(), *weight);
    }
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (name, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=WEIGHT, got '{s}'"))?;
    let weight = weight
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{weight}': {e}"))?;
    Ok((name.trim().to_owned(), weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("gender=6"), Ok(("gender".to_owned(), 6.0)));
        assert_eq!(parse_weight(" team = 0.5"), Ok(("team".to_owned(), 0.5)));
        assert!(parse_weight("gender").is_err());
        assert!(parse_weight("gender=lots").is_err());
    }

    #[test]
    fn test_flags_override_config_weights() {
        let mut weights = GroupingConfig::default().weights;
        apply_weights(&mut weights, Some(2.0), &[("gender".to_owned(), 1.0)]);
        assert_eq!(weights.size, 2.0);
        assert_eq!(weights.traits["gender"], 1.0);
        assert_eq!(weights.traits["discipline"], 3.0);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("Text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
    }
}

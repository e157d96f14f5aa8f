use fairgroup_evaluator::weights::FitnessWeights;
use fairgroup_training::config::EvolutionConfig;
use serde::{Deserialize, Serialize};

/// Number of groups when neither the config file nor the command line sets one.
pub const DEFAULT_GROUP_COUNT: usize = 9;

/// Contents of a `--config` JSON file.
///
/// Every field is optional; missing fields take the values of [`Default`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub group_count: usize,
    pub evolution: EvolutionConfig,
    pub weights: FitnessWeights,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            group_count: DEFAULT_GROUP_COUNT,
            evolution: EvolutionConfig::default(),
            weights: default_weights(),
        }
    }
}

/// Gender balance matters most, then discipline, then the rest equally.
fn default_weights() -> FitnessWeights {
    FitnessWeights::default()
        .with_trait("gender", 6.0)
        .with_trait("discipline", 3.0)
        .with_trait("seniority", 1.0)
        .with_trait("client", 1.0)
        .with_trait("team", 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GroupingConfig = serde_json::from_str(
            r#"{"group_count": 4, "evolution": {"max_generations": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.group_count, 4);
        assert_eq!(config.evolution.max_generations, 10);
        assert_eq!(config.evolution.generation_size, 150);
        assert_eq!(config.weights, default_weights());
    }

    #[test]
    fn test_weights_section_replaces_defaults() {
        let config: GroupingConfig =
            serde_json::from_str(r#"{"weights": {"size": 5, "traits": {"team": 2}}}"#).unwrap();
        assert_eq!(config.weights.size, 5.0);
        assert_eq!(config.weights.traits.len(), 1);
        assert_eq!(config.weights.traits["team"], 2.0);
    }
}

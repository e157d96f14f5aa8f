//! Relative importance of the fitness components.

use std::collections::BTreeMap;

use fairgroup_model::{ConfigError, TraitCatalogue};
use serde::{Deserialize, Serialize};

/// Weight applied to traits that have no explicit entry.
pub const DEFAULT_TRAIT_WEIGHT: f64 = 1.0;

/// Weight applied to the group size component by default.
pub const DEFAULT_SIZE_WEIGHT: f64 = 10.0;

/// Multipliers for the size component and for each trait component.
///
/// Traits are addressed by name; a trait without an entry weighs
/// [`DEFAULT_TRAIT_WEIGHT`]. A weight of zero disables a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub size: f64,
    pub traits: BTreeMap<String, f64>,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE_WEIGHT,
            traits: BTreeMap::new(),
        }
    }
}

impl FitnessWeights {
    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.traits.insert(name.into(), weight);
        self
    }

    /// Returns the trait weights in catalogue order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a weight is negative or not finite, or names a
    /// trait the catalogue does not know.
    pub fn resolve(&self, catalogue: &TraitCatalogue) -> Result<Vec<f64>, ConfigError> {
        check_weight("group size", self.size)?;
        for (name, &weight) in &self.traits {
            if catalogue.get(name).is_none() {
                return Err(ConfigError::UnknownTrait { name: name.clone() });
            }
            check_weight(name, weight)?;
        }
        Ok(catalogue
            .traits()
            .iter()
            .map(|t| {
                self.traits
                    .get(t.name())
                    .copied()
                    .unwrap_or(DEFAULT_TRAIT_WEIGHT)
            })
            .collect())
    }
}

fn check_weight(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight {
            name: name.to_owned(),
            value,
        })
    }
}

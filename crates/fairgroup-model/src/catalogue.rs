//! Global trait distributions used as the fairness reference.
//!
//! A [`TraitCatalogue`] is built once from the whole population. For every declared
//! trait it records the distinct values observed and the share of the population
//! holding each value. Distinct values are kept in lexicographic order so that the
//! catalogue, and everything indexed by it, is identical across runs.
//!
//! # Slots
//!
//! Every (trait, value) pair is given a *slot*: a dense index into a flat array of
//! length [`TraitCatalogue::slot_count`]. Slots of one trait are contiguous and start
//! at [`TraitSummary::offset`]. The evaluator counts group members per slot instead
//! of hashing strings.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{Individual, SchemaError};

/// One distinct value of a trait together with its global frequency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitValue {
    pub label: String,
    pub count: usize,
    /// `count / population_size`
    pub proportion: f64,
}

/// Distribution of a single trait over the whole population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitSummary {
    name: String,
    offset: usize,
    values: Vec<TraitValue>,
}

impl TraitSummary {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First slot of this trait in the flat slot layout.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Distinct values, sorted by label.
    #[must_use]
    pub fn values(&self) -> &[TraitValue] {
        &self.values
    }

    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn value_index(&self, label: &str) -> Option<usize> {
        self.values
            .binary_search_by(|v| v.label.as_str().cmp(label))
            .ok()
    }
}

/// Read-only summary of every trait's value distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraitCatalogue {
    population_size: usize,
    slot_count: usize,
    traits: Vec<TraitSummary>,
}

impl TraitCatalogue {
    /// Builds the catalogue from the full population.
    ///
    /// Trait `i` of `trait_names` is read from position `i` of each individual's
    /// trait values; extra values beyond the declared traits are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the population is empty, a trait name is declared
    /// twice, or any individual lacks a declared trait or has an empty value for it.
    pub fn build<S>(individuals: &[Individual], trait_names: &[S]) -> Result<Self, SchemaError>
    where
        S: AsRef<str>,
    {
        if individuals.is_empty() {
            return Err(SchemaError::EmptyPopulation);
        }

        let mut seen = HashSet::new();
        for name in trait_names {
            if !seen.insert(name.as_ref()) {
                return Err(SchemaError::DuplicateTrait {
                    name: name.as_ref().to_owned(),
                });
            }
        }

        let mut histograms = vec![BTreeMap::<&str, usize>::new(); trait_names.len()];
        for ind in individuals {
            for (i, name) in trait_names.iter().enumerate() {
                let value = ind
                    .trait_value(i)
                    .ok_or_else(|| SchemaError::MissingTrait {
                        individual: ind.id().to_owned(),
                        trait_name: name.as_ref().to_owned(),
                    })?;
                if value.trim().is_empty() {
                    return Err(SchemaError::EmptyTraitValue {
                        individual: ind.id().to_owned(),
                        trait_name: name.as_ref().to_owned(),
                    });
                }
                *histograms[i].entry(value).or_insert(0) += 1;
            }
        }

        #[expect(clippy::cast_precision_loss)]
        let total = individuals.len() as f64;
        let mut offset = 0;
        let traits = trait_names
            .iter()
            .zip(histograms)
            .map(|(name, histogram)| {
                if histogram.len() == 1 {
                    log::warn!(
                        "trait '{}' has a single value across the population",
                        name.as_ref()
                    );
                }
                let values = histogram
                    .into_iter()
                    .map(|(label, count)| {
                        #[expect(clippy::cast_precision_loss)]
                        let proportion = count as f64 / total;
                        TraitValue {
                            label: label.to_owned(),
                            count,
                            proportion,
                        }
                    })
                    .collect::<Vec<_>>();
                let summary = TraitSummary {
                    name: name.as_ref().to_owned(),
                    offset,
                    values,
                };
                offset += summary.value_count();
                summary
            })
            .collect();

        Ok(Self {
            population_size: individuals.len(),
            slot_count: offset,
            traits,
        })
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    #[must_use]
    pub fn traits(&self) -> &[TraitSummary] {
        &self.traits
    }

    #[must_use]
    pub fn trait_count(&self) -> usize {
        self.traits.len()
    }

    /// Total number of (trait, value) slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TraitSummary> {
        self.traits.iter().find(|t| t.name == name)
    }

    /// Maps every individual's trait values to slots.
    ///
    /// The result is row-major: the slots of individual `i` are at
    /// `[i * trait_count, (i + 1) * trait_count)`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the population size differs from the one the
    /// catalogue was built from, or a value is missing or unknown to the catalogue.
    pub fn encode(&self, individuals: &[Individual]) -> Result<Vec<usize>, SchemaError> {
        if individuals.len() != self.population_size {
            return Err(SchemaError::PopulationMismatch {
                expected: self.population_size,
                actual: individuals.len(),
            });
        }

        let mut slots = Vec::with_capacity(individuals.len() * self.traits.len());
        for ind in individuals {
            for (i, summary) in self.traits.iter().enumerate() {
                let value = ind
                    .trait_value(i)
                    .ok_or_else(|| SchemaError::MissingTrait {
                        individual: ind.id().to_owned(),
                        trait_name: summary.name.clone(),
                    })?;
                let index =
                    summary
                        .value_index(value)
                        .ok_or_else(|| SchemaError::UnknownTraitValue {
                            individual: ind.id().to_owned(),
                            trait_name: summary.name.clone(),
                            value: value.to_owned(),
                        })?;
                slots.push(summary.offset + index);
            }
        }
        Ok(slots)
    }
}

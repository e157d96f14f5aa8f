//! Loading the population from a CSV table.
//!
//! The table has a fixed header:
//!
//! ```text
//! name,gender,discipline,seniority,client,team
//! ```
//!
//! `name` identifies the person; the five remaining columns are the traits, in
//! [`TRAIT_NAMES`] order. Surrounding whitespace is trimmed from every field.

use std::io;

use anyhow::Context as _;
use fairgroup_model::Individual;
use serde::Deserialize;

/// Traits read from each row, in column order.
pub const TRAIT_NAMES: [&str; 5] = ["gender", "discipline", "seniority", "client", "team"];

#[derive(Debug, Deserialize)]
struct PersonRecord {
    name: String,
    gender: String,
    discipline: String,
    seniority: String,
    client: String,
    team: String,
}

impl From<PersonRecord> for Individual {
    fn from(record: PersonRecord) -> Self {
        Individual::new(
            record.name,
            [
                record.gender,
                record.discipline,
                record.seniority,
                record.client,
                record.team,
            ],
        )
    }
}

/// Reads every row of the table into an [`Individual`].
pub fn read_individuals<R>(reader: R) -> anyhow::Result<Vec<Individual>>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let individuals = reader
        .deserialize::<PersonRecord>()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(Individual::from)
                .with_context(|| format!("Failed to parse record #{}", i + 1))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    log::info!("Loaded {} individuals", individuals.len());
    Ok(individuals)
}

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fairgroup_model::Assignment;
use fairgroup_training::evolution::TerminationReason;
use serde::{Deserialize, Serialize};

/// Result of a `group` run, as written with `--format json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupingReport {
    pub generated_at: DateTime<Utc>,
    pub group_count: usize,
    pub fitness: f64,
    pub generations: usize,
    pub termination: TerminationReason,
    pub seed: Option<u64>,
    /// Group label of every individual, in input order.
    pub assignment: Assignment,
    pub groups: Vec<GroupReport>,
}

/// Members and score components of one group.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GroupReport {
    /// One-based group number.
    pub number: usize,
    pub size: usize,
    pub fitness: f64,
    pub size_score: f64,
    pub trait_scores: BTreeMap<String, f64>,
    pub members: Vec<String>,
}

/// Result of a `score` run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub fitness: f64,
    pub groups: Vec<GroupReport>,
}

use serde::{Deserialize, Serialize};

/// An assignment label does not fit the population or the group count.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InvalidAssignment {
    #[display("expected {expected} labels, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("label {label} at position {position} is not below group count {group_count}")]
    LabelOutOfRange {
        position: usize,
        label: usize,
        group_count: usize,
    },
}

/// A candidate grouping (chromosome).
///
/// Position `i` holds the group label of individual `i`. Operators never modify an
/// assignment in place; they build a new one, so a parent stays intact until its
/// generation is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    labels: Vec<usize>,
}

impl From<Vec<usize>> for Assignment {
    fn from(labels: Vec<usize>) -> Self {
        Self { labels }
    }
}

impl Assignment {
    #[must_use]
    pub fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns a copy of this assignment with one position relabelled.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    #[must_use]
    pub fn with_label(&self, position: usize, label: usize) -> Self {
        let mut labels = self.labels.clone();
        labels[position] = label;
        Self { labels }
    }

    /// Checks that there is one label per individual and every label is a valid group.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAssignment`] describing the first violation found.
    pub fn validate(
        &self,
        population_size: usize,
        group_count: usize,
    ) -> Result<(), InvalidAssignment> {
        if self.labels.len() != population_size {
            return Err(InvalidAssignment::LengthMismatch {
                expected: population_size,
                actual: self.labels.len(),
            });
        }
        if let Some((position, &label)) = self
            .labels
            .iter()
            .enumerate()
            .find(|(_, label)| **label >= group_count)
        {
            return Err(InvalidAssignment::LabelOutOfRange {
                position,
                label,
                group_count,
            });
        }
        Ok(())
    }

    /// Counts the members of every group in `[0, group_count)`.
    ///
    /// Labels outside the range are not counted.
    #[must_use]
    pub fn group_sizes(&self, group_count: usize) -> Vec<usize> {
        let mut sizes = vec![0; group_count];
        for &label in &self.labels {
            if let Some(size) = sizes.get_mut(label) {
                *size += 1;
            }
        }
        sizes
    }

    /// Returns the indices of the individuals assigned to `group`.
    pub fn members(&self, group: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, label)| **label == group)
            .map(|(i, _)| i)
    }
}

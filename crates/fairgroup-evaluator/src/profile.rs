//! Composition of a single group.
//!
//! A [`GroupProfile`] is a histogram of the group's members over the catalogue's
//! (trait, value) slots, plus the member count. It is all the fitness function
//! needs to know about a group.

/// Member counts of one group, indexed by catalogue slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupProfile {
    size: usize,
    slot_counts: Vec<usize>,
}

impl GroupProfile {
    /// Creates an empty profile for a catalogue with `slot_count` slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            size: 0,
            slot_counts: vec![0; slot_count],
        }
    }

    /// Adds one member, given the slots of its trait values.
    pub fn insert(&mut self, member_slots: &[usize]) {
        self.size += 1;
        for &slot in member_slots {
            self.slot_counts[slot] += 1;
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Counts of the slots `[offset, offset + len)`, i.e. of one trait's values.
    #[must_use]
    pub fn trait_counts(&self, offset: usize, len: usize) -> &[usize] {
        &self.slot_counts[offset..offset + len]
    }

    /// Number of distinct values of one trait present at least once.
    #[must_use]
    pub fn represented(&self, offset: usize, len: usize) -> usize {
        self.trait_counts(offset, len)
            .iter()
            .filter(|&&c| c > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_counts_size_and_slots() {
        let mut profile = GroupProfile::new(5);
        assert!(profile.is_empty());
        profile.insert(&[0, 3]);
        profile.insert(&[0, 4]);
        assert_eq!(profile.size(), 2);
        assert_eq!(profile.trait_counts(0, 3), &[2, 0, 0]);
        assert_eq!(profile.trait_counts(3, 2), &[1, 1]);
        assert_eq!(profile.represented(0, 3), 1);
        assert_eq!(profile.represented(3, 2), 2);
    }
}

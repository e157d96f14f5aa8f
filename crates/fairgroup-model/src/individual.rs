use std::fmt;

use serde::{Deserialize, Serialize};

/// One person to be grouped.
///
/// Trait values are positional: value `i` belongs to the `i`-th trait name the
/// [`TraitCatalogue`](crate::TraitCatalogue) was built with. Individuals are
/// immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    id: String,
    traits: Vec<String>,
}

impl Individual {
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            traits: traits.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the stable identifier (usually the person's name).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn traits(&self) -> &[String] {
        &self.traits
    }

    /// Returns the value of the trait at `index`, if the record has one.
    #[must_use]
    pub fn trait_value(&self, index: usize) -> Option<&str> {
        self.traits.get(index).map(String::as_str)
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.id)?;
        for (i, value) in self.traits.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

//! Value objects identifying manifest elements.
//!
//! References compare and hash by name only. They are used as map keys for
//! uniqueness and consistency checks and are never mutated once built.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! element_reference {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            pub element_name: String,
        }

        impl $name {
            pub fn new(element_name: impl Into<String>) -> Self {
                Self {
                    element_name: element_name.into(),
                }
            }

            pub fn as_str(&self) -> &str {
                &self.element_name
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.element_name)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

element_reference!(
    /// Reference to an entity (join key) by name.
    EntityReference
);
element_reference!(
    /// Reference to a categorical or time dimension by name.
    DimensionReference
);
element_reference!(
    /// Reference to a time dimension by name.
    TimeDimensionReference
);
element_reference!(
    /// Reference to a measure by name.
    MeasureReference
);
element_reference!(
    /// Reference to a metric by name.
    MetricReference
);
element_reference!(
    /// Reference to something that can appear in a group-by: a dimension,
    /// time dimension or entity.
    LinkableElementReference
);

impl From<TimeDimensionReference> for DimensionReference {
    fn from(r: TimeDimensionReference) -> Self {
        DimensionReference::new(r.element_name)
    }
}

impl From<DimensionReference> for TimeDimensionReference {
    fn from(r: DimensionReference) -> Self {
        TimeDimensionReference::new(r.element_name)
    }
}

/// Reference to a semantic model by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SemanticModelReference {
    pub semantic_model_name: String,
}

impl SemanticModelReference {
    pub fn new(semantic_model_name: impl Into<String>) -> Self {
        Self {
            semantic_model_name: semantic_model_name.into(),
        }
    }
}

impl fmt::Display for SemanticModelReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.semantic_model_name)
    }
}

/// Reference to a saved query by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SavedQueryReference {
    pub saved_query_name: String,
}

impl SavedQueryReference {
    pub fn new(saved_query_name: impl Into<String>) -> Self {
        Self {
            saved_query_name: saved_query_name.into(),
        }
    }
}

impl fmt::Display for SavedQueryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.saved_query_name)
    }
}

/// An element qualified by the semantic model that defines it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SemanticModelElementReference {
    pub semantic_model_name: String,
    pub element_name: String,
}

impl SemanticModelElementReference {
    pub fn new(semantic_model_name: impl Into<String>, element_name: impl Into<String>) -> Self {
        Self {
            semantic_model_name: semantic_model_name.into(),
            element_name: element_name.into(),
        }
    }

    pub fn semantic_model_reference(&self) -> SemanticModelReference {
        SemanticModelReference::new(self.semantic_model_name.clone())
    }
}

impl fmt::Display for SemanticModelElementReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.semantic_model_name, self.element_name)
    }
}

//! Weighted random selection over collections of items.
//!
//! Items carry an integer weight. A draw picks a uniform point in
//! `[1, range_max]` over the cumulative weights and maps it back to the
//! record that covers it.
pub mod collection;
pub mod group;
pub mod record;
pub mod weighting;

pub use collection::WeightedCollection;
pub use group::{shared, SharedCollection, WeightedGroup};
pub use record::{RawInput, WeightedRecord};

use std::fmt;

pub type Weight = i64;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A draw was attempted on a collection with no records left.
    EmptyCollection,
    /// A draw was attempted on a group with no member collections.
    EmptyGroup,
    /// No cumulative record covers the target.
    TargetNotFound { target: Weight, range_max: Weight },
    /// No record holds the item.
    ItemNotFound { item: String },
    /// A weight or running total does not fit in [`Weight`].
    WeightOverflow,
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TargetNotFound { .. } | Error::ItemNotFound { .. }
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCollection => write!(f, "cannot draw from an empty collection"),
            Self::EmptyGroup => write!(f, "cannot draw from an empty group"),
            Self::TargetNotFound { target, range_max } => write!(
                f,
                "nothing found matching weight {target} (range max {range_max})"
            ),
            Self::ItemNotFound { item } => write!(f, "could not find item {item}"),
            Self::WeightOverflow => write!(f, "total weight overflows {}", Weight::MAX),
        }
    }
}

impl std::error::Error for Error {}

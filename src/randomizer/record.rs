use super::Weight;
use serde::Deserialize;

/// An item paired with its weight.
///
/// Inside a cumulative sequence `weight` holds the running total up to and
/// including this record instead of the item's own weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedRecord<T> {
    pub item: T,
    pub weight: Weight,
}

impl<T> WeightedRecord<T> {
    pub fn new(item: T, weight: Weight) -> WeightedRecord<T> {
        WeightedRecord { item, weight }
    }
}

///
/// An input element, either a bare item or an item with an explicit weight.
///
/// Bare items are weighted 1 when normalized.
///
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawInputRepr<T>")]
pub enum RawInput<T> {
    Plain(T),
    Weighted(T, Weight),
}

impl<T> RawInput<T> {
    pub fn plain(item: T) -> RawInput<T> {
        RawInput::Plain(item)
    }

    pub fn weighted(item: T, weight: Weight) -> RawInput<T> {
        RawInput::Weighted(item, weight)
    }

    pub fn into_record(self) -> WeightedRecord<T> {
        match self {
            RawInput::Plain(item) => WeightedRecord::new(item, 1),
            RawInput::Weighted(item, weight) => WeightedRecord::new(item, weight),
        }
    }
}

impl<T> From<WeightedRecord<T>> for RawInput<T> {
    fn from(record: WeightedRecord<T>) -> RawInput<T> {
        RawInput::Weighted(record.item, record.weight)
    }
}

// Object form is tried first, so `{"item": .., "probability": n}` is never
// read as a plain value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInputRepr<T> {
    Weighted {
        item: T,
        #[serde(alias = "weight")]
        probability: Weight,
    },
    Plain(T),
}

impl<T> From<RawInputRepr<T>> for RawInput<T> {
    fn from(repr: RawInputRepr<T>) -> RawInput<T> {
        match repr {
            RawInputRepr::Weighted { item, probability } => RawInput::Weighted(item, probability),
            RawInputRepr::Plain(item) => RawInput::Plain(item),
        }
    }
}

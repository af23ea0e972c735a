//! The weighting algorithm shared by collections and groups.
use super::record::{RawInput, WeightedRecord};
use super::{Error, Result, Weight};

///
/// Turns raw inputs into records sorted by descending weight.
///
/// Plain inputs get a weight of 1. The sort is stable, so equal weights keep
/// their input order. Nothing is filtered out here.
///
pub fn normalize<T, I>(raw: I) -> Vec<WeightedRecord<T>>
where
    I: IntoIterator<Item = RawInput<T>>,
{
    let mut records: Vec<WeightedRecord<T>> =
        raw.into_iter().map(RawInput::into_record).collect();
    records.sort_by(|a, b| b.weight.cmp(&a.weight));
    records
}

///
/// Replaces each record's weight with the running total of weights up to and
/// including it. The last weight is the range max.
///
/// Fails with [`Error::WeightOverflow`] if the total does not fit in a [`Weight`].
///
pub fn cumulative<T: Clone>(records: &[WeightedRecord<T>]) -> Result<Vec<WeightedRecord<T>>> {
    let mut running: Weight = 0;
    let mut offsets = Vec::with_capacity(records.len());
    for record in records {
        running = running
            .checked_add(record.weight)
            .ok_or(Error::WeightOverflow)?;
        offsets.push(WeightedRecord::new(record.item.clone(), running));
    }
    Ok(offsets)
}

/// Range max of a cumulative sequence, 0 when empty.
pub fn range_max<T>(offsets: &[WeightedRecord<T>]) -> Weight {
    offsets.last().map_or(0, |record| record.weight)
}

///
/// Returns the first cumulative record whose weight is at least `target`.
///
pub fn select<T>(target: Weight, offsets: &[WeightedRecord<T>]) -> Result<&WeightedRecord<T>> {
    offsets
        .iter()
        .find(|record| target <= record.weight)
        .ok_or_else(|| Error::TargetNotFound {
            target,
            range_max: range_max(offsets),
        })
}

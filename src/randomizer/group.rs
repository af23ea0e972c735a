use super::collection::WeightedCollection;
use super::record::{RawInput, WeightedRecord};
use super::weighting::{cumulative, normalize, range_max, select};
use super::{Error, Result, Weight};
use log::{debug, trace, warn};
use rand::Rng;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A collection owned elsewhere and referenced by one or more groups.
pub type SharedCollection<T> = Arc<RwLock<WeightedCollection<T>>>;

pub fn shared<T>(collection: WeightedCollection<T>) -> SharedCollection<T> {
    Arc::new(RwLock::new(collection))
}

// Collections are plain data, so a poisoned lock still holds a usable value.
fn read<T>(collection: &SharedCollection<T>) -> RwLockReadGuard<'_, WeightedCollection<T>> {
    collection.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(collection: &SharedCollection<T>) -> RwLockWriteGuard<'_, WeightedCollection<T>> {
    collection.write().unwrap_or_else(PoisonError::into_inner)
}

///
/// Two-stage weighted selection: a member collection is drawn by its weight
/// in the group, then an item is drawn from that collection.
///
/// Members are referenced, not copied. Depleting or resetting a member
/// through another handle is visible to the group.
///
#[derive(Debug, Clone)]
pub struct WeightedGroup<T> {
    lists: Vec<WeightedRecord<SharedCollection<T>>>,
    offset_lists: Vec<WeightedRecord<SharedCollection<T>>>,
}

impl<T: Clone + PartialEq + Debug> WeightedGroup<T> {
    ///
    /// Fails with [`Error::WeightOverflow`] if the list weights sum past [`Weight::MAX`].
    ///
    pub fn new<I>(raw: I) -> Result<WeightedGroup<T>>
    where
        I: IntoIterator<Item = RawInput<SharedCollection<T>>>,
    {
        let mut lists = normalize(raw);
        lists.retain(|record| {
            if record.weight <= 0 {
                warn!("Dropping list with non-positive weight {}", record.weight);
            }
            record.weight > 0
        });
        let offset_lists = cumulative(&lists)?;
        debug!(
            "Created group of {} lists, range max {}",
            lists.len(),
            range_max(&offset_lists)
        );
        Ok(WeightedGroup {
            lists,
            offset_lists,
        })
    }

    /// Builds a group where every collection has weight 1.
    pub fn from_collections<I>(collections: I) -> Result<WeightedGroup<T>>
    where
        I: IntoIterator<Item = SharedCollection<T>>,
    {
        WeightedGroup::new(collections.into_iter().map(RawInput::Plain))
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn range_max(&self) -> Weight {
        range_max(&self.offset_lists)
    }

    fn random_list<R: Rng>(&self, rng: &mut R) -> Result<&SharedCollection<T>> {
        if self.lists.is_empty() {
            return Err(Error::EmptyGroup);
        }
        let range_max = self.range_max();
        let target = rng.gen_range(1..=range_max);
        trace!("List target {} of {}", target, range_max);
        Ok(&select(target, &self.offset_lists)?.item)
    }

    pub fn get_random(&self) -> Result<T> {
        self.get_random_with(&mut rand::thread_rng())
    }

    ///
    /// Draws a member collection, then an item from it. A member that has
    /// been emptied elsewhere yields [`Error::EmptyCollection`].
    ///
    pub fn get_random_with<R: Rng>(&self, rng: &mut R) -> Result<T> {
        let list = self.random_list(rng)?;
        let item = read(list).get_random_with(rng)?;
        Ok(item)
    }

    pub fn get_random_and_remove(&self) -> Result<T> {
        self.get_random_and_remove_with(&mut rand::thread_rng())
    }

    /// As [`get_random_with`](Self::get_random_with), depleting the item in its member.
    pub fn get_random_and_remove_with<R: Rng>(&self, rng: &mut R) -> Result<T> {
        let list = self.random_list(rng)?;
        let item = write(list).get_random_and_remove_with(rng)?;
        Ok(item)
    }

    pub fn get_all_lists(&self) -> Vec<Vec<T>> {
        self.lists
            .iter()
            .map(|record| read(&record.item).get_all_items())
            .collect()
    }
}

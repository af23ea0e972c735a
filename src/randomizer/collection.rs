use super::record::{RawInput, WeightedRecord};
use super::weighting::{cumulative, normalize, range_max, select};
use super::{Error, Result, Weight};
use log::{debug, trace, warn};
use rand::Rng;
use std::fmt::Debug;

///
/// A list of weighted items that can be drawn from at random.
///
/// Drawing with removal depletes an item by one weight, and the item leaves
/// the collection once its weight reaches zero. [`reset_contents`] restores
/// the collection to how it was built.
///
/// [`reset_contents`]: WeightedCollection::reset_contents
///
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCollection<T> {
    contents: Vec<WeightedRecord<T>>,
    offset_contents: Vec<WeightedRecord<T>>,
    original_contents: Vec<WeightedRecord<T>>,
    // Kept so a reset never has to re-check the total.
    original_offsets: Vec<WeightedRecord<T>>,
}

impl<T: Clone + PartialEq + Debug> WeightedCollection<T> {
    ///
    /// Fails with [`Error::WeightOverflow`] if the weights sum past [`Weight::MAX`].
    ///
    pub fn new<I>(raw: I) -> Result<WeightedCollection<T>>
    where
        I: IntoIterator<Item = RawInput<T>>,
    {
        let mut contents = normalize(raw);
        contents.retain(|record| {
            if record.weight <= 0 {
                warn!(
                    "Dropping {:?} with non-positive weight {}",
                    record.item, record.weight
                );
            }
            record.weight > 0
        });
        let offset_contents = cumulative(&contents)?;
        debug!(
            "Created collection of {} items, range max {}",
            contents.len(),
            range_max(&offset_contents)
        );
        Ok(WeightedCollection {
            original_contents: contents.clone(),
            original_offsets: offset_contents.clone(),
            offset_contents,
            contents,
        })
    }

    /// Builds a collection where every item has weight 1.
    pub fn from_items<I>(items: I) -> Result<WeightedCollection<T>>
    where
        I: IntoIterator<Item = T>,
    {
        WeightedCollection::new(items.into_iter().map(RawInput::Plain))
    }

    pub fn contents(&self) -> &[WeightedRecord<T>] {
        &self.contents
    }

    pub fn offset_contents(&self) -> &[WeightedRecord<T>] {
        &self.offset_contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn range_max(&self) -> Weight {
        range_max(&self.offset_contents)
    }

    fn random_target<R: Rng>(&self, rng: &mut R) -> Result<Weight> {
        if self.contents.is_empty() {
            return Err(Error::EmptyCollection);
        }
        let range_max = self.range_max();
        let target = rng.gen_range(1..=range_max);
        trace!("Target {} of {}", target, range_max);
        Ok(target)
    }

    pub fn get_random(&self) -> Result<T> {
        self.get_random_with(&mut rand::thread_rng())
    }

    pub fn get_random_with<R: Rng>(&self, rng: &mut R) -> Result<T> {
        let target = self.random_target(rng)?;
        Ok(select(target, &self.offset_contents)?.item.clone())
    }

    ///
    /// Draws an item and lowers its weight by 1, removing it if that leaves
    /// it at zero.
    ///
    pub fn get_random_and_remove(&mut self) -> Result<T> {
        self.get_random_and_remove_with(&mut rand::thread_rng())
    }

    pub fn get_random_and_remove_with<R: Rng>(&mut self, rng: &mut R) -> Result<T> {
        let item = self.get_random_with(rng)?;
        self.adjust_weight(&item, -1)?;
        Ok(item)
    }

    ///
    /// Adds `delta` to the weight of the first record holding `item`.
    ///
    /// A record whose weight drops to zero or below is removed. Items are
    /// found by equality, so two records with equal items cannot be told
    /// apart. If the new weight or the total would overflow, nothing changes
    /// and [`Error::WeightOverflow`] is returned.
    ///
    pub fn adjust_weight(&mut self, item: &T, delta: Weight) -> Result<()> {
        let index = self
            .contents
            .iter()
            .position(|record| record.item == *item)
            .ok_or_else(|| Error::ItemNotFound {
                item: format!("{:?}", item),
            })?;
        let previous = self.contents[index].weight;
        let weight = previous
            .checked_add(delta)
            .ok_or(Error::WeightOverflow)?;
        if weight <= 0 {
            debug!("Removing {:?} at weight {}", item, weight);
            self.contents.remove(index);
            // Only smaller than a total that already fit.
            self.offset_contents = cumulative(&self.contents)?;
            return Ok(());
        }
        self.contents[index].weight = weight;
        match cumulative(&self.contents) {
            Ok(offsets) => {
                debug!("Adjusted {:?} by {} to {}", item, delta, weight);
                self.offset_contents = offsets;
                Ok(())
            }
            Err(err) => {
                self.contents[index].weight = previous;
                Err(err)
            }
        }
    }

    /// Restores every weight and removed item from construction time.
    pub fn reset_contents(&mut self) {
        debug!(
            "Resetting collection from {} to {} items",
            self.contents.len(),
            self.original_contents.len()
        );
        self.contents = self.original_contents.clone();
        self.offset_contents = self.original_offsets.clone();
    }

    pub fn get_all_items(&self) -> Vec<T> {
        self.contents
            .iter()
            .map(|record| record.item.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flavours() -> WeightedCollection<String> {
        WeightedCollection::new(vec![
            RawInput::plain("vanilla".to_string()),
            RawInput::plain("chocolate".to_string()),
            RawInput::weighted("strawberry".to_string(), 2),
        ])
        .unwrap()
    }

    fn records(pairs: &[(&str, Weight)]) -> Vec<WeightedRecord<String>> {
        pairs
            .iter()
            .map(|(item, weight)| WeightedRecord::new(item.to_string(), *weight))
            .collect()
    }

    #[test]
    fn test_construction() {
        let collection = flavours();
        assert_eq!(
            collection.contents(),
            records(&[("strawberry", 2), ("vanilla", 1), ("chocolate", 1)]).as_slice()
        );
        assert_eq!(
            collection.offset_contents(),
            records(&[("strawberry", 2), ("vanilla", 3), ("chocolate", 4)]).as_slice()
        );
        assert_eq!(collection.range_max(), 4);
    }

    #[test]
    fn test_construction_drops_non_positive() {
        let collection = WeightedCollection::new(vec![
            RawInput::weighted("gone", 0),
            RawInput::plain("kept"),
            RawInput::weighted("also gone", -3),
        ])
        .unwrap();
        assert_eq!(collection.get_all_items(), vec!["kept"]);
        assert_eq!(collection.range_max(), 1);
    }

    #[test]
    fn test_construction_copies_input() {
        let mut raw = vec![RawInput::plain("beef".to_string())];
        let collection = WeightedCollection::new(raw.clone()).unwrap();
        raw[0] = RawInput::weighted("beef".to_string(), 100);
        assert_eq!(collection.contents()[0].weight, 1);
    }

    #[test]
    fn test_adjust_weight() {
        let mut collection = flavours();
        collection
            .adjust_weight(&"strawberry".to_string(), -1)
            .unwrap();
        collection.adjust_weight(&"vanilla".to_string(), -1).unwrap();
        collection.adjust_weight(&"chocolate".to_string(), 3).unwrap();
        assert_eq!(
            collection.offset_contents(),
            records(&[("strawberry", 1), ("chocolate", 5)]).as_slice()
        );
    }

    #[test]
    fn test_adjust_weight_removes_at_zero() {
        let mut collection =
            WeightedCollection::from_items(vec!["vanilla", "strawberry"]).unwrap();
        collection.adjust_weight(&"strawberry", -1).unwrap();
        assert_eq!(collection.get_all_items(), vec!["vanilla"]);
        collection.adjust_weight(&"vanilla", 3).unwrap();
        assert_eq!(collection.contents()[0].weight, 4);
    }

    #[test]
    fn test_adjust_weight_missing_item() {
        let mut collection = flavours();
        let err = collection
            .adjust_weight(&"pistachio".to_string(), -1)
            .unwrap_err();
        assert_eq!(
            err,
            Error::ItemNotFound {
                item: "\"pistachio\"".to_string()
            }
        );
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_construction_rejects_overflowing_total() {
        let raw = vec![RawInput::weighted("a", Weight::MAX), RawInput::plain("b")];
        assert_eq!(WeightedCollection::new(raw), Err(Error::WeightOverflow));

        let raw: Vec<RawInput<String>> =
            serde_json::from_str(r#"[{"item": "a", "probability": 9223372036854775807}, "b"]"#)
                .unwrap();
        assert_eq!(WeightedCollection::new(raw), Err(Error::WeightOverflow));
    }

    #[test]
    fn test_adjust_weight_overflow_leaves_collection_unchanged() {
        let mut collection = WeightedCollection::new(vec![RawInput::weighted("a", Weight::MAX)])
            .unwrap();
        assert_eq!(
            collection.adjust_weight(&"a", 1),
            Err(Error::WeightOverflow)
        );
        assert_eq!(collection.contents(), &[WeightedRecord::new("a", Weight::MAX)]);
        assert_eq!(collection.range_max(), Weight::MAX);
        assert_eq!(collection.get_random().unwrap(), "a");
    }

    #[test]
    fn test_adjust_weight_total_overflow_is_rolled_back() {
        let mut collection = WeightedCollection::new(vec![
            RawInput::weighted("a", Weight::MAX - 1),
            RawInput::plain("b"),
        ])
        .unwrap();
        assert_eq!(
            collection.adjust_weight(&"b", 1),
            Err(Error::WeightOverflow)
        );
        assert_eq!(collection.contents()[1], WeightedRecord::new("b", 1));
        assert_eq!(collection.range_max(), Weight::MAX);
        collection.adjust_weight(&"b", -1).unwrap();
        assert_eq!(collection.get_all_items(), vec!["a"]);
    }

    #[test]
    fn test_get_random() {
        let collection = flavours();
        let item = collection.get_random().unwrap();
        assert!(["strawberry", "vanilla", "chocolate"].contains(&item.as_str()));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_get_random_follows_weights() {
        let collection = WeightedCollection::new(vec![
            RawInput::weighted("common", 9),
            RawInput::plain("rare"),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let common = (0..1000)
            .filter(|_| collection.get_random_with(&mut rng).unwrap() == "common")
            .count();
        assert!(common > 800 && common < 980, "common drawn {} times", common);
    }

    #[test]
    fn test_get_random_and_remove() {
        let mut collection =
            WeightedCollection::from_items(vec!["strawberry", "vanilla", "chocolate"]).unwrap();
        let item = collection.get_random_and_remove().unwrap();
        assert!(["strawberry", "vanilla", "chocolate"].contains(&item));
        assert_eq!(collection.len(), 2);
        assert!(!collection.get_all_items().contains(&item));
    }

    #[test]
    fn test_depletion_until_empty() {
        let mut collection = WeightedCollection::from_items(vec!["a", "b", "c"]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mut drawn = vec![];
        for expected_len in (0..3).rev() {
            drawn.push(collection.get_random_and_remove_with(&mut rng).unwrap());
            assert_eq!(collection.len(), expected_len);
        }
        drawn.sort();
        assert_eq!(drawn, vec!["a", "b", "c"]);
        assert_eq!(
            collection.get_random_and_remove_with(&mut rng),
            Err(Error::EmptyCollection)
        );
        assert_eq!(collection.get_random(), Err(Error::EmptyCollection));
    }

    #[test]
    fn test_heavy_item_survives_weight_draws() {
        let mut collection =
            WeightedCollection::new(vec![RawInput::weighted("only", 3)]).unwrap();
        for remaining in (0..3).rev() {
            assert_eq!(collection.get_random_and_remove().unwrap(), "only");
            assert_eq!(collection.range_max(), remaining);
        }
        assert!(collection.is_empty());
    }

    #[test]
    fn test_reset_contents() {
        let raw = vec![
            RawInput::plain("vanilla".to_string()),
            RawInput::plain("chocolate".to_string()),
            RawInput::weighted("strawberry".to_string(), 2),
        ];
        let mut collection = WeightedCollection::new(raw.clone()).unwrap();
        collection.get_random_and_remove().unwrap();
        collection.get_random_and_remove().unwrap();
        collection.reset_contents();
        assert_eq!(collection.contents(), normalize(raw).as_slice());
        assert_eq!(collection.range_max(), 4);
    }

    #[test]
    fn test_reset_after_empty() {
        let mut collection = WeightedCollection::from_items(vec![1, 2]).unwrap();
        while collection.get_random_and_remove().is_ok() {}
        assert!(collection.is_empty());
        collection.reset_contents();
        assert_eq!(collection.get_all_items(), vec![1, 2]);
        collection.get_random_and_remove().unwrap();
        collection.reset_contents();
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_get_all_items() {
        let meats = WeightedCollection::from_items(vec!["beef", "pork", "chicken"]).unwrap();
        assert_eq!(meats.get_all_items(), vec!["beef", "pork", "chicken"]);
    }

    #[test]
    fn test_empty_collection() {
        let collection: WeightedCollection<u8> =
            WeightedCollection::from_items(vec![]).unwrap();
        assert!(collection.is_empty());
        assert_eq!(collection.range_max(), 0);
        assert_eq!(collection.get_random(), Err(Error::EmptyCollection));
        assert!(collection.get_all_items().is_empty());
    }
}

use crate::instance::Instance;

use fnv::FnvHashMap;
use smallvec::SmallVec;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Most bins hold a handful of items, so keep them inline.
type Items = SmallVec<[usize; 8]>;

/// A single capacity-bounded container of item lengths.
///
/// The capacity itself is owned by the instance, so a `Bin` only tracks its items and the
/// cached sum of their lengths.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bin {
    items: Items,
    load: usize,
}

impl Bin {
    pub(crate) fn with_item(item: usize) -> Self {
        let mut bin = Self::default();
        bin.push(item);
        bin
    }

    /// Creates a bin holding `items`. No capacity check is made.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut bin = Self::default();
        items.into_iter().for_each(|item| bin.push(item));
        bin
    }

    /// Lengths of the items in this bin, in insertion order.
    pub fn items(&self) -> &[usize] {
        &self.items
    }

    /// Sum of the item lengths in this bin.
    pub fn load(&self) -> usize {
        self.load
    }

    /// Number of items in this bin.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the bin holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Unused length left in this bin for the given capacity.
    pub fn remaining(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.load)
    }

    /// Fraction of `capacity` used by this bin, between 0.0 and 1.0.
    pub fn utilization(&self, capacity: usize) -> f64 {
        if capacity == 0 {
            0.0
        } else {
            self.load as f64 / capacity as f64
        }
    }

    pub(crate) fn fits(&self, capacity: usize, item: usize) -> bool {
        item <= self.remaining(capacity)
    }

    pub(crate) fn push(&mut self, item: usize) {
        self.items.push(item);
        self.load += item;
    }

    /// Removes exactly the item stored at `index` and returns its length.
    pub(crate) fn remove_at(&mut self, index: usize) -> usize {
        let item = self.items.remove(index);
        self.load -= item;
        item
    }

    /// Puts `item` at `index` and returns the length that was there before.
    pub(crate) fn replace_at(&mut self, index: usize, item: usize) -> usize {
        let old = std::mem::replace(&mut self.items[index], item);
        self.load = self.load - old + item;
        old
    }

    pub(crate) fn absorb(&mut self, other: &Bin) {
        self.items.extend_from_slice(&other.items);
        self.load += other.load;
    }
}

/// A partition of the instance's items into bins.
///
/// A `Solution` never contains an empty bin and, when produced by this crate, every bin load
/// stays within the capacity it was built for.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    bins: Vec<Bin>,
}

impl Solution {
    /// Creates a solution with no bins.
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a solution from explicit bin contents. Empty bins are dropped.
    ///
    /// No capacity check happens here; use [`Solution::check`] to validate the result against
    /// an [`Instance`].
    pub fn from_bins<B, I>(bins: B) -> Self
    where
        B: IntoIterator<Item = I>,
        I: IntoIterator<Item = usize>,
    {
        Self::from_vec(bins.into_iter().map(Bin::from_items).collect())
    }

    pub(crate) fn from_vec(mut bins: Vec<Bin>) -> Self {
        bins.retain(|bin| !bin.is_empty());
        Self { bins }
    }

    /// The bins of this solution in creation order.
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of bins used.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Returns `true` if no bins are used.
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Total number of items over all bins.
    pub fn item_count(&self) -> usize {
        self.bins.iter().map(Bin::len).sum()
    }

    /// Sum of all item lengths over all bins.
    pub fn total_load(&self) -> usize {
        self.bins.iter().map(Bin::load).sum()
    }

    /// Iterator over every item length, bin by bin.
    pub fn items(&self) -> impl Iterator<Item = usize> + '_ {
        self.bins.iter().flat_map(|bin| bin.items().iter().copied())
    }

    /// Multiset view of the packed items: length mapped to number of occurrences.
    pub fn item_counts(&self) -> FnvHashMap<usize, usize> {
        let mut counts = FnvHashMap::default();
        for item in self.items() {
            *counts.entry(item).or_insert(0) += 1;
        }
        counts
    }

    /// Returns whether this solution is a valid packing of `instance`: no bin is empty or over
    /// capacity, and the packed items are exactly the instance's items with multiplicity.
    pub fn check(&self, instance: &Instance) -> bool {
        let capacity = instance.capacity();
        let bins_ok = self
            .bins
            .iter()
            .all(|bin| !bin.is_empty() && bin.load() <= capacity);

        bins_ok && self.item_counts() == instance.item_counts()
    }

    /// Bin contents as plain vectors, in creation order.
    pub fn to_vecs(&self) -> Vec<Vec<usize>> {
        self.bins.iter().map(|bin| bin.items().to_vec()).collect()
    }

    /// Counts bins per utilization band.
    pub fn utilization_summary(&self, capacity: usize) -> UtilizationSummary {
        let mut summary = UtilizationSummary::default();
        for bin in &self.bins {
            let utilization = bin.utilization(capacity);
            if utilization < 0.3 {
                summary.below_30 += 1;
            } else if utilization < 0.6 {
                summary.from_30_to_60 += 1;
            } else if utilization < 0.9 {
                summary.from_60_to_90 += 1;
            } else {
                summary.at_least_90 += 1;
            }
        }
        summary
    }
}

/// Number of bins in each utilization band of a [`Solution`].
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UtilizationSummary {
    /// Bins filled below 30%.
    pub below_30: usize,

    /// Bins filled from 30% up to 60%.
    pub from_30_to_60: usize,

    /// Bins filled from 60% up to 90%.
    pub from_60_to_90: usize,

    /// Bins filled to 90% or more.
    pub at_least_90: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_at_removes_single_duplicate() {
        let mut bin = Bin::from_items([4, 4, 2]);
        assert_eq!(bin.remove_at(1), 4);
        assert_eq!(bin.items(), &[4, 2]);
        assert_eq!(bin.load(), 6);
    }

    #[test]
    fn replace_at_updates_load() {
        let mut bin = Bin::from_items([5, 3]);
        assert_eq!(bin.replace_at(0, 1), 5);
        assert_eq!(bin.load(), 4);
        assert!(bin.fits(10, 6));
        assert!(!bin.fits(10, 7));
    }

    #[test]
    fn from_bins_drops_empty_bins() {
        let solution = Solution::from_bins(vec![vec![9], vec![], vec![1, 1]]);
        assert_eq!(solution.len(), 2);
        assert_eq!(solution.total_load(), 11);
        assert_eq!(solution.item_count(), 3);
    }

    #[test]
    fn item_counts_keep_multiplicity() {
        let solution = Solution::from_bins(vec![vec![3, 3], vec![3, 7]]);
        let counts = solution.item_counts();
        assert_eq!(counts.get(&3), Some(&3));
        assert_eq!(counts.get(&7), Some(&1));
    }

    #[test]
    fn check_rejects_lost_and_overfull() {
        let instance = Instance::new(10, vec![6, 5, 4]).unwrap();

        assert!(Solution::from_bins(vec![vec![6, 4], vec![5]]).check(&instance));
        assert!(!Solution::from_bins(vec![vec![6, 4]]).check(&instance));
        assert!(!Solution::from_bins(vec![vec![6, 5], vec![4]]).check(&instance));
        assert!(!Solution::from_bins(vec![vec![6, 4], vec![5, 5]]).check(&instance));
    }

    #[test]
    fn utilization_bands() {
        let solution = Solution::from_bins(vec![vec![1], vec![3], vec![6], vec![9], vec![10]]);
        let summary = solution.utilization_summary(10);
        assert_eq!(
            summary,
            UtilizationSummary {
                below_30: 1,
                from_30_to_60: 1,
                from_60_to_90: 1,
                at_least_90: 2,
            }
        );
    }
}

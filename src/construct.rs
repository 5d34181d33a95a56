//! Constructive heuristics that build the starting packing.

use crate::cost::Cost;
use crate::instance::Instance;
use crate::packing::{Bin, Solution};

use std::cmp;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Rule for choosing which existing bin receives an item.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FitPolicy {
    /// First bin, in creation order, with enough room.
    #[default]
    FirstFit,

    /// Bin left with the least room after the item is placed. Ties go to the earliest bin.
    BestFit,
}

impl FitPolicy {
    /// Index of the bin that should receive `item`, or `None` if no bin has room.
    pub(crate) fn select(self, capacity: usize, bins: &[Bin], item: usize) -> Option<usize> {
        let mut candidates = bins
            .iter()
            .enumerate()
            .filter(|(_, bin)| bin.fits(capacity, item));

        match self {
            FitPolicy::FirstFit => candidates.next().map(|(i, _)| i),
            // `min_by_key` keeps the first of equal minimums.
            FitPolicy::BestFit => candidates
                .min_by_key(|(_, bin)| bin.remaining(capacity))
                .map(|(i, _)| i),
        }
    }

    /// Places `item` in the selected bin, opening a new bin if none has room.
    pub(crate) fn place(self, capacity: usize, bins: &mut Vec<Bin>, item: usize) {
        match self.select(capacity, bins, item) {
            Some(i) => bins[i].push(item),
            None => bins.push(Bin::with_item(item)),
        }
    }
}

/// Constructive heuristic used to build the initial solution.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Construction {
    /// First-Fit-Decreasing.
    FirstFitDecreasing,

    /// Best-Fit-Decreasing.
    BestFitDecreasing,

    /// Run both and keep the cheaper solution, preferring First-Fit-Decreasing on ties.
    #[default]
    BestOf,
}

impl Construction {
    /// Builds a solution for `instance`. Also returns the heuristic that produced it, which
    /// differs from `self` only for [`Construction::BestOf`].
    pub fn build(self, instance: &Instance) -> (Solution, Construction) {
        match self {
            Construction::FirstFitDecreasing => (
                first_fit_decreasing(instance),
                Construction::FirstFitDecreasing,
            ),
            Construction::BestFitDecreasing => (
                best_fit_decreasing(instance),
                Construction::BestFitDecreasing,
            ),
            Construction::BestOf => {
                let capacity = instance.capacity();
                let ffd = first_fit_decreasing(instance);
                let bfd = best_fit_decreasing(instance);
                if Cost::of(capacity, &bfd).improves_on(&Cost::of(capacity, &ffd)) {
                    (bfd, Construction::BestFitDecreasing)
                } else {
                    (ffd, Construction::FirstFitDecreasing)
                }
            }
        }
    }
}

/// First-Fit-Decreasing: items longest first, each into the first bin with room.
pub fn first_fit_decreasing(instance: &Instance) -> Solution {
    pack_decreasing(instance, FitPolicy::FirstFit)
}

/// Best-Fit-Decreasing: items longest first, each into the bin it fills most tightly.
pub fn best_fit_decreasing(instance: &Instance) -> Solution {
    pack_decreasing(instance, FitPolicy::BestFit)
}

fn pack_decreasing(instance: &Instance, policy: FitPolicy) -> Solution {
    let capacity = instance.capacity();
    let mut bins = Vec::new();
    for item in sorted_decreasing(instance.items().iter().copied()) {
        policy.place(capacity, &mut bins, item);
    }
    Solution::from_vec(bins)
}

/// Sorts lengths longest first. The sort is stable, so equal lengths keep their input order.
pub(crate) fn sorted_decreasing<I>(items: I) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
{
    let mut items: Vec<usize> = items.into_iter().collect();
    items.sort_by_key(|&length| cmp::Reverse(length));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffd_fills_first_bin_with_room() {
        let instance = Instance::new(10, vec![6, 5, 4, 3, 2]).unwrap();
        let solution = first_fit_decreasing(&instance);
        assert_eq!(solution.to_vecs(), vec![vec![6, 4], vec![5, 3, 2]]);
        assert_eq!(Cost::of(10, &solution), Cost { bins: 2, waste: 0 });
    }

    #[test]
    fn bfd_prefers_tightest_bin() {
        // After 7 and 5 open two bins, the 3 fits both; best fit picks the 7 (leaves 0).
        let instance = Instance::new(10, vec![5, 3, 7]).unwrap();
        assert_eq!(
            best_fit_decreasing(&instance).to_vecs(),
            vec![vec![7, 3], vec![5]]
        );

        let instance = Instance::new(10, vec![8, 6, 3, 1]).unwrap();
        assert_eq!(
            first_fit_decreasing(&instance).to_vecs(),
            vec![vec![8, 1], vec![6, 3]]
        );
        assert_eq!(
            best_fit_decreasing(&instance).to_vecs(),
            vec![vec![8], vec![6, 3, 1]]
        );
    }

    #[test]
    fn best_fit_ties_go_to_earliest_bin() {
        let bins = vec![Bin::from_items([6]), Bin::from_items([6]), Bin::from_items([7])];
        assert_eq!(FitPolicy::BestFit.select(10, &bins, 4), Some(0));
        assert_eq!(FitPolicy::BestFit.select(10, &bins, 3), Some(2));
        assert_eq!(FitPolicy::BestFit.select(10, &bins, 5), None);
    }

    #[test]
    fn best_of_keeps_cheaper_construction() {
        let instance = Instance::new(15, vec![2, 6, 3, 6, 2, 11]).unwrap();
        assert_eq!(first_fit_decreasing(&instance).len(), 3);
        let (solution, used) = Construction::BestOf.build(&instance);
        assert_eq!(used, Construction::BestFitDecreasing);
        assert_eq!(solution.to_vecs(), vec![vec![11, 2, 2], vec![6, 6, 3]]);

        let instance = Instance::new(10, vec![6, 5, 4, 3, 2]).unwrap();
        let (_, used) = Construction::BestOf.build(&instance);
        assert_eq!(used, Construction::FirstFitDecreasing);
    }

    #[test]
    fn construction_is_deterministic() {
        let instance = Instance::new(100, vec![33, 50, 17, 50, 33, 81, 19, 2, 64, 36]).unwrap();
        assert_eq!(
            first_fit_decreasing(&instance),
            first_fit_decreasing(&instance)
        );
        assert_eq!(best_fit_decreasing(&instance), best_fit_decreasing(&instance));
    }

    #[test]
    fn empty_and_exact_instances() {
        let empty = Instance::new(10, vec![]).unwrap();
        assert!(first_fit_decreasing(&empty).is_empty());
        assert!(best_fit_decreasing(&empty).is_empty());

        let exact = Instance::new(10, vec![10]).unwrap();
        let solution = best_fit_decreasing(&exact);
        assert_eq!(Cost::of(10, &solution), Cost { bins: 1, waste: 0 });
    }
}

use crate::construct::{sorted_decreasing, FitPolicy};
use crate::packing::Solution;

use rand::seq::index;
use rand::Rng;
use std::cmp;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How many items a perturbation pulls out of the solution.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Strength {
    /// A fixed number of items, capped at the number of items packed.
    Count(usize),

    /// A fraction of the items packed, at least one.
    Fraction(f64),
}

impl Default for Strength {
    fn default() -> Self {
        Strength::Count(2)
    }
}

/// Randomized destroy and rebuild step used to escape local optima.
///
/// A sample of items is drawn uniformly without replacement, each sampled item is taken out of
/// its bin (only that one occurrence), bins left empty are dropped, and the removed items are
/// put back longest first using `policy`.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Perturbation {
    /// Number of items to pull out.
    pub strength: Strength,

    /// How the pulled items are put back.
    pub policy: FitPolicy,
}

impl Perturbation {
    /// Number of items a perturbation of a solution holding `total` items removes.
    pub fn sample_size(&self, total: usize) -> usize {
        if total == 0 {
            return 0;
        }

        match self.strength {
            Strength::Count(k) => cmp::min(k, total),
            Strength::Fraction(f) => {
                let f = if f.is_finite() { f.clamp(0.0, 1.0) } else { 0.0 };
                ((total as f64 * f) as usize).clamp(1, total)
            }
        }
    }

    /// Shakes `solution`, returning the rebuilt solution, or `None` if there was nothing to
    /// remove.
    pub fn apply<R>(&self, capacity: usize, solution: &Solution, rng: &mut R) -> Option<Solution>
    where
        R: Rng + ?Sized,
    {
        let positions: Vec<(usize, usize)> = solution
            .bins()
            .iter()
            .enumerate()
            .flat_map(|(b, bin)| (0..bin.len()).map(move |i| (b, i)))
            .collect();

        let amount = self.sample_size(positions.len());
        if amount == 0 {
            return None;
        }

        let mut picked: Vec<(usize, usize)> = index::sample(rng, positions.len(), amount)
            .into_iter()
            .map(|p| positions[p])
            .collect();
        // Highest index first within a bin so earlier removals don't shift later ones.
        picked.sort_unstable_by(|a, b| b.cmp(a));

        let mut bins = solution.bins().to_vec();
        let removed: Vec<usize> = picked
            .into_iter()
            .map(|(b, i)| bins[b].remove_at(i))
            .collect();
        bins.retain(|bin| !bin.is_empty());

        for item in sorted_decreasing(removed) {
            self.policy.place(capacity, &mut bins, item);
        }

        tracing::trace!(removed = amount, bins = bins.len(), "perturbed");
        Some(Solution::from_vec(bins))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use rand::prelude::*;

    #[test]
    fn sample_size_bounds() {
        let count = Perturbation {
            strength: Strength::Count(3),
            ..Default::default()
        };
        assert_eq!(count.sample_size(10), 3);
        assert_eq!(count.sample_size(2), 2);
        assert_eq!(count.sample_size(0), 0);

        let fraction = Perturbation {
            strength: Strength::Fraction(0.2),
            ..Default::default()
        };
        assert_eq!(fraction.sample_size(20), 4);
        assert_eq!(fraction.sample_size(3), 1);
        assert_eq!(fraction.sample_size(0), 0);
    }

    #[test]
    fn nothing_to_shake() {
        let mut rng: StdRng = SeedableRng::seed_from_u64(1);
        assert_eq!(
            Perturbation::default().apply(10, &Solution::new(), &mut rng),
            None
        );
    }

    #[test]
    fn keeps_items_and_capacity() {
        let instance = Instance::new(10, vec![5, 5, 5, 3, 3, 2, 2, 1, 1, 1]).unwrap();
        let solution = Solution::from_bins(vec![vec![5, 5], vec![5, 3, 2], vec![3, 2, 1, 1, 1]]);
        let mut rng: StdRng = SeedableRng::seed_from_u64(3);

        for policy in [FitPolicy::FirstFit, FitPolicy::BestFit] {
            let perturbation = Perturbation {
                strength: Strength::Fraction(0.5),
                policy,
            };
            for _ in 0..50 {
                let shaken = perturbation.apply(10, &solution, &mut rng).unwrap();
                assert!(shaken.check(&instance));
            }
        }
    }

    #[test]
    fn same_seed_same_shake() {
        let solution = Solution::from_bins(vec![vec![4, 4], vec![6, 3], vec![7, 2], vec![5]]);
        let perturbation = Perturbation {
            strength: Strength::Count(3),
            policy: FitPolicy::BestFit,
        };

        let mut rng1: StdRng = SeedableRng::seed_from_u64(42);
        let mut rng2: StdRng = SeedableRng::seed_from_u64(42);
        assert_eq!(
            perturbation.apply(10, &solution, &mut rng1),
            perturbation.apply(10, &solution, &mut rng2)
        );
    }

    #[test]
    fn removing_every_item_rebuilds_from_scratch() {
        let solution = Solution::from_bins(vec![vec![2], vec![3], vec![5]]);
        let perturbation = Perturbation {
            strength: Strength::Fraction(1.0),
            policy: FitPolicy::FirstFit,
        };
        let mut rng: StdRng = SeedableRng::seed_from_u64(9);
        let shaken = perturbation.apply(10, &solution, &mut rng).unwrap();
        assert_eq!(shaken.to_vecs(), vec![vec![5, 3, 2]]);
    }
}

use crate::packing::{Bin, Solution};

use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Objective value of a [`Solution`]: bins used, then total waste.
///
/// Costs are ordered lexicographically with `bins` first, and lower is better.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cost {
    /// Number of bins used.
    pub bins: usize,

    /// Sum over all bins of the capacity left unused.
    pub waste: usize,
}

impl Cost {
    /// Computes the cost of `solution` for bins of length `capacity`.
    pub fn of(capacity: usize, solution: &Solution) -> Self {
        Self {
            bins: solution.len(),
            waste: solution.bins().iter().map(|b| b.remaining(capacity)).sum(),
        }
    }

    /// Returns whether this cost is strictly better than `other`.
    pub fn improves_on(&self, other: &Cost) -> bool {
        self < other
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bins, {} waste", self.bins, self.waste)
    }
}

/// Sum of squared bin loads.
///
/// Total waste only moves when the bin count moves, so moves that keep every bin are ranked by
/// this instead: a higher value means fuller bins next to emptier ones, which is what later lets
/// a bin be emptied out.
pub fn concentration(solution: &Solution) -> u128 {
    solution.bins().iter().map(squared_load).sum()
}

fn squared_load(bin: &Bin) -> u128 {
    let load = bin.load() as u128;
    load * load
}

/// Change in [`concentration`] when two bins go from loads `(a, b)` to `(new_a, new_b)`.
pub(crate) fn concentration_delta(a: usize, b: usize, new_a: usize, new_b: usize) -> i128 {
    let sq = |x: usize| (x as i128) * (x as i128);
    sq(new_a) + sq(new_b) - sq(a) - sq(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_of_solution() {
        let solution = Solution::from_bins(vec![vec![9], vec![1], vec![1]]);
        assert_eq!(Cost::of(10, &solution), Cost { bins: 3, waste: 19 });
        assert_eq!(Cost::of(10, &Solution::new()), Cost::default());
    }

    #[test]
    fn bin_count_dominates_waste() {
        let fewer_bins = Cost { bins: 2, waste: 15 };
        let less_waste = Cost { bins: 3, waste: 0 };
        assert!(fewer_bins.improves_on(&less_waste));
        assert!(!less_waste.improves_on(&fewer_bins));

        let same = Cost { bins: 2, waste: 15 };
        assert!(!same.improves_on(&fewer_bins));
        assert!(Cost { bins: 2, waste: 14 }.improves_on(&fewer_bins));
    }

    #[test]
    fn concentration_prefers_uneven_loads() {
        let even = Solution::from_bins(vec![vec![5], vec![5]]);
        let uneven = Solution::from_bins(vec![vec![9], vec![1]]);
        assert!(concentration(&uneven) > concentration(&even));
        assert_eq!(concentration_delta(5, 5, 9, 1), 82 - 50);
    }
}

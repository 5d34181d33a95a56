use super::{indices_by_load, MoveResult};
use crate::construct::sorted_decreasing;
use crate::deadline::Deadline;
use crate::packing::{Bin, Solution};

/// Tries to empty one bin by spreading its items over the other bins.
///
/// Only the least-full `fraction` of the bins (at least one) are candidates, least full first.
/// A candidate's items are placed longest first, each into the other bin it fills most tightly.
/// The first candidate whose items all find a place is eliminated; this is a greedy choice, not
/// a search over which bin is best to remove.
pub fn eliminate_bin(
    capacity: usize,
    solution: &Solution,
    fraction: f64,
    deadline: &Deadline,
) -> MoveResult {
    let bins = solution.bins();
    if bins.len() < 2 {
        return MoveResult::NoChange;
    }

    let order = indices_by_load(bins);
    for &target in &order[..candidate_count(bins.len(), fraction)] {
        if deadline.expired() {
            break;
        }

        if let Some(placements) = redistribute(capacity, bins, target) {
            let mut new_bins = bins.to_vec();
            for (dest, item) in placements {
                new_bins[dest].push(item);
            }
            new_bins.remove(target);
            return MoveResult::Improved(Solution::from_vec(new_bins));
        }
    }

    MoveResult::NoChange
}

fn candidate_count(num_bins: usize, fraction: f64) -> usize {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((num_bins as f64 * fraction).ceil() as usize).clamp(1, num_bins)
}

/// Where each item of `bins[target]` would go, as `(bin index, item)` pairs, or `None` if some
/// item fits nowhere.
fn redistribute(capacity: usize, bins: &[Bin], target: usize) -> Option<Vec<(usize, usize)>> {
    let mut loads: Vec<usize> = bins.iter().map(Bin::load).collect();
    let mut placements = Vec::with_capacity(bins[target].len());

    for item in sorted_decreasing(bins[target].items().iter().copied()) {
        let dest = loads
            .iter()
            .enumerate()
            .filter(|&(i, &load)| i != target && load + item <= capacity)
            .min_by_key(|&(_, &load)| capacity - load - item)
            .map(|(i, _)| i)?;

        loads[dest] += item;
        placements.push((dest, item));
    }

    Some(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Cost;

    #[test]
    fn eliminates_least_full_bin() {
        let solution = Solution::from_bins(vec![vec![9], vec![1], vec![1]]);
        let result = eliminate_bin(10, &solution, 1.0 / 3.0, &Deadline::unbounded());
        let new = result.into_solution().unwrap();
        assert_eq!(new.to_vecs(), vec![vec![9, 1], vec![1]]);
        assert_eq!(Cost::of(10, &new), Cost { bins: 2, waste: 9 });
    }

    #[test]
    fn items_go_to_tightest_bin() {
        // The 3 fills the 7 exactly and the 2 fills the 8.
        let solution = Solution::from_bins(vec![vec![6], vec![7], vec![8], vec![3, 2]]);
        let new = eliminate_bin(10, &solution, 1.0, &Deadline::unbounded())
            .into_solution()
            .unwrap();
        assert_eq!(new.to_vecs(), vec![vec![6], vec![7, 3], vec![8, 2]]);
    }

    #[test]
    fn falls_through_to_next_candidate() {
        // The lone 4 fits nowhere else, but the [4, 3] bin can be split over the others.
        let solution = Solution::from_bins(vec![vec![4], vec![4, 3], vec![7]]);
        let new = eliminate_bin(10, &solution, 1.0, &Deadline::unbounded())
            .into_solution()
            .unwrap();
        assert_eq!(new.to_vecs(), vec![vec![4, 4], vec![7, 3]]);

        // With only the least-full bin as a candidate nothing can be done.
        assert_eq!(
            eliminate_bin(10, &solution, 0.0, &Deadline::unbounded()),
            MoveResult::NoChange
        );
    }

    #[test]
    fn single_bin_is_never_eliminated() {
        let solution = Solution::from_bins(vec![vec![3]]);
        assert_eq!(
            eliminate_bin(10, &solution, 1.0, &Deadline::unbounded()),
            MoveResult::NoChange
        );
    }

    #[test]
    fn candidate_count_bounds() {
        assert_eq!(candidate_count(9, 1.0 / 3.0), 3);
        assert_eq!(candidate_count(2, 1.0 / 3.0), 1);
        assert_eq!(candidate_count(5, 0.0), 1);
        assert_eq!(candidate_count(5, f64::NAN), 1);
        assert_eq!(candidate_count(5, 3.0), 5);
    }
}

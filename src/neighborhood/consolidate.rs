use super::{indices_by_load, MoveResult};
use crate::packing::Solution;

/// Merges the first pair of bins, scanning least full first, whose loads fit in one bin.
///
/// The merged bin takes the place of the less-full bin of the pair. The first pair found wins,
/// which is not necessarily the pairing that leaves the least waste. With bins ordered by load
/// the first pair scanned is the two least-full bins, and if those don't fit together no other
/// pair does, so that pair is the only one checked.
pub fn consolidate_bins(capacity: usize, solution: &Solution) -> MoveResult {
    let bins = solution.bins();
    let order = indices_by_load(bins);
    let (i, j) = match order[..] {
        [i, j, ..] => (i, j),
        _ => return MoveResult::NoChange,
    };

    if bins[i].load() + bins[j].load() > capacity {
        return MoveResult::NoChange;
    }

    let mut new_bins = bins.to_vec();
    let absorbed = new_bins.remove(j);
    let keep = if j < i { i - 1 } else { i };
    new_bins[keep].absorb(&absorbed);
    MoveResult::Improved(Solution::from_vec(new_bins))
}

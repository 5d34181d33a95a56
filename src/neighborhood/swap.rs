use super::{Gain, MoveResult};
use crate::cost::concentration_delta;
use crate::deadline::Deadline;
use crate::packing::Solution;

struct Exchange {
    gain: Gain,
    a: usize,
    i: usize,
    b: usize,
    j: usize,
}

/// Exchanges the one pair of items, from two different bins, whose swap improves the packing
/// most.
///
/// Every pair of bins and every pair of items between them is scored, keeping both bins within
/// capacity. A swap never changes the bin count, so the score is the
/// [`concentration`](crate::cost::concentration) gained. At most one swap is applied per call,
/// and only if its gain is strictly positive.
pub fn swap_items(capacity: usize, solution: &Solution, deadline: &Deadline) -> MoveResult {
    let bins = solution.bins();
    let mut best: Option<Exchange> = None;

    for (a, first) in bins.iter().enumerate() {
        if deadline.expired() {
            break;
        }

        for (b, second) in bins.iter().enumerate().skip(a + 1) {
            let (load_a, load_b) = (first.load(), second.load());

            for (i, &x) in first.items().iter().enumerate() {
                for (j, &y) in second.items().iter().enumerate() {
                    if x == y {
                        continue;
                    }

                    let new_a = load_a - x + y;
                    let new_b = load_b - y + x;
                    if new_a > capacity || new_b > capacity {
                        continue;
                    }

                    let gain = Gain {
                        waste: 0,
                        concentration: concentration_delta(load_a, load_b, new_a, new_b),
                    };

                    if gain.is_positive() && best.as_ref().map_or(true, |e| gain > e.gain) {
                        best = Some(Exchange { gain, a, i, b, j });
                    }
                }
            }
        }
    }

    match best {
        Some(Exchange { a, i, b, j, .. }) => {
            let mut new_bins = solution.bins().to_vec();
            let x = new_bins[a].items()[i];
            let y = new_bins[b].replace_at(j, x);
            new_bins[a].replace_at(i, y);
            MoveResult::Improved(Solution::from_vec(new_bins))
        }
        None => MoveResult::NoChange,
    }
}

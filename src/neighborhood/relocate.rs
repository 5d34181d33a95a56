use super::{Gain, MoveResult};
use crate::cost::concentration_delta;
use crate::deadline::Deadline;
use crate::packing::Solution;

struct Relocation {
    gain: Gain,
    origin: usize,
    index: usize,
    dest: usize,
}

/// Moves the single item whose relocation to another bin improves the packing most.
///
/// Every (bin, item, destination bin) triple that keeps the destination within capacity is
/// scored. Emptying the origin bin removes a whole bin of waste and always ranks first; other
/// moves are ranked by the [`concentration`](crate::cost::concentration) they gain. Only a
/// strictly positive gain is applied, and the origin bin is dropped if left empty.
pub fn relocate_item(capacity: usize, solution: &Solution, deadline: &Deadline) -> MoveResult {
    let bins = solution.bins();
    let mut best: Option<Relocation> = None;

    for (origin, from) in bins.iter().enumerate() {
        if deadline.expired() {
            break;
        }

        let emptied = from.len() == 1;
        for (index, &item) in from.items().iter().enumerate() {
            for (dest, to) in bins.iter().enumerate() {
                if dest == origin || !to.fits(capacity, item) {
                    continue;
                }

                let gain = Gain {
                    waste: if emptied { capacity } else { 0 },
                    concentration: concentration_delta(
                        from.load(),
                        to.load(),
                        from.load() - item,
                        to.load() + item,
                    ),
                };

                if gain.is_positive() && best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Relocation {
                        gain,
                        origin,
                        index,
                        dest,
                    });
                }
            }
        }
    }

    match best {
        Some(Relocation {
            origin,
            index,
            dest,
            ..
        }) => {
            let mut new_bins = bins.to_vec();
            let item = new_bins[origin].remove_at(index);
            new_bins[dest].push(item);
            MoveResult::Improved(Solution::from_vec(new_bins))
        }
        None => MoveResult::NoChange,
    }
}

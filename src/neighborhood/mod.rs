//! Neighborhood operators.
//!
//! Every operator reads a [`Solution`] and either proposes a new one or reports that it found
//! nothing to do. The input is never modified. Candidate moves are evaluated on bin loads
//! alone, and the winning move is the only thing that gets materialized into a new
//! `Solution`, so a scan costs no copies.
//!
//! [`eliminate_bin`] and [`consolidate_bins`] are greedy: they commit the first move that
//! works in their scan order. [`relocate_item`] and [`swap_items`] scan their whole
//! neighborhood and commit the single best move.

mod consolidate;
mod eliminate;
mod relocate;
mod swap;

pub use consolidate::consolidate_bins;
pub use eliminate::eliminate_bin;
pub use relocate::relocate_item;
pub use swap::swap_items;

use crate::deadline::Deadline;
use crate::packing::{Bin, Solution};

/// Outcome of applying a neighborhood operator.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// The operator found a move; this is the resulting solution.
    Improved(Solution),

    /// The operator found no move.
    NoChange,
}

impl MoveResult {
    /// The proposed solution, if any.
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            MoveResult::Improved(solution) => Some(solution),
            MoveResult::NoChange => None,
        }
    }
}

/// Settings shared by all operators during one call.
#[derive(Clone, Debug)]
pub struct MoveContext<'a> {
    /// Bin capacity.
    pub capacity: usize,

    /// Share of the least-full bins [`eliminate_bin`] tries to empty.
    pub eliminate_fraction: f64,

    /// Checked inside the longer scans.
    pub deadline: &'a Deadline,
}

/// The neighborhood operators, in the order local search tries them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Empty one of the least-full bins into the others. See [`eliminate_bin`].
    EliminateBin,

    /// Merge two bins that fit together. See [`consolidate_bins`].
    ConsolidateBins,

    /// Move one item to another bin. See [`relocate_item`].
    RelocateItem,

    /// Exchange two items between bins. See [`swap_items`].
    SwapItems,
}

impl Operator {
    /// Bin-count reducing operators first, then the waste reducing ones.
    pub const PRIORITY: [Operator; 4] = [
        Operator::EliminateBin,
        Operator::ConsolidateBins,
        Operator::RelocateItem,
        Operator::SwapItems,
    ];

    /// Short name used in log output.
    pub fn name(self) -> &'static str {
        match self {
            Operator::EliminateBin => "eliminate-bin",
            Operator::ConsolidateBins => "consolidate-bins",
            Operator::RelocateItem => "relocate-item",
            Operator::SwapItems => "swap-items",
        }
    }

    /// Applies this operator to `solution`.
    pub fn apply(self, context: &MoveContext<'_>, solution: &Solution) -> MoveResult {
        let capacity = context.capacity;
        match self {
            Operator::EliminateBin => eliminate_bin(
                capacity,
                solution,
                context.eliminate_fraction,
                context.deadline,
            ),
            Operator::ConsolidateBins => consolidate_bins(capacity, solution),
            Operator::RelocateItem => relocate_item(capacity, solution, context.deadline),
            Operator::SwapItems => swap_items(capacity, solution, context.deadline),
        }
    }
}

/// Improvement of a single move: waste removed, then concentration gained.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Gain {
    pub(crate) waste: usize,
    pub(crate) concentration: i128,
}

impl Gain {
    pub(crate) fn is_positive(&self) -> bool {
        *self > Gain::default()
    }
}

/// Bin indices sorted by load, least full first. Equal loads keep creation order.
pub(crate) fn indices_by_load(bins: &[Bin]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..bins.len()).collect();
    order.sort_by_key(|&i| bins[i].load());
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_ordering() {
        let none = Gain::default();
        let spread = Gain {
            waste: 0,
            concentration: 4,
        };
        let emptied = Gain {
            waste: 10,
            concentration: 0,
        };
        assert!(!none.is_positive());
        assert!(spread.is_positive());
        assert!(emptied > spread);
        assert!(!Gain {
            waste: 0,
            concentration: -2
        }
        .is_positive());
    }

    #[test]
    fn indices_by_load_is_stable() {
        let solution = Solution::from_bins(vec![vec![5], vec![2], vec![5], vec![1, 1]]);
        assert_eq!(indices_by_load(solution.bins()), vec![1, 3, 0, 2]);
    }

    #[test]
    fn operators_leave_input_untouched() {
        let deadline = Deadline::unbounded();
        let context = MoveContext {
            capacity: 10,
            eliminate_fraction: 1.0,
            deadline: &deadline,
        };
        let solution = Solution::from_bins(vec![vec![6], vec![3], vec![2, 2], vec![5, 4]]);
        let before = solution.clone();

        for operator in Operator::PRIORITY {
            let _ = operator.apply(&context, &solution);
            assert_eq!(solution, before, "{} changed its input", operator.name());
        }
    }
}

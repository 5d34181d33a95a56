use crate::cost::{concentration, Cost};
use crate::deadline::Deadline;
use crate::neighborhood::{MoveContext, MoveResult, Operator};
use crate::packing::Solution;

use std::time::Duration;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Limits and settings for one local search descent.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct LocalSearchParams {
    /// Maximum number of rounds, where a round tries the operators until one is accepted.
    pub max_iterations: usize,

    /// Stop once this many rounds in a row accepted nothing. The operators are deterministic,
    /// so a round without a move means a local optimum has been reached and the default of 0
    /// stops right there.
    pub max_no_improvement: usize,

    /// Share of the least-full bins that bin elimination tries to empty.
    pub eliminate_fraction: f64,

    /// Wall-clock budget for a single descent, on top of any limit the caller imposes.
    pub time_limit: Option<Duration>,
}

impl Default for LocalSearchParams {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_no_improvement: 0,
            eliminate_fraction: 1.0 / 3.0,
            time_limit: None,
        }
    }
}

/// Descends to a local optimum by applying the neighborhood operators in
/// [`Operator::PRIORITY`] order.
///
/// Each round tries the operators in turn and keeps the first proposal that is accepted, then
/// starts the next round from the top. A proposal is accepted if it uses fewer bins, or the same
/// bins with less waste. Since waste only changes with the bin count, a proposal with equal
/// cost is also accepted when it raises the [`concentration`] of the loads; this is what lets
/// relocations and swaps prepare the ground for a later bin elimination. The returned solution
/// never costs more than the input.
#[derive(Clone, Debug, Default)]
pub struct LocalSearch {
    params: LocalSearchParams,
}

impl LocalSearch {
    /// Creates a local search with the given parameters.
    pub fn new(params: LocalSearchParams) -> Self {
        Self { params }
    }

    /// Improves `solution` until a local optimum or one of the limits is reached.
    #[tracing::instrument(
        level = "trace",
        name = "Local Search",
        skip_all,
        fields(bins = solution.len())
    )]
    pub fn run(&self, capacity: usize, solution: Solution, deadline: &Deadline) -> Solution {
        let deadline = deadline.capped(self.params.time_limit);
        let context = MoveContext {
            capacity,
            eliminate_fraction: self.params.eliminate_fraction,
            deadline: &deadline,
        };

        let mut current = solution;
        let mut cost = Cost::of(capacity, &current);
        let mut spread = concentration(&current);
        let mut no_improvement = 0;

        for _ in 0..self.params.max_iterations {
            if deadline.expired() {
                break;
            }

            let mut accepted = false;
            for operator in Operator::PRIORITY {
                let candidate = match operator.apply(&context, &current) {
                    MoveResult::Improved(candidate) => candidate,
                    MoveResult::NoChange => continue,
                };

                let candidate_cost = Cost::of(capacity, &candidate);
                let candidate_spread = concentration(&candidate);
                if accepts(cost, spread, candidate_cost, candidate_spread) {
                    tracing::trace!(
                        operator = operator.name(),
                        bins = candidate_cost.bins,
                        waste = candidate_cost.waste,
                        "move accepted"
                    );
                    current = candidate;
                    cost = candidate_cost;
                    spread = candidate_spread;
                    accepted = true;
                    break;
                }

                tracing::trace!(operator = operator.name(), "move rejected");
            }

            if accepted {
                no_improvement = 0;
            } else {
                no_improvement += 1;
                if no_improvement > self.params.max_no_improvement {
                    break;
                }
            }
        }

        current
    }
}

fn accepts(cost: Cost, spread: u128, candidate_cost: Cost, candidate_spread: u128) -> bool {
    candidate_cost.improves_on(&cost) || (candidate_cost == cost && candidate_spread > spread)
}

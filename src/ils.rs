use crate::cost::Cost;
use crate::deadline::Deadline;
use crate::instance::bins_lower_bound;
use crate::local_search::LocalSearch;
use crate::packing::Solution;
use crate::perturb::Perturbation;

use rand::Rng;
use std::time::Duration;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Limits and acceptance settings for the iterated local search.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct IlsParams {
    /// Maximum number of perturb and descend iterations.
    pub max_iterations: usize,

    /// Wall-clock budget for the whole search. `None` means no limit.
    pub time_limit: Option<Duration>,

    /// Probability of continuing from a perturbed solution that is worse than the current one.
    pub acceptance_probability: f64,
}

impl Default for IlsParams {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            time_limit: Some(Duration::from_secs(30)),
            acceptance_probability: 0.01,
        }
    }
}

/// Why an iterated local search stopped.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The iteration limit was reached.
    IterationLimit,

    /// The time limit was reached.
    TimeLimit,

    /// The cancellation flag was raised.
    Cancelled,

    /// The best solution uses as few bins as the total item length allows, so it cannot be
    /// improved.
    LowerBoundReached,
}

/// Counters collected while searching.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statistics {
    /// Perturb and descend iterations run.
    pub iterations: usize,

    /// Iterations where the perturbation had nothing to remove.
    pub idle_perturbations: usize,

    /// Worse solutions continued from by chance.
    pub random_walk_acceptances: usize,

    /// Iterations that went back to the best solution.
    pub resets: usize,

    /// Cost of the best solution each time it improved, with the iteration it happened in.
    /// Iteration 0 is the descent from the initial solution.
    pub improvements: Vec<(usize, Cost)>,

    /// Why the search stopped.
    pub stop_reason: StopReason,
}

impl Statistics {
    fn new() -> Self {
        Self {
            iterations: 0,
            idle_perturbations: 0,
            random_walk_acceptances: 0,
            resets: 0,
            improvements: Vec::new(),
            stop_reason: StopReason::IterationLimit,
        }
    }
}

/// Iterated local search: descend, then repeatedly perturb and descend again, keeping the best
/// solution seen.
///
/// After each perturbed descent the result replaces the best solution only if it costs strictly
/// less. The search continues from the result if it costs no more than the current solution,
/// or, with probability `acceptance_probability`, even when it costs more. Otherwise it goes
/// back to the best solution.
#[derive(Clone, Debug, Default)]
pub struct IteratedLocalSearch {
    params: IlsParams,
    local_search: LocalSearch,
    perturbation: Perturbation,
}

impl IteratedLocalSearch {
    /// Creates an iterated local search from its parts.
    pub fn new(params: IlsParams, local_search: LocalSearch, perturbation: Perturbation) -> Self {
        Self {
            params,
            local_search,
            perturbation,
        }
    }

    /// Runs the search from `initial` and returns the best solution found.
    ///
    /// `progress_callback` is called after every iteration with the share of the iteration or
    /// time budget used so far, whichever is larger.
    #[tracing::instrument(
        name = "ILS Search",
        skip_all,
        fields(capacity = capacity, bins = initial.len())
    )]
    pub fn run<R, F>(
        &self,
        capacity: usize,
        initial: Solution,
        deadline: &Deadline,
        rng: &mut R,
        progress_callback: F,
    ) -> (Solution, Statistics)
    where
        R: Rng + ?Sized,
        F: Fn(f64),
    {
        let deadline = deadline.capped(self.params.time_limit);
        let acceptance_probability = probability(self.params.acceptance_probability);
        let lower_bound = bins_lower_bound(capacity, initial.total_load());
        let mut stats = Statistics::new();

        let mut current = self.local_search.run(capacity, initial, &deadline);
        let mut current_cost = Cost::of(capacity, &current);
        let mut best = current.clone();
        let mut best_cost = current_cost;
        stats.improvements.push((0, best_cost));
        tracing::debug!(bins = best_cost.bins, waste = best_cost.waste, "initial descent");

        stats.stop_reason = loop {
            if best_cost.bins <= lower_bound {
                break StopReason::LowerBoundReached;
            }
            if deadline.is_cancelled() {
                break StopReason::Cancelled;
            }
            if deadline.is_time_up() {
                break StopReason::TimeLimit;
            }
            if stats.iterations >= self.params.max_iterations {
                break StopReason::IterationLimit;
            }
            stats.iterations += 1;

            let shaken = match self.perturbation.apply(capacity, &current, rng) {
                Some(shaken) => self.local_search.run(capacity, shaken, &deadline),
                None => {
                    stats.idle_perturbations += 1;
                    progress_callback(self.progress(stats.iterations, &deadline));
                    continue;
                }
            };
            let shaken_cost = Cost::of(capacity, &shaken);

            if shaken_cost.improves_on(&best_cost) {
                tracing::debug!(
                    iteration = stats.iterations,
                    bins = shaken_cost.bins,
                    waste = shaken_cost.waste,
                    "new best"
                );
                best = shaken.clone();
                best_cost = shaken_cost;
                stats.improvements.push((stats.iterations, best_cost));
            }

            if shaken_cost <= current_cost {
                current = shaken;
                current_cost = shaken_cost;
            } else if rng.gen_bool(acceptance_probability) {
                current = shaken;
                current_cost = shaken_cost;
                stats.random_walk_acceptances += 1;
            } else {
                current = best.clone();
                current_cost = best_cost;
                stats.resets += 1;
            }

            progress_callback(self.progress(stats.iterations, &deadline));
        };

        if stats.stop_reason == StopReason::Cancelled {
            tracing::warn!(iterations = stats.iterations, "search cancelled");
        }

        (best, stats)
    }

    fn progress(&self, iteration: usize, deadline: &Deadline) -> f64 {
        let by_iterations = if self.params.max_iterations == 0 {
            1.0
        } else {
            iteration as f64 / self.params.max_iterations as f64
        };
        let by_time = match self.params.time_limit {
            Some(limit) if !limit.is_zero() => {
                deadline.elapsed().as_secs_f64() / limit.as_secs_f64()
            }
            Some(_) => 1.0,
            None => 0.0,
        };
        by_iterations.max(by_time).min(1.0)
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

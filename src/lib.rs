//! bin-packer-ils packs items of integer length into the fewest bins of a fixed capacity.
//! It builds a starting packing with first-fit or best-fit decreasing, then improves it with
//! an iterated local search over bin elimination, consolidation, item relocation and item
//! swaps.

#![deny(missing_docs)]

mod construct;
mod cost;
mod deadline;
mod ils;
mod instance;
mod local_search;
pub mod neighborhood;
mod packing;
mod perturb;


pub use construct::{best_fit_decreasing, first_fit_decreasing, Construction, FitPolicy};
pub use cost::{concentration, Cost};
pub use deadline::Deadline;
pub use ils::{IlsParams, IteratedLocalSearch, Statistics, StopReason};
pub use instance::Instance;
pub use local_search::{LocalSearch, LocalSearchParams};
pub use packing::{Bin, Solution, UtilizationSummary};
pub use perturb::{Perturbation, Strength};

use instance::push_copies;
use rand::prelude::*;
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Error while building an instance or optimizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The bin capacity is zero.
    InvalidCapacity,

    /// An item is longer than the bin capacity, so no bin can hold it.
    InfeasibleItem {
        /// Length of the item.
        length: usize,

        /// Capacity of the bins.
        capacity: usize,
    },

    /// An item has zero length.
    ZeroLengthItem,

    /// A random instance was asked for with no item length to draw from.
    InvalidLengthRange {
        /// Shortest length asked for.
        min_length: usize,

        /// Longest length asked for, after capping it at the bin capacity.
        max_length: usize,
    },

    /// The items asked for, once quantities are expanded, don't fit in memory.
    TooManyItems,

    /// A text instance could not be read.
    Parse {
        /// 1-based line number where reading failed.
        line: usize,

        /// What was wrong with the line.
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidCapacity => write!(f, "bin capacity must be greater than zero"),
            Error::InfeasibleItem { length, capacity } => write!(
                f,
                "item of length {} does not fit in a bin of capacity {}",
                length, capacity
            ),
            Error::ZeroLengthItem => write!(f, "item length must be greater than zero"),
            Error::InvalidLengthRange {
                min_length,
                max_length,
            } => write!(f, "no item length between {} and {}", min_length, max_length),
            Error::TooManyItems => write!(f, "too many items to allocate"),
            Error::Parse { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl std::error::Error for Error {}

type Result<T> = std::result::Result<T, Error>;

/// Result of an optimization.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    /// Best packing found.
    pub solution: Solution,

    /// Cost of `solution`.
    pub cost: Cost,

    /// Cost of the packing the constructive heuristic started from.
    pub initial_cost: Cost,

    /// Constructive heuristic that produced the starting packing.
    pub construction: Construction,

    /// Bin capacity used.
    pub capacity: usize,

    /// No packing can use fewer bins than this.
    pub lower_bound: usize,

    /// Wall-clock time spent optimizing.
    pub elapsed: Duration,

    /// Counters from the iterated local search.
    pub statistics: Statistics,
}

impl Outcome {
    /// How many bins of the solution fall in each utilization band.
    pub fn utilization_summary(&self) -> UtilizationSummary {
        self.solution.utilization_summary(self.capacity)
    }
}

/// Optimizer for packing items into bins of a single capacity.
#[derive(Clone, Debug, Default)]
pub struct Optimizer {
    capacity: usize,
    // Item lengths and how many of each, expanded when optimizing.
    demands: Vec<(usize, usize)>,
    random_seed: u64,
    construction: Construction,
    ils_params: IlsParams,
    local_search_params: LocalSearchParams,
    perturbation: Perturbation,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Optimizer {
    /// Create a new optimizer.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the capacity of every bin.
    pub fn set_capacity(&mut self, capacity: usize) -> &mut Self {
        self.capacity = capacity;
        self
    }

    /// Replace the capacity and items with those of `instance`.
    pub fn set_instance(&mut self, instance: &Instance) -> &mut Self {
        self.capacity = instance.capacity();
        self.demands = instance.items().iter().map(|&length| (length, 1)).collect();
        self
    }

    /// Add an item that needs to be packed.
    pub fn add_item(&mut self, length: usize) -> &mut Self {
        self.demands.push((length, 1));
        self
    }

    /// Add items that need to be packed.
    pub fn add_items<I>(&mut self, lengths: I) -> &mut Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.demands.extend(lengths.into_iter().map(|length| (length, 1)));
        self
    }

    /// Add `quantity` items of the same length.
    pub fn add_item_quantity(&mut self, length: usize, quantity: usize) -> &mut Self {
        self.demands.push((length, quantity));
        self
    }

    /// Set the random seed used by the perturbations. Using the same random seed will give you
    /// the same result for the same input, as long as no time limit cuts the search short.
    pub fn set_random_seed(&mut self, seed: u64) -> &mut Self {
        self.random_seed = seed;
        self
    }

    /// Set the constructive heuristic used for the starting packing.
    pub fn set_construction(&mut self, construction: Construction) -> &mut Self {
        self.construction = construction;
        self
    }

    /// Set the wall-clock budget for the search.
    pub fn set_time_limit(&mut self, time_limit: Duration) -> &mut Self {
        self.ils_params.time_limit = Some(time_limit);
        self
    }

    /// Set the number of perturb and descend iterations.
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> &mut Self {
        self.ils_params.max_iterations = max_iterations;
        self
    }

    /// Set how the search perturbs a solution between descents.
    pub fn set_perturbation(&mut self, perturbation: Perturbation) -> &mut Self {
        self.perturbation = perturbation;
        self
    }

    /// Set the probability of continuing from a perturbed solution that is worse than the
    /// current one. Values outside `0.0..=1.0` are clamped.
    pub fn set_acceptance_probability(&mut self, probability: f64) -> &mut Self {
        self.ils_params.acceptance_probability = probability;
        self
    }

    /// Set the parameters of each local search descent.
    pub fn set_local_search(&mut self, params: LocalSearchParams) -> &mut Self {
        self.local_search_params = params;
        self
    }

    /// Set a flag that stops the search, keeping the best solution so far, once it's raised.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) -> &mut Self {
        self.cancel_flag = Some(flag);
        self
    }

    /// Perform optimization
    pub fn optimize<F>(&self, progress_callback: F) -> Result<Outcome>
    where
        F: Fn(f64),
    {
        let mut items = Vec::new();
        for &(length, quantity) in &self.demands {
            if !push_copies(&mut items, length, quantity) {
                return Err(Error::TooManyItems);
            }
        }
        let instance = Instance::new(self.capacity, items)?;
        let capacity = instance.capacity();

        let mut deadline = Deadline::unbounded();
        if let Some(flag) = &self.cancel_flag {
            deadline = deadline.with_cancel_flag(Arc::clone(flag));
        }

        let (initial, construction) = self.construction.build(&instance);
        let initial_cost = Cost::of(capacity, &initial);
        tracing::debug!(
            ?construction,
            bins = initial_cost.bins,
            waste = initial_cost.waste,
            "constructed"
        );

        let search = IteratedLocalSearch::new(
            self.ils_params.clone(),
            LocalSearch::new(self.local_search_params.clone()),
            self.perturbation,
        );
        let mut rng: StdRng = SeedableRng::seed_from_u64(self.random_seed);
        let (solution, statistics) =
            search.run(capacity, initial, &deadline, &mut rng, progress_callback);
        debug_assert!(solution.check(&instance));

        let cost = Cost::of(capacity, &solution);
        let elapsed = deadline.elapsed();
        tracing::info!(
            items = instance.len(),
            bins = cost.bins,
            waste = cost.waste,
            lower_bound = instance.lower_bound(),
            iterations = statistics.iterations,
            stop_reason = ?statistics.stop_reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "optimized"
        );

        Ok(Outcome {
            solution,
            cost,
            initial_cost,
            construction,
            capacity,
            lower_bound: instance.lower_bound(),
            elapsed,
            statistics,
        })
    }
}

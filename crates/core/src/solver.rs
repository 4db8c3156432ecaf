//! Solver traits and configuration.

use crate::geometry::{BoxItem, ContainerType};
use crate::result::PackingResult;
use crate::Result;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Packing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Backtracking search over container-count budgets (slow, fewest containers).
    Exhaustive,
    /// First-fit decreasing (fast, single pass).
    Greedy,
    /// Per-container multi-heuristic search, committing the best container each round.
    Hybrid,
    /// Four whole-problem strategies, keeping the best utilization.
    #[default]
    Optimal,
}

impl Strategy {
    /// Returns the display name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Exhaustive => "Exhaustive",
            Strategy::Greedy => "Greedy",
            Strategy::Hybrid => "Hybrid",
            Strategy::Optimal => "Optimal",
        }
    }
}

/// Common configuration for packers.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Packing strategy.
    pub strategy: Strategy,

    /// Number of random permutations tried by the hybrid random heuristic.
    pub random_starts: usize,

    /// Seed for the hybrid random heuristic (`None` = entropy).
    pub seed: Option<u64>,

    /// Number of free spaces kept by the capped split.
    pub free_space_cap: usize,

    /// Evaluate independent branches on the rayon thread pool.
    pub parallel: bool,

    /// Maximum computation time in milliseconds (0 = unlimited).
    pub time_limit_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            random_starts: 10,
            seed: None,
            free_space_cap: 20,
            parallel: true,
            time_limit_ms: 0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the packing strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the number of random starts.
    pub fn with_random_starts(mut self, n: usize) -> Self {
        self.random_starts = n;
        self
    }

    /// Seeds the random heuristic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the capped split size (at least 1).
    pub fn with_free_space_cap(mut self, cap: usize) -> Self {
        self.free_space_cap = cap.max(1);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the time limit in milliseconds.
    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Milestones reported while packing.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The exhaustive search starts with a container budget.
    BudgetStarted {
        /// Maximum number of containers.
        limit: usize,
    },
    /// The exhaustive search found no solution under a budget.
    BudgetExhausted {
        /// Maximum number of containers.
        limit: usize,
        /// Placements attempted under this budget.
        attempts: u64,
    },
    /// A box was placed by a single-pass strategy.
    BoxPlaced {
        /// 0-based index of the box in packing order.
        index: usize,
        /// Number of boxes in the run.
        total: usize,
        /// Containers open after the placement.
        containers: usize,
    },
    /// The hybrid packer committed a container.
    ContainerCommitted {
        /// Container type label.
        label: String,
        /// Boxes packed into it.
        boxes: usize,
        /// Its utilization.
        utilization: f64,
        /// Boxes still unpacked.
        remaining: usize,
    },
    /// One of the optimal packer's strategies finished.
    StrategyFinished {
        /// Strategy name.
        name: String,
        /// Containers and utilization, or `None` if the strategy failed.
        outcome: Option<(usize, f64)>,
    },
    /// The run succeeded.
    Finished {
        /// Containers used.
        containers: usize,
        /// Overall utilization.
        utilization: f64,
    },
}

/// Trait for packing solvers.
pub trait Solver {
    /// Packs every box into containers drawn from the catalog.
    ///
    /// Succeeds only when every box is placed.
    fn solve(&self, boxes: &[BoxItem], catalog: &[ContainerType]) -> Result<PackingResult>;

    /// Packs with a progress callback.
    fn solve_with_progress(
        &self,
        boxes: &[BoxItem],
        catalog: &[ContainerType],
        callback: ProgressCallback,
    ) -> Result<PackingResult>;

    /// Cancels an ongoing solve operation.
    fn cancel(&self);
}

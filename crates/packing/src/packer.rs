//! Strategy-dispatching packer.

use crate::exhaustive::ExhaustivePacker;
use crate::greedy::GreedyPacker;
use crate::hybrid::HybridPacker;
use crate::optimal::OptimalPacker;
use crate::packing_utils::run_packing;
use bopax_core::{
    BoxItem, Config, ContainerType, PackingResult, ProgressCallback, Result, Solver, Strategy,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 3D bin packer running the strategy selected in its [`Config`].
pub struct Packer {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl Packer {
    /// Creates a new packer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run(
        &self,
        boxes: &[BoxItem],
        catalog: &[ContainerType],
        progress: Option<&ProgressCallback>,
    ) -> Result<PackingResult> {
        let config = self.config.clone();
        let cancelled = &self.cancelled;
        match self.config.strategy {
            Strategy::Exhaustive => run_packing(
                &ExhaustivePacker::new(config),
                &self.config,
                cancelled,
                boxes,
                catalog,
                progress,
            ),
            Strategy::Greedy => run_packing(
                &GreedyPacker::new(config),
                &self.config,
                cancelled,
                boxes,
                catalog,
                progress,
            ),
            Strategy::Hybrid => run_packing(
                &HybridPacker::new(config),
                &self.config,
                cancelled,
                boxes,
                catalog,
                progress,
            ),
            Strategy::Optimal => run_packing(
                &OptimalPacker::new(config),
                &self.config,
                cancelled,
                boxes,
                catalog,
                progress,
            ),
        }
    }
}

impl Solver for Packer {
    fn solve(&self, boxes: &[BoxItem], catalog: &[ContainerType]) -> Result<PackingResult> {
        self.run(boxes, catalog, None)
    }

    fn solve_with_progress(
        &self,
        boxes: &[BoxItem],
        catalog: &[ContainerType],
        callback: ProgressCallback,
    ) -> Result<PackingResult> {
        self.run(boxes, catalog, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

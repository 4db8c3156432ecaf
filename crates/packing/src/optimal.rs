//! Multi-strategy packer keeping the best whole-problem result.
//!
//! Four independent packings run over the volume-sorted boxes, each placing
//! with the capped first-fit rule:
//!
//! 1. **Largest first**: new containers use the largest admitting type.
//! 2. **Smallest first**: new containers use the smallest admitting type.
//! 3. **Best fit**: new containers use the admitting type with the least
//!    leftover volume for the box that opens it.
//! 4. **Mixed**: each step fills one fresh container of every type from the
//!    remaining pool and commits the highest-utilization one.
//!
//! A pass either places every box or is discarded. The result with the
//! highest overall utilization wins; ties keep the earlier pass. With
//! `Config::parallel` the passes run on the rayon pool.

use crate::packing_utils::{
    catalog_by_volume_desc, overall_utilization, run_packing, sorted_by_volume, PackingStrategy,
    RunContext,
};
use crate::placement::place_first_fit;
use bopax_core::{
    BoxItem, Config, ContainerType, Error, PackingContainer, PackingResult, ProgressCallback,
    ProgressEvent, Result, Solver, SplitRule,
};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The whole-problem passes compared by [`OptimalPacker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Largest catalog type for every new container.
    LargestFirst,
    /// Smallest catalog type for every new container.
    SmallestFirst,
    /// Least leftover volume for the opening box.
    BestFit,
    /// Per-step comparison of a full container of every type.
    Mixed,
}

impl Pass {
    /// All passes, in tie-break order.
    pub const ALL: [Pass; 4] = [
        Pass::LargestFirst,
        Pass::SmallestFirst,
        Pass::BestFit,
        Pass::Mixed,
    ];

    /// Returns the display name of the pass.
    pub fn name(&self) -> &'static str {
        match self {
            Pass::LargestFirst => "LargestFirst",
            Pass::SmallestFirst => "SmallestFirst",
            Pass::BestFit => "BestFit",
            Pass::Mixed => "Mixed",
        }
    }
}

/// Best-of-four-strategies packer.
pub struct OptimalPacker {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl OptimalPacker {
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

    fn rule(&self) -> SplitRule {
        SplitRule::Capped(self.config.free_space_cap)
    }

    /// Runs a single pass; `None` if some box could not be placed.
    pub(crate) fn run_pass(
        &self,
        pass: Pass,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
    ) -> Option<Vec<PackingContainer>> {
        let by_volume = catalog_by_volume_desc(catalog);
        match pass {
            Pass::LargestFirst => self.pack_with_order(boxes, |_| by_volume.clone()),
            Pass::SmallestFirst => {
                let smallest: Vec<ContainerType> = by_volume.iter().rev().cloned().collect();
                self.pack_with_order(boxes, |_| smallest.clone())
            }
            Pass::BestFit => self.pack_with_order(boxes, |item| best_fit_order(item, catalog)),
            Pass::Mixed => self.pack_mixed(boxes, &by_volume),
        }
    }

    /// First fit into open containers; otherwise opens the first type of
    /// `order(item)` that takes the box.
    fn pack_with_order<F>(&self, boxes: &[Arc<BoxItem>], order: F) -> Option<Vec<PackingContainer>>
    where
        F: Fn(&BoxItem) -> Vec<ContainerType>,
    {
        let rule = self.rule();
        let mut containers: Vec<PackingContainer> = Vec::new();

        for item in boxes {
            if containers
                .iter_mut()
                .any(|container| place_first_fit(container, item, rule))
            {
                continue;
            }

            let container = order(item.as_ref())
                .iter()
                .map(PackingContainer::from_type)
                .find_map(|mut container| {
                    place_first_fit(&mut container, item, rule).then_some(container)
                })?;
            containers.push(container);
        }

        Some(containers)
    }

    fn pack_mixed(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
    ) -> Option<Vec<PackingContainer>> {
        let rule = self.rule();
        let mut remaining: Vec<Arc<BoxItem>> = boxes.to_vec();
        let mut containers = Vec::new();

        while !remaining.is_empty() {
            let mut best: Option<(PackingContainer, Vec<bool>)> = None;
            let mut best_utilization = 0.0;

            for container_type in catalog {
                let mut container = PackingContainer::from_type(container_type);
                let packed: Vec<bool> = remaining
                    .iter()
                    .map(|item| place_first_fit(&mut container, item, rule))
                    .collect();
                if container.is_empty() {
                    continue;
                }
                let utilization = container.utilization();
                if utilization > best_utilization {
                    best_utilization = utilization;
                    best = Some((container, packed));
                }
            }

            let (container, packed) = best?;
            remaining = remaining
                .into_iter()
                .zip(packed)
                .filter_map(|(item, packed)| (!packed).then_some(item))
                .collect();
            containers.push(container);
        }

        Some(containers)
    }
}

/// Admitting catalog types by ascending leftover volume; ties keep catalog order.
fn best_fit_order(item: &BoxItem, catalog: &[ContainerType]) -> Vec<ContainerType> {
    let mut order: Vec<ContainerType> = catalog
        .iter()
        .filter(|t| t.admits(item))
        .cloned()
        .collect();
    order.sort_by_key(|t| t.volume() - item.volume());
    order
}

impl PackingStrategy for OptimalPacker {
    fn name(&self) -> &'static str {
        "Optimal"
    }

    fn pack(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        ctx: &RunContext<'_>,
    ) -> Result<Vec<PackingContainer>> {
        let order = sorted_by_volume(boxes);
        let run = |pass: &Pass| self.run_pass(*pass, &order, catalog);

        let outcomes: Vec<Option<Vec<PackingContainer>>> = if self.config.parallel {
            Pass::ALL.par_iter().map(run).collect()
        } else {
            Pass::ALL.iter().map(run).collect()
        };

        let mut best: Option<(Pass, Vec<PackingContainer>)> = None;
        let mut best_utilization = 0.0;

        for (pass, outcome) in Pass::ALL.into_iter().zip(outcomes) {
            ctx.checkpoint()?;
            match outcome {
                Some(containers) => {
                    let utilization = overall_utilization(&containers);
                    log::debug!(
                        "optimal: {} used {} containers at {:.1}%",
                        pass.name(),
                        containers.len(),
                        utilization * 100.0
                    );
                    ctx.emit(ProgressEvent::StrategyFinished {
                        name: pass.name().to_string(),
                        outcome: Some((containers.len(), utilization)),
                    });
                    if utilization > best_utilization {
                        best_utilization = utilization;
                        best = Some((pass, containers));
                    }
                }
                None => {
                    log::debug!("optimal: {} failed", pass.name());
                    ctx.emit(ProgressEvent::StrategyFinished {
                        name: pass.name().to_string(),
                        outcome: None,
                    });
                }
            }
        }

        match best {
            Some((pass, containers)) => {
                log::debug!("optimal: keeping {}", pass.name());
                Ok(containers)
            }
            None => Err(Error::NoSolutionFound(
                "every optimal pass failed to place all boxes".to_string(),
            )),
        }
    }
}

impl Solver for OptimalPacker {
    fn solve(&self, boxes: &[BoxItem], catalog: &[ContainerType]) -> Result<PackingResult> {
        run_packing(self, &self.config, &self.cancelled, boxes, catalog, None)
    }

    fn solve_with_progress(
        &self,
        boxes: &[BoxItem],
        catalog: &[ContainerType],
        callback: ProgressCallback,
    ) -> Result<PackingResult> {
        run_packing(self, &self.config, &self.cancelled, boxes, catalog, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

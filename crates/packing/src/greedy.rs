//! Greedy first-fit decreasing packer.
//!
//! Boxes are sorted by volume (largest first) and placed in a single forward
//! pass: each box goes into the first open container that accepts it, or
//! into a new container of the largest catalog type it fits. Free spaces use
//! the capped split, so the cost per placement is bounded.

use crate::packing_utils::{
    catalog_by_volume_desc, run_packing, sorted_by_volume, PackingStrategy, RunContext,
};
use crate::placement::place_first_fit;
use bopax_core::{
    BoxItem, Config, ContainerType, Error, PackingContainer, PackingResult, ProgressCallback,
    ProgressEvent, Result, Solver, SplitRule,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// First-fit decreasing packer.
pub struct GreedyPacker {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl GreedyPacker {
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
}

impl PackingStrategy for GreedyPacker {
    fn name(&self) -> &'static str {
        "Greedy"
    }

    fn pack(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        ctx: &RunContext<'_>,
    ) -> Result<Vec<PackingContainer>> {
        let catalog = catalog_by_volume_desc(catalog);
        let order = sorted_by_volume(boxes);
        let rule = SplitRule::Capped(self.config.free_space_cap);
        let mut containers: Vec<PackingContainer> = Vec::new();

        for (index, item) in order.iter().enumerate() {
            let placed = containers
                .iter_mut()
                .any(|container| place_first_fit(container, item, rule));

            if !placed {
                let mut container = catalog
                    .iter()
                    .find(|t| t.admits(item))
                    .map(PackingContainer::from_type)
                    .ok_or_else(|| unplaceable(item))?;
                if !place_first_fit(&mut container, item, rule) {
                    return Err(unplaceable(item));
                }
                containers.push(container);
            }

            ctx.emit(ProgressEvent::BoxPlaced {
                index,
                total: order.len(),
                containers: containers.len(),
            });
        }

        Ok(containers)
    }
}

fn unplaceable(item: &BoxItem) -> Error {
    let d = item.dimensions();
    Error::UnsolvableInput(format!(
        "could not place box {} ('{}', {}x{}x{})",
        item.id(),
        item.label(),
        d.x,
        d.y,
        d.z
    ))
}

impl Solver for GreedyPacker {
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

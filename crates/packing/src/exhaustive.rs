//! Backtracking search over container-count budgets.
//!
//! Budgets `1..=n` are tried in order. Under a budget, every box is tried in
//! every open container (free-space corners sorted by (z, y, x), each
//! rotation), and, while the budget allows, in exactly one new container:
//! the first catalog type, in input order, that takes the box at the origin.
//! The first budget whose search places all boxes wins, so the result uses
//! the fewest containers reachable under this candidate rule.
//!
//! Each tentative placement is bracketed by a full container snapshot; a
//! failed subtree restores it exactly.

use crate::packing_utils::{run_packing, sorted_by_volume, PackingStrategy, RunContext};
use bopax_core::{
    BoxItem, Config, ContainerType, Error, PackingContainer, PackingResult, ProgressCallback,
    ProgressEvent, Result, Solver, Vec3,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Attempts between cancellation/time-limit checks.
const CHECK_INTERVAL: u64 = 256;

/// Backtracking packer minimizing the container count.
pub struct ExhaustivePacker {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl ExhaustivePacker {
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

impl PackingStrategy for ExhaustivePacker {
    fn name(&self) -> &'static str {
        "Exhaustive"
    }

    fn pack(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        ctx: &RunContext<'_>,
    ) -> Result<Vec<PackingContainer>> {
        let order = sorted_by_volume(boxes);

        for limit in 1..=order.len() {
            ctx.emit(ProgressEvent::BudgetStarted { limit });
            ctx.checkpoint()?;

            let mut search = Search::new(&order, catalog, limit, ctx);
            if search.backtrack(0)? {
                log::debug!(
                    "exhaustive: solved with budget {} after {} attempts",
                    limit,
                    search.attempts
                );
                return Ok(search.containers);
            }

            log::debug!(
                "exhaustive: no solution with {} containers ({} attempts)",
                limit,
                search.attempts
            );
            ctx.emit(ProgressEvent::BudgetExhausted {
                limit,
                attempts: search.attempts,
            });
        }

        Err(Error::NoSolutionFound(format!(
            "no packing of {} boxes within {} containers",
            order.len(),
            order.len()
        )))
    }
}

/// Search state for one container budget.
struct Search<'a> {
    boxes: &'a [Arc<BoxItem>],
    catalog: &'a [ContainerType],
    limit: usize,
    ctx: &'a RunContext<'a>,
    containers: Vec<PackingContainer>,
    attempts: u64,
}

impl<'a> Search<'a> {
    fn new(
        boxes: &'a [Arc<BoxItem>],
        catalog: &'a [ContainerType],
        limit: usize,
        ctx: &'a RunContext<'a>,
    ) -> Self {
        Self {
            boxes,
            catalog,
            limit,
            ctx,
            containers: Vec::with_capacity(limit),
            attempts: 0,
        }
    }

    /// Places `boxes[index..]`; on failure the containers are left exactly
    /// as they were on entry.
    fn backtrack(&mut self, index: usize) -> Result<bool> {
        let Some(item) = self.boxes.get(index).map(Arc::clone) else {
            return Ok(true);
        };

        self.attempts += 1;
        if self.attempts % CHECK_INTERVAL == 0 {
            self.ctx.checkpoint()?;
        }

        let rotations = item.rotations();

        for c in 0..self.containers.len() {
            let spaces = self.containers[c].sorted_free_spaces();
            for rotation in &rotations {
                for space in &spaces {
                    if !space.can_fit(rotation)
                        || !self.containers[c].can_place_box(rotation, &space.position)
                    {
                        continue;
                    }

                    let snapshot = self.containers[c].snapshot();
                    if self.containers[c].place_box(&item, space.position, *rotation)
                        && self.backtrack(index + 1)?
                    {
                        return Ok(true);
                    }
                    self.containers[c].restore(snapshot);
                }
            }
        }

        if self.containers.len() < self.limit {
            if let Some(container) = self.open_for(&item, &rotations) {
                self.containers.push(container);
                if self.backtrack(index + 1)? {
                    return Ok(true);
                }
                self.containers.pop();
            }
        }

        Ok(false)
    }

    /// The single new-container attempt for a box: the first catalog type
    /// that takes the box at the origin, with the first rotation that fits.
    fn open_for(&self, item: &Arc<BoxItem>, rotations: &[Vec3]) -> Option<PackingContainer> {
        let origin = Vec3::zeros();
        self.catalog.iter().find_map(|container_type| {
            let mut container = PackingContainer::from_type(container_type);
            let rotation = rotations
                .iter()
                .find(|r| container.can_place_box(r, &origin))?;
            container
                .place_box(item, origin, *rotation)
                .then_some(container)
        })
    }
}

impl Solver for ExhaustivePacker {
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

#[cfg(test)]
mod tests {
    use super::*;
    use bopax_core::{expand_box_types, BoxType};
    use std::sync::Mutex;

    #[test]
    fn test_single_box_uses_first_admitting_type() {
        let catalog = vec![
            ContainerType::new("Tiny", 50, 50, 50),
            ContainerType::new("Small", 150, 150, 150),
            ContainerType::new("Large", 500, 500, 500),
        ];
        let boxes = vec![BoxItem::new("Test", 100, 100, 100, 1)];
        let result = ExhaustivePacker::default_config().solve(&boxes, &catalog).unwrap();

        assert_eq!(result.total_containers, 1);
        assert_eq!(result.containers[0].container_type, "Small");
    }

    #[test]
    fn test_places_into_existing_container_at_budget() {
        // With budget 1 the second box must go into the already open container.
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = expand_box_types(&[BoxType::new("Half", 100, 100, 50).with_quantity(2)]);
        let result = ExhaustivePacker::default_config().solve(&boxes, &catalog).unwrap();

        assert_eq!(result.total_containers, 1);
        assert_eq!(result.overall_utilization, 1.0);
    }

    #[test]
    fn test_minimum_container_count() {
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = expand_box_types(&[BoxType::new("Block", 60, 100, 100).with_quantity(3)]);
        let result = ExhaustivePacker::default_config().solve(&boxes, &catalog).unwrap();
        assert_eq!(result.total_containers, 3);
    }

    #[test]
    fn test_mixed_sizes_share_one_container() {
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = vec![
            BoxItem::new("Slab", 100, 100, 50, 1),
            BoxItem::new("Cube", 50, 50, 50, 2),
            BoxItem::new("Bar", 50, 100, 50, 3),
        ];
        let result = ExhaustivePacker::default_config().solve(&boxes, &catalog).unwrap();
        assert_eq!(result.total_containers, 1);
        assert_eq!(result.total_boxes(), 3);
    }

    #[test]
    fn test_budget_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = expand_box_types(&[BoxType::new("Full", 100, 100, 100).with_quantity(2)]);

        let result = ExhaustivePacker::default_config()
            .solve_with_progress(
                &boxes,
                &catalog,
                Box::new(move |event| sink.lock().unwrap().push(event)),
            )
            .unwrap();
        assert_eq!(result.total_containers, 2);

        let events = events.lock().unwrap();
        assert_eq!(events[0], ProgressEvent::BudgetStarted { limit: 1 });
        assert!(matches!(
            events[1],
            ProgressEvent::BudgetExhausted { limit: 1, .. }
        ));
        assert_eq!(events[2], ProgressEvent::BudgetStarted { limit: 2 });
    }

    #[test]
    fn test_cancel_from_observer() {
        let packer = Arc::new(ExhaustivePacker::default_config());
        let handle = Arc::clone(&packer);
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = vec![BoxItem::new("B", 10, 10, 10, 1)];

        let result = packer.solve_with_progress(
            &boxes,
            &catalog,
            Box::new(move |event| {
                if matches!(event, ProgressEvent::BudgetStarted { .. }) {
                    handle.cancel();
                }
            }),
        );
        assert_eq!(result, Err(Error::Cancelled));
    }

    #[test]
    fn test_unsolvable() {
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        let boxes = vec![BoxItem::new("Huge", 1000, 1000, 1000, 1)];
        let result = ExhaustivePacker::default_config().solve(&boxes, &catalog);
        assert!(matches!(result, Err(Error::UnsolvableInput(_))));
    }
}

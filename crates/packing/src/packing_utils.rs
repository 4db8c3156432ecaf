//! Shared utilities for the packers.
//!
//! # Extracted Components
//!
//! - [`RunContext`]: cancellation, time limit and progress reporting for one run
//! - [`run_packing`]: validation, empty/unsolvable short-circuits and result
//!   formatting around a strategy's `pack`
//! - [`sorted_by_volume`] / [`catalog_by_volume_desc`]: the stable orderings
//!   every strategy starts from

use bopax_core::{
    normalize_catalog, BoxItem, Config, ContainerType, Coord, Error, PackingContainer,
    PackingResult, ProgressCallback, ProgressEvent, Result, TotalVolume,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Per-run state shared by a strategy and its helpers.
pub struct RunContext<'a> {
    progress: Option<&'a ProgressCallback>,
    cancelled: &'a AtomicBool,
    started: Instant,
    time_limit_ms: u64,
}

impl<'a> RunContext<'a> {
    /// Creates a context; `time_limit_ms == 0` means unlimited.
    pub fn new(
        cancelled: &'a AtomicBool,
        time_limit_ms: u64,
        progress: Option<&'a ProgressCallback>,
    ) -> Self {
        Self {
            progress,
            cancelled,
            started: Instant::now(),
            time_limit_ms,
        }
    }

    /// Reports a progress milestone to the observer, if any.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = self.progress {
            callback(event);
        }
    }

    /// Fails if the run was cancelled or ran past its time limit.
    pub fn checkpoint(&self) -> Result<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(Error::Cancelled);
        }
        if self.time_limit_ms > 0 && self.elapsed_ms() > self.time_limit_ms {
            return Err(Error::Timeout(self.time_limit_ms));
        }
        Ok(())
    }

    /// Milliseconds since the run started.
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// A whole-problem packing strategy.
pub(crate) trait PackingStrategy: Sync {
    /// Display name recorded in the result.
    fn name(&self) -> &'static str;

    /// Packs every box or fails. Boxes are validated, non-empty, and each
    /// fits at least one catalog type.
    fn pack(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        ctx: &RunContext<'_>,
    ) -> Result<Vec<PackingContainer>>;
}

/// Runs a strategy end to end and formats its result.
pub(crate) fn run_packing<S: PackingStrategy + ?Sized>(
    strategy: &S,
    config: &Config,
    cancelled: &AtomicBool,
    boxes: &[BoxItem],
    catalog: &[ContainerType],
    progress: Option<&ProgressCallback>,
) -> Result<PackingResult> {
    cancelled.store(false, Ordering::Relaxed);
    let ctx = RunContext::new(cancelled, config.time_limit_ms, progress);

    let (items, catalog) = prepare_input(boxes, catalog)?;
    log::debug!(
        "{}: packing {} boxes into catalog {:?}",
        strategy.name(),
        items.len(),
        catalog.iter().map(ContainerType::label).collect::<Vec<_>>()
    );

    let containers = if items.is_empty() {
        Vec::new()
    } else {
        ensure_admissible(&items, &catalog)?;
        strategy.pack(&items, &catalog, &ctx)?
    };

    let placed: usize = containers.iter().map(PackingContainer::box_count).sum();
    if placed != items.len() {
        return Err(Error::NoSolutionFound(format!(
            "{} placed {} of {} boxes",
            strategy.name(),
            placed,
            items.len()
        )));
    }

    let mut result = PackingResult::from_containers(&containers).with_strategy(strategy.name());
    result.computation_time_ms = ctx.elapsed_ms();

    log::info!(
        "{}: {} boxes in {} containers, {} utilization",
        strategy.name(),
        placed,
        result.total_containers,
        result.utilization_percent()
    );
    ctx.emit(ProgressEvent::Finished {
        containers: result.total_containers,
        utilization: result.overall_utilization,
    });

    Ok(result)
}

/// Validates the input and normalizes the catalog.
pub fn prepare_input(
    boxes: &[BoxItem],
    catalog: &[ContainerType],
) -> Result<(Vec<Arc<BoxItem>>, Vec<ContainerType>)> {
    for item in boxes {
        item.validate()?;
    }
    for container_type in catalog {
        container_type.validate()?;
    }
    let items = boxes.iter().cloned().map(Arc::new).collect();
    Ok((items, normalize_catalog(catalog)))
}

/// Fails with [`Error::UnsolvableInput`] if some box fits no catalog type.
pub fn ensure_admissible(boxes: &[Arc<BoxItem>], catalog: &[ContainerType]) -> Result<()> {
    match boxes
        .iter()
        .find(|item| !catalog.iter().any(|t| t.admits(item)))
    {
        Some(item) => {
            let d = item.dimensions();
            Err(Error::UnsolvableInput(format!(
                "box {} ('{}', {}x{}x{}) fits no container type in any rotation",
                item.id(),
                item.label(),
                d.x,
                d.y,
                d.z
            )))
        }
        None => Ok(()),
    }
}

/// Boxes ordered by descending volume; equal volumes keep input order.
pub fn sorted_by_volume(boxes: &[Arc<BoxItem>]) -> Vec<Arc<BoxItem>> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by(|a, b| b.volume().cmp(&a.volume()));
    sorted
}

/// Catalog ordered by descending volume; equal volumes keep input order.
pub fn catalog_by_volume_desc(catalog: &[ContainerType]) -> Vec<ContainerType> {
    let mut sorted = catalog.to_vec();
    sorted.sort_by(|a, b| b.volume().cmp(&a.volume()));
    sorted
}

/// Used volume over available volume for a set of containers.
pub fn overall_utilization(containers: &[PackingContainer]) -> f64 {
    let total = |volume: fn(&PackingContainer) -> Coord| -> TotalVolume {
        containers.iter().map(|c| TotalVolume::from(volume(c))).sum()
    };
    let available = total(PackingContainer::volume);
    if available > 0 {
        let used = total(PackingContainer::used_volume);
        used as f64 / available as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bopax_core::Vec3;
    use std::sync::Mutex;

    fn items(dims: &[(i64, i64, i64)]) -> Vec<Arc<BoxItem>> {
        dims.iter()
            .enumerate()
            .map(|(i, &(w, d, h))| Arc::new(BoxItem::new("B", w, d, h, i + 1)))
            .collect()
    }

    #[test]
    fn test_sorted_by_volume_is_stable() {
        let boxes = items(&[(1, 1, 1), (2, 2, 2), (1, 1, 8), (3, 3, 3)]);
        let ids: Vec<usize> = sorted_by_volume(&boxes).iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_catalog_by_volume_desc() {
        let catalog = vec![
            ContainerType::new("S", 1, 1, 1),
            ContainerType::new("L", 5, 5, 5),
            ContainerType::new("M", 2, 2, 2),
        ];
        let labels: Vec<String> = catalog_by_volume_desc(&catalog)
            .iter()
            .map(|t| t.label().to_string())
            .collect();
        assert_eq!(labels, vec!["L", "M", "S"]);
    }

    #[test]
    fn test_ensure_admissible() {
        let catalog = vec![ContainerType::new("C", 100, 100, 100)];
        assert!(ensure_admissible(&items(&[(100, 50, 10)]), &catalog).is_ok());
        assert!(matches!(
            ensure_admissible(&items(&[(10, 10, 10), (1000, 1000, 1000)]), &catalog),
            Err(Error::UnsolvableInput(_))
        ));
        assert!(matches!(
            ensure_admissible(&items(&[(1, 1, 1)]), &[]),
            Err(Error::UnsolvableInput(_))
        ));
    }

    #[test]
    fn test_prepare_input_rejects_bad_dimensions() {
        let catalog = vec![ContainerType::new("C", 10, 10, 10)];
        let bad_box = vec![BoxItem::new("B", 0, 1, 1, 1)];
        assert!(matches!(
            prepare_input(&bad_box, &catalog),
            Err(Error::InvalidGeometry(_))
        ));

        let bad_catalog = vec![ContainerType::new("C", 10, 0, 10)];
        assert!(matches!(
            prepare_input(&[], &bad_catalog),
            Err(Error::InvalidBoundary(_))
        ));
    }

    #[test]
    fn test_checkpoint_cancelled() {
        let flag = AtomicBool::new(false);
        let ctx = RunContext::new(&flag, 0, None);
        assert!(ctx.checkpoint().is_ok());
        flag.store(true, Ordering::Relaxed);
        assert_eq!(ctx.checkpoint(), Err(Error::Cancelled));
    }

    #[test]
    fn test_checkpoint_timeout() {
        let flag = AtomicBool::new(false);
        let ctx = RunContext::new(&flag, 1, None);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(ctx.checkpoint(), Err(Error::Timeout(1)));
    }

    #[test]
    fn test_emit_reaches_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Box::new(move |event| {
            sink.lock().unwrap().push(event);
        });
        let flag = AtomicBool::new(false);
        let ctx = RunContext::new(&flag, 0, Some(&callback));
        ctx.emit(ProgressEvent::BudgetStarted { limit: 2 });
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProgressEvent::BudgetStarted { limit: 2 }]
        );
    }

    #[test]
    fn test_overall_utilization() {
        assert_eq!(overall_utilization(&[]), 0.0);
        let mut full = PackingContainer::new("C", Vec3::new(2, 2, 2));
        let item = Arc::new(BoxItem::new("B", 2, 2, 2, 1));
        assert!(full.place_box(&item, Vec3::zeros(), Vec3::new(2, 2, 2)));
        let empty = PackingContainer::new("C", Vec3::new(2, 2, 2));
        assert_eq!(overall_utilization(&[full, empty]), 0.5);
    }

    #[test]
    fn test_overall_utilization_of_maximal_containers() {
        let edge = bopax_core::MAX_DIMENSION;
        let dims = Vec3::new(edge, edge, edge);
        let mut full = PackingContainer::new("Max", dims);
        let item = Arc::new(BoxItem::new("Max", edge, edge, edge, 1));
        assert!(full.place_box(&item, Vec3::zeros(), dims));
        let containers = [full.clone(), full, PackingContainer::new("Max", dims)];
        assert_eq!(overall_utilization(&containers), 2.0 / 3.0);
    }
}

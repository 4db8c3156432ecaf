//! Hybrid packer: commits one best container per round.
//!
//! Each round runs a [`ContainerSearch`] for every catalog type against the
//! whole remaining pool, commits the candidate with the highest utilization,
//! and removes its boxes from the pool. If no type packs anything, a
//! first-fit pass places what remains (existing containers first, then new
//! ones of any type in catalog order).
//!
//! Catalog types are evaluated on the rayon pool when `Config::parallel` is
//! set; results are collected in catalog order and compared sequentially, so
//! the choice never depends on scheduling. Each evaluation draws from its own
//! `StdRng` seeded from the run seed, the round and the type index.

use crate::container_search::{ContainerCandidate, ContainerSearch};
use crate::packing_utils::{run_packing, sorted_by_volume, PackingStrategy, RunContext};
use crate::placement::place_first_fit;
use bopax_core::{
    BoxItem, Config, ContainerType, Error, PackingContainer, PackingResult, ProgressCallback,
    ProgressEvent, Result, Solver, SplitRule,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Iterative best-of-heuristics packer.
pub struct HybridPacker {
    config: Config,
    cancelled: Arc<AtomicBool>,
}

impl HybridPacker {
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

    /// Evaluates every catalog type against `pool`, in catalog order.
    fn evaluate_types(
        &self,
        pool: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        base_seed: u64,
        round: usize,
    ) -> Vec<Option<ContainerCandidate>> {
        let random_starts = self.config.random_starts;
        let evaluate = |(type_index, container_type): (usize, &ContainerType)| {
            let mut rng = StdRng::seed_from_u64(derive_seed(base_seed, round, type_index));
            ContainerSearch::new(container_type, pool, random_starts).find_best_packing(&mut rng)
        };

        if self.config.parallel {
            catalog.par_iter().enumerate().map(evaluate).collect()
        } else {
            catalog.iter().enumerate().map(evaluate).collect()
        }
    }

    /// Places every box of `pool` by first fit, opening containers as needed.
    fn fallback(
        &self,
        pool: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        containers: &mut Vec<PackingContainer>,
    ) -> Result<()> {
        let rule = SplitRule::Guillotine;

        for item in pool {
            if containers
                .iter_mut()
                .any(|container| place_first_fit(container, item, rule))
            {
                continue;
            }

            let container = catalog
                .iter()
                .map(PackingContainer::from_type)
                .find_map(|mut container| {
                    place_first_fit(&mut container, item, rule).then_some(container)
                })
                .ok_or_else(|| {
                    Error::NoSolutionFound(format!(
                        "fallback could not place box {} ('{}')",
                        item.id(),
                        item.label()
                    ))
                })?;
            containers.push(container);
        }

        log::debug!("hybrid: fallback placed {} boxes", pool.len());
        Ok(())
    }
}

/// Seed for one (round, catalog type) evaluation.
fn derive_seed(base_seed: u64, round: usize, type_index: usize) -> u64 {
    base_seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(((round as u64) << 32) | type_index as u64)
}

impl PackingStrategy for HybridPacker {
    fn name(&self) -> &'static str {
        "Hybrid"
    }

    fn pack(
        &self,
        boxes: &[Arc<BoxItem>],
        catalog: &[ContainerType],
        ctx: &RunContext<'_>,
    ) -> Result<Vec<PackingContainer>> {
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        let mut remaining = sorted_by_volume(boxes);
        let mut containers: Vec<PackingContainer> = Vec::new();
        let mut round = 0;

        while !remaining.is_empty() {
            ctx.checkpoint()?;

            let candidates = self.evaluate_types(&remaining, catalog, base_seed, round);

            let mut best: Option<ContainerCandidate> = None;
            let mut best_utilization = 0.0;
            for (container_type, candidate) in catalog.iter().zip(candidates) {
                let Some(candidate) = candidate else {
                    log::debug!("hybrid: round {} {} packs nothing", round, container_type.label());
                    continue;
                };
                let utilization = candidate.utilization();
                log::debug!(
                    "hybrid: round {} {} packs {} boxes at {:.1}%",
                    round,
                    container_type.label(),
                    candidate.packed.len(),
                    utilization * 100.0
                );
                if !candidate.packed.is_empty() && utilization > best_utilization {
                    best_utilization = utilization;
                    best = Some(candidate);
                }
            }

            let Some(ContainerCandidate { container, packed }) = best else {
                log::warn!(
                    "hybrid: no container type packs any of {} remaining boxes, using fallback",
                    remaining.len()
                );
                self.fallback(&remaining, catalog, &mut containers)?;
                break;
            };

            remaining = remaining
                .into_iter()
                .enumerate()
                .filter(|(index, _)| !packed.contains(index))
                .map(|(_, item)| item)
                .collect();

            ctx.emit(ProgressEvent::ContainerCommitted {
                label: container.label().to_string(),
                boxes: packed.len(),
                utilization: best_utilization,
                remaining: remaining.len(),
            });
            containers.push(container);
            round += 1;
        }

        Ok(containers)
    }
}

impl Solver for HybridPacker {
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

//! Single-container search used by the hybrid packer.
//!
//! For one container type and a pool of boxes, three heuristics each build a
//! container and the best one by utilization is kept (ties go to the earlier
//! heuristic: layer, then best-fit, then random).
//!
//! - **Layer**: bottom-up horizontal layers filled row by row. At each x
//!   position the unplaced box/rotation with the highest width > depth >
//!   height score that still fits goes next.
//! - **Best-fit**: repeatedly commits the single largest box that fits at
//!   any candidate corner.
//! - **Random**: several random orderings placed greedily at the first
//!   valid candidate corner.

use crate::placement::candidate_positions;
use bopax_core::{BoxItem, ContainerType, Coord, PackingContainer, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A filled container and the pool indices it holds.
#[derive(Debug, Clone)]
pub struct ContainerCandidate {
    /// The packed container.
    pub container: PackingContainer,
    /// Indices into the pool of the packed boxes.
    pub packed: BTreeSet<usize>,
}

impl ContainerCandidate {
    fn empty(container_type: &ContainerType) -> Self {
        Self {
            container: PackingContainer::from_type(container_type),
            packed: BTreeSet::new(),
        }
    }

    fn place(&mut self, index: usize, item: &Arc<BoxItem>, position: Vec3, dims: Vec3) -> bool {
        let placed = self.container.place_box(item, position, dims);
        if placed {
            self.packed.insert(index);
        }
        placed
    }

    /// Utilization of the container.
    pub fn utilization(&self) -> f64 {
        self.container.utilization()
    }
}

/// Heuristic search for the best single container of one type.
pub struct ContainerSearch<'a> {
    container_type: &'a ContainerType,
    boxes: &'a [Arc<BoxItem>],
    random_starts: usize,
}

impl<'a> ContainerSearch<'a> {
    /// Creates a search of `container_type` over the pool `boxes`.
    pub fn new(
        container_type: &'a ContainerType,
        boxes: &'a [Arc<BoxItem>],
        random_starts: usize,
    ) -> Self {
        Self {
            container_type,
            boxes,
            random_starts,
        }
    }

    /// Runs all three heuristics and keeps the best.
    ///
    /// Returns `None` when no heuristic packs anything.
    pub fn find_best_packing<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ContainerCandidate> {
        let candidates = [
            Some(self.layer_packing()),
            Some(self.best_fit()),
            self.random_search(rng),
        ];

        let mut best: Option<ContainerCandidate> = None;
        let mut best_utilization = 0.0;
        for candidate in candidates.into_iter().flatten() {
            let utilization = candidate.utilization();
            if utilization > best_utilization {
                best_utilization = utilization;
                best = Some(candidate);
            }
        }
        best
    }

    /// Fills the container in horizontal layers.
    pub fn layer_packing(&self) -> ContainerCandidate {
        let bounds = *self.container_type.dimensions();
        let mut candidate = ContainerCandidate::empty(self.container_type);

        let mut z = 0;
        while z < bounds.z {
            let mut layer_height = 0;
            let mut y = 0;

            while y < bounds.y {
                let mut x = 0;
                let mut row_height = 0;

                while x < bounds.x {
                    let origin = Vec3::new(x, y, z);
                    let Some((index, dims)) = self.best_layer_fit(&candidate, &origin, &bounds)
                    else {
                        break;
                    };
                    if !candidate.place(index, &self.boxes[index], origin, dims) {
                        break;
                    }
                    x += dims.x;
                    row_height = row_height.max(dims.z);
                    layer_height = layer_height.max(dims.z);
                }

                y += if row_height > 0 { row_height } else { bounds.y };
            }

            if layer_height == 0 {
                break;
            }
            z += layer_height;
        }

        candidate
    }

    /// Highest-scoring unplaced box/rotation that fits inside `bounds` from `origin`.
    fn best_layer_fit(
        &self,
        candidate: &ContainerCandidate,
        origin: &Vec3,
        bounds: &Vec3,
    ) -> Option<(usize, Vec3)> {
        let mut best = None;
        let mut best_score: Coord = 0;

        for (index, item) in self.boxes.iter().enumerate() {
            if candidate.packed.contains(&index) {
                continue;
            }
            for rotation in item.rotations() {
                let end = origin + rotation;
                if end.x > bounds.x || end.y > bounds.y || end.z > bounds.z {
                    continue;
                }
                let score = rotation.x * 1000 + rotation.y * 10 + rotation.z;
                if score > best_score {
                    best_score = score;
                    best = Some((index, rotation));
                }
            }
        }

        best
    }

    /// Repeatedly places the largest box that fits at any candidate corner.
    pub fn best_fit(&self) -> ContainerCandidate {
        let mut candidate = ContainerCandidate::empty(self.container_type);

        loop {
            let positions = candidate_positions(&candidate.container);
            let mut best: Option<(usize, Vec3, Vec3)> = None;
            let mut best_volume: Coord = 0;

            for (index, item) in self.boxes.iter().enumerate() {
                if candidate.packed.contains(&index) || item.volume() <= best_volume {
                    continue;
                }
                'search: for rotation in item.rotations() {
                    for position in &positions {
                        if candidate.container.can_place_box(&rotation, position) {
                            best = Some((index, *position, rotation));
                            best_volume = item.volume();
                            break 'search;
                        }
                    }
                }
            }

            match best {
                Some((index, position, dims)) => {
                    if !candidate.place(index, &self.boxes[index], position, dims) {
                        break;
                    }
                }
                None => break,
            }
        }

        candidate
    }

    /// Tries `random_starts` random orderings, keeping the best.
    ///
    /// Returns `None` when no ordering packs anything.
    pub fn random_search<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<ContainerCandidate> {
        let mut order: Vec<usize> = (0..self.boxes.len()).collect();
        let mut best: Option<ContainerCandidate> = None;
        let mut best_utilization = 0.0;

        for _ in 0..self.random_starts {
            order.shuffle(rng);
            let mut candidate = ContainerCandidate::empty(self.container_type);

            for &index in &order {
                let item = &self.boxes[index];
                let positions = candidate_positions(&candidate.container);
                'place: for rotation in item.rotations() {
                    for position in &positions {
                        if candidate.place(index, item, *position, rotation) {
                            break 'place;
                        }
                    }
                }
            }

            let utilization = candidate.utilization();
            if utilization > best_utilization {
                best_utilization = utilization;
                best = Some(candidate);
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(dims: &[(Coord, Coord, Coord)]) -> Vec<Arc<BoxItem>> {
        dims.iter()
            .enumerate()
            .map(|(i, &(w, d, h))| Arc::new(BoxItem::new("B", w, d, h, i + 1)))
            .collect()
    }

    fn assert_no_overlap(container: &PackingContainer) {
        let placed = container.placed_boxes();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_layer_packing_fills_rows() {
        let container_type = ContainerType::new("C", 100, 100, 100);
        let boxes = pool(&[(50, 50, 50); 8]);
        let search = ContainerSearch::new(&container_type, &boxes, 10);

        let candidate = search.layer_packing();
        assert_eq!(candidate.packed.len(), 8);
        assert_relative_eq!(candidate.utilization(), 1.0);
        assert_no_overlap(&candidate.container);
        assert_eq!(candidate.container.placed_boxes()[1].position, Vec3::new(50, 0, 0));
    }

    #[test]
    fn test_layer_packing_prefers_wide_rotation() {
        let container_type = ContainerType::new("C", 100, 100, 100);
        let boxes = pool(&[(10, 20, 30)]);
        let candidate = ContainerSearch::new(&container_type, &boxes, 1).layer_packing();
        assert_eq!(candidate.container.placed_boxes()[0].dimensions, Vec3::new(30, 20, 10));
    }

    #[test]
    fn test_best_fit_takes_largest_first() {
        let container_type = ContainerType::new("C", 100, 100, 100);
        let boxes = pool(&[(10, 10, 10), (100, 100, 50), (100, 100, 60)]);
        let candidate = ContainerSearch::new(&container_type, &boxes, 1).best_fit();

        let first = &candidate.container.placed_boxes()[0];
        assert_eq!(first.item.id(), 3);
        assert!(candidate.packed.contains(&2));
        assert!(!candidate.packed.contains(&1), "the 50-high slab no longer fits");
        assert!(candidate.packed.contains(&0));
        assert_no_overlap(&candidate.container);
    }

    #[test]
    fn test_random_search_is_seeded() {
        let container_type = ContainerType::new("C", 100, 100, 100);
        let boxes = pool(&[(60, 40, 30), (50, 50, 50), (30, 30, 90), (70, 20, 20), (40, 40, 40)]);
        let search = ContainerSearch::new(&container_type, &boxes, 10);

        let a = search.random_search(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = search.random_search(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.packed, b.packed);
        assert_eq!(a.container, b.container);
        assert_no_overlap(&a.container);
    }

    #[test]
    fn test_random_search_without_starts() {
        let container_type = ContainerType::new("C", 10, 10, 10);
        let boxes = pool(&[(5, 5, 5)]);
        let search = ContainerSearch::new(&container_type, &boxes, 0);
        assert!(search.random_search(&mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_find_best_packing_none_when_nothing_fits() {
        let container_type = ContainerType::new("C", 10, 10, 10);
        let boxes = pool(&[(20, 20, 20)]);
        let search = ContainerSearch::new(&container_type, &boxes, 3);
        assert!(search.find_best_packing(&mut StdRng::seed_from_u64(7)).is_none());
    }

    #[test]
    fn test_find_best_packing_indices_match_boxes() {
        let container_type = ContainerType::new("C", 100, 100, 100);
        let boxes = pool(&[(50, 50, 50), (100, 100, 100), (20, 20, 20)]);
        let search = ContainerSearch::new(&container_type, &boxes, 10);

        let best = search.find_best_packing(&mut StdRng::seed_from_u64(3)).unwrap();
        assert_relative_eq!(best.utilization(), 1.0);
        assert_eq!(best.packed, BTreeSet::from([1]));
    }
}

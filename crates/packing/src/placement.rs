//! Placement primitives shared by the packers.

use bopax_core::{BoxItem, Coord, PackingContainer, SplitRule, Vec3};
use std::collections::HashSet;
use std::sync::Arc;

/// Places `item` at the first free-space corner that accepts it.
///
/// Rotations are tried in order; for each rotation the free spaces are
/// scanned sorted by corner (z, y, x). A space that is large enough is only a
/// candidate: the placement is re-validated against every placed box.
pub fn place_first_fit(
    container: &mut PackingContainer,
    item: &Arc<BoxItem>,
    rule: SplitRule,
) -> bool {
    let spaces = container.sorted_free_spaces();
    for rotation in item.rotations() {
        for space in &spaces {
            if space.can_fit(&rotation)
                && container.place_box_with(rule, item, space.position, rotation)
            {
                return true;
            }
        }
    }
    false
}

/// Candidate corners next to the boxes already in `container`.
///
/// Yields the origin plus the six axis-adjacent corners of every placed box
/// (+x, +y, +z and the three pairwise combinations), without duplicates,
/// strictly inside the container, sorted by (z, y, x).
pub fn candidate_positions(container: &PackingContainer) -> Vec<Vec3> {
    let dims = container.dimensions();
    let mut seen: HashSet<(Coord, Coord, Coord)> = HashSet::new();
    let mut positions: Vec<(Coord, Coord, Coord)> = Vec::new();

    let mut push = |p: (Coord, Coord, Coord)| {
        if p.0 < dims.x && p.1 < dims.y && p.2 < dims.z && seen.insert(p) {
            positions.push(p);
        }
    };

    push((0, 0, 0));
    for placed in container.placed_boxes() {
        let p = placed.position;
        let m = placed.max_corner();
        push((m.x, p.y, p.z));
        push((p.x, m.y, p.z));
        push((p.x, p.y, m.z));
        push((m.x, m.y, p.z));
        push((m.x, p.y, m.z));
        push((p.x, m.y, m.z));
    }

    positions.sort_by_key(|&(x, y, z)| (z, y, x));
    positions
        .into_iter()
        .map(|(x, y, z)| Vec3::new(x, y, z))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: usize, w: Coord, d: Coord, h: Coord) -> Arc<BoxItem> {
        Arc::new(BoxItem::new("B", w, d, h, id))
    }

    #[test]
    fn test_first_fit_prefers_low_corner() {
        let mut container = PackingContainer::new("C", Vec3::new(100, 100, 100));
        assert!(place_first_fit(&mut container, &item(1, 40, 40, 40), SplitRule::Guillotine));
        assert!(place_first_fit(&mut container, &item(2, 40, 40, 40), SplitRule::Guillotine));

        // Free spaces at z = 0 sort by y then x, so (40, 0, 0) comes before (0, 40, 0).
        assert_eq!(container.placed_boxes()[1].position, Vec3::new(40, 0, 0));
    }

    #[test]
    fn test_first_fit_rotates_when_needed() {
        let mut container = PackingContainer::new("C", Vec3::new(10, 10, 100));
        assert!(place_first_fit(&mut container, &item(1, 80, 10, 10), SplitRule::Guillotine));
        assert_eq!(container.placed_boxes()[0].dimensions, Vec3::new(10, 10, 80));
    }

    #[test]
    fn test_first_fit_rejects_oversized() {
        let mut container = PackingContainer::new("C", Vec3::new(10, 10, 10));
        assert!(!place_first_fit(&mut container, &item(1, 11, 11, 11), SplitRule::Capped(20)));
        assert!(container.is_empty());
    }

    #[test]
    fn test_first_fit_fills_container() {
        let mut container = PackingContainer::new("C", Vec3::new(20, 20, 20));
        for id in 1..=8 {
            assert!(place_first_fit(&mut container, &item(id, 10, 10, 10), SplitRule::Guillotine));
        }
        assert!(!place_first_fit(&mut container, &item(9, 1, 1, 1), SplitRule::Guillotine));
        assert_eq!(container.utilization(), 1.0);
    }

    #[test]
    fn test_candidate_positions_empty_container() {
        let container = PackingContainer::new("C", Vec3::new(10, 10, 10));
        assert_eq!(candidate_positions(&container), vec![Vec3::zeros()]);
    }

    #[test]
    fn test_candidate_positions_after_one_box() {
        let mut container = PackingContainer::new("C", Vec3::new(10, 10, 10));
        assert!(container.place_box(&item(1, 5, 5, 5), Vec3::zeros(), Vec3::new(5, 5, 5)));

        let positions = candidate_positions(&container);
        assert_eq!(
            positions,
            vec![
                Vec3::new(0, 0, 0),
                Vec3::new(5, 0, 0),
                Vec3::new(0, 5, 0),
                Vec3::new(5, 5, 0),
                Vec3::new(0, 0, 5),
                Vec3::new(5, 0, 5),
                Vec3::new(0, 5, 5),
            ]
        );
    }

    #[test]
    fn test_candidate_positions_filters_out_of_bounds() {
        let mut container = PackingContainer::new("C", Vec3::new(10, 10, 10));
        assert!(container.place_box(&item(1, 10, 5, 10), Vec3::zeros(), Vec3::new(10, 5, 10)));

        let positions = candidate_positions(&container);
        assert_eq!(positions, vec![Vec3::new(0, 0, 0), Vec3::new(0, 5, 0)]);
    }
}

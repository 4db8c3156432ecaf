//! Container occupancy model.
//!
//! A [`PackingContainer`] owns the boxes placed in it and a list of
//! [`FreeSpace`] cuboids. The free-space list *covers* the unoccupied region
//! but does not partition it: spaces may overlap each other. Placement is
//! therefore always re-validated against every placed box, and the
//! free-space list is only used to generate candidate corners.
//!
//! Two split rules regenerate free spaces after a placement:
//!
//! - [`SplitRule::Guillotine`]: every intersecting space is replaced by up to
//!   six residual sub-spaces (toward ±x, ±y, ±z), then enclosed and
//!   duplicate spaces are pruned. Never discards usable room.
//! - [`SplitRule::Capped`]: only +x, +y and +z residuals are emitted and the
//!   list is truncated to the largest spaces by volume. Bounded cost, but a
//!   usable space may be dropped.

use crate::geometry::{fits_within, volume_of, BoxItem, ContainerType, Coord, Vec3};
use crate::{Error, Result};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns true if two cuboids given as (position, dimensions) intersect.
///
/// Bounds are half-open, so cuboids that merely touch do not intersect.
pub fn cuboids_intersect(pos_a: &Vec3, dims_a: &Vec3, pos_b: &Vec3, dims_b: &Vec3) -> bool {
    pos_a.x < pos_b.x + dims_b.x
        && pos_a.x + dims_a.x > pos_b.x
        && pos_a.y < pos_b.y + dims_b.y
        && pos_a.y + dims_a.y > pos_b.y
        && pos_a.z < pos_b.z + dims_b.z
        && pos_a.z + dims_a.z > pos_b.z
}

/// A box placed in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedBox {
    /// The original box.
    pub item: Arc<BoxItem>,
    /// Position of the min corner.
    pub position: Vec3,
    /// Dimensions after rotation.
    pub dimensions: Vec3,
}

impl PlacedBox {
    /// Creates a new placed box.
    pub fn new(item: Arc<BoxItem>, position: Vec3, dimensions: Vec3) -> Self {
        Self {
            item,
            position,
            dimensions,
        }
    }

    /// Returns the max corner of the box.
    pub fn max_corner(&self) -> Vec3 {
        self.position + self.dimensions
    }

    /// Returns the half-open `(min, max)` interval on each axis.
    pub fn bounds(&self) -> [(Coord, Coord); 3] {
        let max = self.max_corner();
        [
            (self.position.x, max.x),
            (self.position.y, max.y),
            (self.position.z, max.z),
        ]
    }

    /// Checks if this box overlaps with another box.
    pub fn overlaps(&self, other: &PlacedBox) -> bool {
        cuboids_intersect(
            &self.position,
            &self.dimensions,
            &other.position,
            &other.dimensions,
        )
    }
}

/// An axis-aligned empty cuboid inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FreeSpace {
    /// Position of the min corner.
    pub position: Vec3,
    /// Extent on each axis.
    pub dimensions: Vec3,
}

impl FreeSpace {
    /// Creates a new free space.
    pub fn new(position: Vec3, dimensions: Vec3) -> Self {
        Self {
            position,
            dimensions,
        }
    }

    /// Returns the volume.
    pub fn volume(&self) -> Coord {
        volume_of(&self.dimensions)
    }

    /// Checks if a box with the given dimensions fits in this space.
    ///
    /// Only sizes are compared; the position is not checked.
    pub fn can_fit(&self, dims: &Vec3) -> bool {
        fits_within(dims, &self.dimensions)
    }

    /// Returns the max corner.
    pub fn max_corner(&self) -> Vec3 {
        self.position + self.dimensions
    }

    /// Returns true if `other` lies entirely inside this space.
    pub fn contains(&self, other: &FreeSpace) -> bool {
        let max = self.max_corner();
        let other_max = other.max_corner();
        self.position.x <= other.position.x
            && self.position.y <= other.position.y
            && self.position.z <= other.position.z
            && max.x >= other_max.x
            && max.y >= other_max.y
            && max.z >= other_max.z
    }

    /// Sort key ordering spaces bottom-first, then back-to-front, then left-to-right.
    pub fn corner_key(&self) -> (Coord, Coord, Coord) {
        (self.position.z, self.position.y, self.position.x)
    }

    fn intersects(&self, placed: &PlacedBox) -> bool {
        cuboids_intersect(
            &placed.position,
            &placed.dimensions,
            &self.position,
            &self.dimensions,
        )
    }
}

/// How free spaces are regenerated after a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SplitRule {
    /// Six-way residual split with enclosure/duplicate pruning.
    #[default]
    Guillotine,
    /// Three-way split (+x, +y, +z) keeping the given number of largest spaces.
    Capped(usize),
}

/// Independent copy of a container's mutable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    placed: Vec<PlacedBox>,
    free_spaces: Vec<FreeSpace>,
}

/// A container instance with placed boxes and free-space bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingContainer {
    label: String,
    dimensions: Vec3,
    placed: Vec<PlacedBox>,
    free_spaces: Vec<FreeSpace>,
}

impl PackingContainer {
    /// Creates an empty container with one free space spanning its interior.
    pub fn new(label: impl Into<String>, dimensions: Vec3) -> Self {
        Self {
            label: label.into(),
            dimensions,
            placed: Vec::new(),
            free_spaces: vec![FreeSpace::new(Vec3::zeros(), dimensions)],
        }
    }

    /// Creates an empty container of a catalog type.
    pub fn from_type(container_type: &ContainerType) -> Self {
        Self::new(container_type.label(), *container_type.dimensions())
    }

    /// Returns the container type label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the dimensions (width, depth, height).
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    /// Returns the placed boxes in placement order.
    pub fn placed_boxes(&self) -> &[PlacedBox] {
        &self.placed
    }

    /// Returns the current free spaces.
    pub fn free_spaces(&self) -> &[FreeSpace] {
        &self.free_spaces
    }

    /// Returns the free spaces sorted by corner (z, y, x).
    pub fn sorted_free_spaces(&self) -> Vec<FreeSpace> {
        let mut spaces = self.free_spaces.clone();
        spaces.sort_by_key(FreeSpace::corner_key);
        spaces
    }

    /// Returns the number of placed boxes.
    pub fn box_count(&self) -> usize {
        self.placed.len()
    }

    /// Returns true if nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Returns the container volume.
    pub fn volume(&self) -> Coord {
        volume_of(&self.dimensions)
    }

    /// Returns the total volume of placed boxes.
    pub fn used_volume(&self) -> Coord {
        self.placed.iter().map(|p| p.item.volume()).sum()
    }

    /// Returns used volume / container volume (0.0 to 1.0).
    pub fn utilization(&self) -> f64 {
        let volume = self.volume();
        if volume > 0 {
            self.used_volume() as f64 / volume as f64
        } else {
            0.0
        }
    }

    /// Checks if a box of the given dimensions can be placed at `position`.
    ///
    /// The box must lie inside the container and must not overlap any
    /// placed box. Free spaces are not consulted.
    pub fn can_place_box(&self, dims: &Vec3, position: &Vec3) -> bool {
        self.placement_violation(dims, position).is_none()
    }

    fn placement_violation(&self, dims: &Vec3, position: &Vec3) -> Option<String> {
        if position.x < 0 || position.y < 0 || position.z < 0 {
            return Some(format!(
                "position ({}, {}, {}) is negative",
                position.x, position.y, position.z
            ));
        }
        if !fits_within(&(position + dims), &self.dimensions) {
            return Some(format!(
                "box ({}, {}, {}) at ({}, {}, {}) exceeds container '{}'",
                dims.x, dims.y, dims.z, position.x, position.y, position.z, self.label
            ));
        }
        self.placed
            .iter()
            .find(|p| cuboids_intersect(position, dims, &p.position, &p.dimensions))
            .map(|p| format!("overlaps box {} ('{}')", p.item.id(), p.item.label()))
    }

    /// Places a box using the guillotine split. Returns false if the
    /// placement is invalid, leaving the container unchanged.
    pub fn place_box(&mut self, item: &Arc<BoxItem>, position: Vec3, dims: Vec3) -> bool {
        self.place_box_with(SplitRule::Guillotine, item, position, dims)
    }

    /// Places a box using the given split rule.
    pub fn place_box_with(
        &mut self,
        rule: SplitRule,
        item: &Arc<BoxItem>,
        position: Vec3,
        dims: Vec3,
    ) -> bool {
        if !self.can_place_box(&dims, &position) {
            return false;
        }
        self.commit(rule, PlacedBox::new(Arc::clone(item), position, dims));
        true
    }

    /// Places a box, reporting why the placement was rejected.
    pub fn try_place_box(
        &mut self,
        item: &Arc<BoxItem>,
        position: Vec3,
        dims: Vec3,
    ) -> Result<()> {
        if let Some(reason) = self.placement_violation(&dims, &position) {
            return Err(Error::InvalidPlacement(format!(
                "box {} ('{}'): {}",
                item.id(),
                item.label(),
                reason
            )));
        }
        self.commit(
            SplitRule::Guillotine,
            PlacedBox::new(Arc::clone(item), position, dims),
        );
        Ok(())
    }

    fn commit(&mut self, rule: SplitRule, placed: PlacedBox) {
        match rule {
            SplitRule::Guillotine => self.split_guillotine(&placed),
            SplitRule::Capped(cap) => self.split_capped(&placed, cap),
        }
        self.placed.push(placed);
    }

    /// Removes the most recently placed box. Free spaces are not restored;
    /// use [`snapshot`](Self::snapshot)/[`restore`](Self::restore) for that.
    pub fn remove_last(&mut self) -> Option<PlacedBox> {
        self.placed.pop()
    }

    /// Takes an independent copy of the placed boxes and free spaces.
    pub fn snapshot(&self) -> ContainerSnapshot {
        ContainerSnapshot {
            placed: self.placed.clone(),
            free_spaces: self.free_spaces.clone(),
        }
    }

    /// Restores the state captured by [`snapshot`](Self::snapshot).
    pub fn restore(&mut self, snapshot: ContainerSnapshot) {
        self.placed = snapshot.placed;
        self.free_spaces = snapshot.free_spaces;
    }

    fn split_guillotine(&mut self, placed: &PlacedBox) {
        let p = placed.position;
        let p_max = placed.max_corner();
        let mut new_spaces = Vec::with_capacity(self.free_spaces.len() + 6);

        for space in &self.free_spaces {
            if !space.intersects(placed) {
                new_spaces.push(*space);
                continue;
            }

            let f = space.position;
            let fd = space.dimensions;
            let f_max = space.max_corner();

            let residuals = [
                // +x
                (f_max.x > p_max.x).then(|| {
                    FreeSpace::new(
                        Vec3::new(p_max.x, f.y, f.z),
                        Vec3::new(f_max.x - p_max.x, fd.y, fd.z),
                    )
                }),
                // -x
                (f.x < p.x).then(|| FreeSpace::new(f, Vec3::new(p.x - f.x, fd.y, fd.z))),
                // +y
                (f_max.y > p_max.y).then(|| {
                    FreeSpace::new(
                        Vec3::new(f.x, p_max.y, f.z),
                        Vec3::new(fd.x, f_max.y - p_max.y, fd.z),
                    )
                }),
                // -y
                (f.y < p.y).then(|| FreeSpace::new(f, Vec3::new(fd.x, p.y - f.y, fd.z))),
                // +z
                (f_max.z > p_max.z).then(|| {
                    FreeSpace::new(
                        Vec3::new(f.x, f.y, p_max.z),
                        Vec3::new(fd.x, fd.y, f_max.z - p_max.z),
                    )
                }),
                // -z
                (f.z < p.z).then(|| FreeSpace::new(f, Vec3::new(fd.x, fd.y, p.z - f.z))),
            ];

            new_spaces.extend(residuals.into_iter().flatten().filter(|s| s.volume() > 0));
        }

        self.free_spaces = prune_free_spaces(new_spaces);
    }

    fn split_capped(&mut self, placed: &PlacedBox, cap: usize) {
        let p_max = placed.max_corner();
        let mut new_spaces = Vec::with_capacity(self.free_spaces.len() + 3);

        for space in &self.free_spaces {
            if !space.intersects(placed) {
                new_spaces.push(*space);
                continue;
            }

            let s = space.position;
            let sd = space.dimensions;
            let s_max = space.max_corner();

            if s_max.z > p_max.z {
                new_spaces.push(FreeSpace::new(
                    Vec3::new(s.x, s.y, p_max.z),
                    Vec3::new(sd.x, sd.y, s_max.z - p_max.z),
                ));
            }
            if s_max.x > p_max.x {
                new_spaces.push(FreeSpace::new(
                    Vec3::new(p_max.x, s.y, s.z),
                    Vec3::new(s_max.x - p_max.x, sd.y, sd.z),
                ));
            }
            if s_max.y > p_max.y {
                new_spaces.push(FreeSpace::new(
                    Vec3::new(s.x, p_max.y, s.z),
                    Vec3::new(sd.x, s_max.y - p_max.y, sd.z),
                ));
            }
        }

        new_spaces.sort_by(|a, b| b.volume().cmp(&a.volume()));
        new_spaces.truncate(cap);
        self.free_spaces = new_spaces;
    }
}

/// Drops spaces strictly enclosed in another space and collapses duplicates.
fn prune_free_spaces(spaces: Vec<FreeSpace>) -> Vec<FreeSpace> {
    let mut pruned: Vec<FreeSpace> = Vec::with_capacity(spaces.len());

    for (i, space) in spaces.iter().enumerate() {
        let enclosed = spaces
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && other != space && other.contains(space));
        if enclosed || pruned.contains(space) {
            continue;
        }
        pruned.push(*space);
    }

    pruned
}

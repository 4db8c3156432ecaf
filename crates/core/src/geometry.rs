//! Box and container geometry.

use crate::{Error, Result};

pub use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer coordinate used for positions and dimensions (millimetres).
pub type Coord = i64;

/// A position or a (width, depth, height) triple.
pub type Vec3 = Vector3<Coord>;

/// Volume summed over several containers.
pub type TotalVolume = i128;

/// Largest accepted extent on any axis.
///
/// Bounds every volume, corner sum and placement score to fit in [`Coord`].
pub const MAX_DIMENSION: Coord = 2_000_000;

/// Axis permutations used to enumerate box rotations.
/// Each entry is (width_axis, depth_axis, height_axis).
const ORIENTATIONS: [(usize, usize, usize); 6] = [
    (0, 1, 2),
    (0, 2, 1),
    (1, 0, 2),
    (1, 2, 0),
    (2, 0, 1),
    (2, 1, 0),
];

/// Volume of a cuboid with the given dimensions.
pub fn volume_of(dims: &Vec3) -> Coord {
    dims.x * dims.y * dims.z
}

/// Returns true if `dims` is no larger than `bounds` on every axis.
pub fn fits_within(dims: &Vec3, bounds: &Vec3) -> bool {
    dims.x <= bounds.x && dims.y <= bounds.y && dims.z <= bounds.z
}

/// Sorted copy of the three components, used to compare rotations.
pub fn sorted_components(dims: &Vec3) -> [Coord; 3] {
    let mut sorted = [dims.x, dims.y, dims.z];
    sorted.sort_unstable();
    sorted
}

/// Volume of a cuboid, or `None` if it does not fit in [`Coord`].
pub fn checked_volume(dims: &Vec3) -> Option<Coord> {
    dims.x.checked_mul(dims.y)?.checked_mul(dims.z)
}

/// Describes why `dims` is unusable, if it is.
fn dimension_violation(dims: &Vec3) -> Option<String> {
    if dims.iter().any(|&d| d <= 0) {
        return Some("must be positive".to_string());
    }
    if dims.iter().any(|&d| d > MAX_DIMENSION) {
        return Some(format!("must not exceed {}", MAX_DIMENSION));
    }
    if checked_volume(dims).is_none() {
        return Some("have a volume that overflows".to_string());
    }
    None
}

/// A single box instance to be packed.
///
/// Boxes are immutable once created; placements share them by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxItem {
    label: String,
    dimensions: Vec3,
    id: usize,
}

impl BoxItem {
    /// Creates a new box with the given label, dimensions and instance id.
    pub fn new(
        label: impl Into<String>,
        width: Coord,
        depth: Coord,
        height: Coord,
        id: usize,
    ) -> Self {
        Self::from_dimensions(label, Vec3::new(width, depth, height), id)
    }

    /// Creates a new box from a dimension vector.
    pub fn from_dimensions(label: impl Into<String>, dimensions: Vec3, id: usize) -> Self {
        Self {
            label: label.into(),
            dimensions,
            id,
        }
    }

    /// Returns the label (box type name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the dimensions (width, depth, height).
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    /// Returns the instance id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the volume.
    pub fn volume(&self) -> Coord {
        volume_of(&self.dimensions)
    }

    /// Returns the distinct axis-aligned rotations of this box.
    ///
    /// Order is stable: (w,d,h), (w,h,d), (d,w,h), (d,h,w), (h,w,d), (h,d,w),
    /// with repeated permutations removed when dimensions coincide.
    pub fn rotations(&self) -> Vec<Vec3> {
        let mut unique: Vec<Vec3> = Vec::with_capacity(ORIENTATIONS.len());
        for (a, b, c) in ORIENTATIONS {
            let rotated = Vec3::new(self.dimensions[a], self.dimensions[b], self.dimensions[c]);
            if !unique.contains(&rotated) {
                unique.push(rotated);
            }
        }
        unique
    }

    /// Returns true if some rotation fits inside `bounds`.
    pub fn fits_in(&self, bounds: &Vec3) -> bool {
        self.rotations().iter().any(|r| fits_within(r, bounds))
    }

    /// Validates that all dimensions are positive and within [`MAX_DIMENSION`].
    pub fn validate(&self) -> Result<()> {
        if let Some(reason) = dimension_violation(&self.dimensions) {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for box '{}' (id {}) {}",
                self.label, self.id, reason
            )));
        }
        Ok(())
    }
}

/// A box type with a quantity, as listed in an order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxType {
    /// Type name shared by every expanded instance.
    pub label: String,
    /// Dimensions (width, depth, height).
    pub dimensions: Vec3,
    /// Number of instances.
    pub quantity: usize,
}

impl BoxType {
    /// Creates a box type with quantity 1.
    pub fn new(label: impl Into<String>, width: Coord, depth: Coord, height: Coord) -> Self {
        Self {
            label: label.into(),
            dimensions: Vec3::new(width, depth, height),
            quantity: 1,
        }
    }

    /// Sets the quantity.
    pub fn with_quantity(mut self, n: usize) -> Self {
        self.quantity = n;
        self
    }
}

/// Expands box types into individual boxes with sequential ids starting at 1.
pub fn expand_box_types(types: &[BoxType]) -> Vec<BoxItem> {
    let mut boxes = Vec::with_capacity(types.iter().map(|t| t.quantity).sum());
    let mut next_id = 1;
    for box_type in types {
        for _ in 0..box_type.quantity {
            boxes.push(BoxItem::from_dimensions(
                box_type.label.clone(),
                box_type.dimensions,
                next_id,
            ));
            next_id += 1;
        }
    }
    boxes
}

/// A container type from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerType {
    label: String,
    dimensions: Vec3,
}

impl ContainerType {
    /// Creates a container type.
    pub fn new(label: impl Into<String>, width: Coord, depth: Coord, height: Coord) -> Self {
        Self {
            label: label.into(),
            dimensions: Vec3::new(width, depth, height),
        }
    }

    /// Returns the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the dimensions (width, depth, height).
    pub fn dimensions(&self) -> &Vec3 {
        &self.dimensions
    }

    /// Returns the volume.
    pub fn volume(&self) -> Coord {
        volume_of(&self.dimensions)
    }

    /// Returns true if some rotation of `item` fits in an empty container of this type.
    pub fn admits(&self, item: &BoxItem) -> bool {
        item.fits_in(&self.dimensions)
    }

    /// Validates the label and dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.label.is_empty() {
            return Err(Error::InvalidBoundary(
                "Container type label must not be empty".into(),
            ));
        }
        if let Some(reason) = dimension_violation(&self.dimensions) {
            return Err(Error::InvalidBoundary(format!(
                "All dimensions for container type '{}' {}",
                self.label, reason
            )));
        }
        Ok(())
    }
}

/// Removes catalog entries whose label repeats an earlier entry.
///
/// The first occurrence of a label wins; order is otherwise preserved.
pub fn normalize_catalog(catalog: &[ContainerType]) -> Vec<ContainerType> {
    let mut normalized: Vec<ContainerType> = Vec::with_capacity(catalog.len());
    for entry in catalog {
        if normalized.iter().any(|e| e.label == entry.label) {
            log::warn!(
                "Duplicate container type '{}' ignored; keeping first definition",
                entry.label
            );
            continue;
        }
        normalized.push(entry.clone());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_volume() {
        let b = BoxItem::new("B1", 10, 20, 30, 1);
        assert_eq!(b.volume(), 6000);
    }

    #[test]
    fn test_rotations_distinct() {
        let b = BoxItem::new("B1", 10, 20, 30, 1);
        let rotations = b.rotations();
        assert_eq!(rotations.len(), 6);
        assert_eq!(rotations[0], Vec3::new(10, 20, 30));
        assert_eq!(rotations[1], Vec3::new(10, 30, 20));
        assert_eq!(rotations[5], Vec3::new(30, 20, 10));
    }

    #[test]
    fn test_rotations_with_equal_sides() {
        let cube = BoxItem::new("C", 10, 10, 10, 1);
        assert_eq!(cube.rotations(), vec![Vec3::new(10, 10, 10)]);

        let slab = BoxItem::new("S", 10, 10, 5, 2);
        let rotations = slab.rotations();
        assert_eq!(rotations.len(), 3);
        assert_eq!(
            rotations,
            vec![Vec3::new(10, 10, 5), Vec3::new(10, 5, 10), Vec3::new(5, 10, 10)]
        );
    }

    #[test]
    fn test_rotations_preserve_components() {
        let b = BoxItem::new("B", 7, 3, 5, 1);
        for r in b.rotations() {
            assert_eq!(sorted_components(&r), [3, 5, 7]);
        }
    }

    #[test]
    fn test_fits_in() {
        let b = BoxItem::new("Long", 80, 10, 10, 1);
        assert!(b.fits_in(&Vec3::new(10, 10, 100)));
        assert!(!b.fits_in(&Vec3::new(50, 50, 50)));
    }

    #[test]
    fn test_validation() {
        assert!(BoxItem::new("ok", 1, 1, 1, 1).validate().is_ok());
        assert!(matches!(
            BoxItem::new("bad", 0, 1, 1, 1).validate(),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(ContainerType::new("C", 10, 10, 10).validate().is_ok());
        assert!(ContainerType::new("", 10, 10, 10).validate().is_err());
        assert!(ContainerType::new("C", 10, -1, 10).validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_dimensions() {
        let edge = MAX_DIMENSION;
        assert!(BoxItem::new("max", edge, edge, edge, 1).validate().is_ok());
        assert_eq!(
            BoxItem::new("max", edge, edge, edge, 1).volume(),
            8_000_000_000_000_000_000
        );

        assert!(matches!(
            BoxItem::new("huge", 3_000_000, 3_000_000, 3_000_000, 1).validate(),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            BoxItem::new("needle", Coord::MAX, 1, 1, 2).validate(),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            ContainerType::new("Hangar", 3_000_000, 3_000_000, 3_000_000).validate(),
            Err(Error::InvalidBoundary(_))
        ));
    }

    #[test]
    fn test_checked_volume() {
        assert_eq!(checked_volume(&Vec3::new(2, 3, 4)), Some(24));
        assert_eq!(checked_volume(&Vec3::new(3_000_000, 3_000_000, 3_000_000)), None);
    }

    #[test]
    fn test_expand_box_types() {
        let types = vec![
            BoxType::new("A", 10, 10, 10).with_quantity(2),
            BoxType::new("B", 5, 5, 5).with_quantity(0),
            BoxType::new("C", 1, 2, 3).with_quantity(1),
        ];
        let boxes = expand_box_types(&types);
        assert_eq!(boxes.len(), 3);
        assert_eq!(boxes[0].id(), 1);
        assert_eq!(boxes[1].id(), 2);
        assert_eq!(boxes[2].id(), 3);
        assert_eq!(boxes[2].label(), "C");
    }

    #[test]
    fn test_normalize_catalog_first_wins() {
        let catalog = vec![
            ContainerType::new("Small", 100, 100, 100),
            ContainerType::new("Large", 500, 500, 500),
            ContainerType::new("Small", 200, 200, 200),
        ];
        let normalized = normalize_catalog(&catalog);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].dimensions(), &Vec3::new(100, 100, 100));
        assert_eq!(normalized[1].label(), "Large");
    }
}

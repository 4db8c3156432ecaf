//! Packing result representation.
//!
//! [`PackingResult`] is the only structure handed to serialization,
//! visualization and validation. It is derived entirely from the live
//! container list by [`PackingResult::from_containers`].

use crate::container::PackingContainer;
use crate::geometry::{Coord, TotalVolume, Vec3};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

fn to_array(v: &Vec3) -> [Coord; 3] {
    [v.x, v.y, v.z]
}

/// A box as reported inside a container.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackedBoxReport {
    /// Box type label.
    pub label: String,
    /// Box instance id.
    pub box_id: usize,
    /// Dimensions as supplied.
    pub original_dimensions: [Coord; 3],
    /// Dimensions after rotation.
    pub placed_dimensions: [Coord; 3],
    /// Position of the min corner.
    pub position: [Coord; 3],
    /// Box volume.
    pub volume: Coord,
}

/// A used container with its contents.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerReport {
    /// 1-based container number.
    pub id: usize,
    /// Container type label.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub container_type: String,
    /// Container dimensions.
    pub dimensions: [Coord; 3],
    /// Container volume.
    pub volume: Coord,
    /// Sum of the volumes of the boxes inside.
    pub used_volume: Coord,
    /// `used_volume / volume`.
    pub utilization: f64,
    /// Boxes in placement order.
    pub boxes: Vec<PackedBoxReport>,
}

/// Result of a successful packing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PackingResult {
    /// Containers in creation order.
    pub containers: Vec<ContainerReport>,

    /// Number of containers used.
    pub total_containers: usize,

    /// Number of containers used per container type.
    pub container_counts: BTreeMap<String, usize>,

    /// Total volume of packed boxes.
    pub total_volume_used: TotalVolume,

    /// Total volume of the containers used.
    pub total_volume_available: TotalVolume,

    /// `total_volume_used / total_volume_available`, 0.0 when nothing is available.
    pub overall_utilization: f64,

    /// Strategy that produced this result.
    pub strategy: Option<String>,

    /// Computation time in milliseconds.
    pub computation_time_ms: u64,
}

impl PackingResult {
    /// Creates the zero-container result.
    pub fn empty() -> Self {
        Self {
            containers: Vec::new(),
            total_containers: 0,
            container_counts: BTreeMap::new(),
            total_volume_used: 0,
            total_volume_available: 0,
            overall_utilization: 0.0,
            strategy: None,
            computation_time_ms: 0,
        }
    }

    /// Builds the result from the final container list.
    pub fn from_containers(containers: &[PackingContainer]) -> Self {
        let mut result = Self::empty();

        for (i, container) in containers.iter().enumerate() {
            let boxes = container
                .placed_boxes()
                .iter()
                .map(|placed| PackedBoxReport {
                    label: placed.item.label().to_string(),
                    box_id: placed.item.id(),
                    original_dimensions: to_array(placed.item.dimensions()),
                    placed_dimensions: to_array(&placed.dimensions),
                    position: to_array(&placed.position),
                    volume: placed.item.volume(),
                })
                .collect();

            let used_volume = container.used_volume();
            result.total_volume_used += TotalVolume::from(used_volume);
            result.total_volume_available += TotalVolume::from(container.volume());
            *result
                .container_counts
                .entry(container.label().to_string())
                .or_insert(0) += 1;

            result.containers.push(ContainerReport {
                id: i + 1,
                container_type: container.label().to_string(),
                dimensions: to_array(container.dimensions()),
                volume: container.volume(),
                used_volume,
                utilization: container.utilization(),
                boxes,
            });
        }

        result.total_containers = result.containers.len();
        result.overall_utilization = if result.total_volume_available > 0 {
            result.total_volume_used as f64 / result.total_volume_available as f64
        } else {
            0.0
        };

        result
    }

    /// Sets the strategy name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    /// Returns the number of packed boxes across all containers.
    pub fn total_boxes(&self) -> usize {
        self.containers.iter().map(|c| c.boxes.len()).sum()
    }

    /// Returns overall utilization as a percentage string.
    pub fn utilization_percent(&self) -> String {
        format!("{:.1}%", self.overall_utilization * 100.0)
    }
}

impl Default for PackingResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// Summary statistics for a packing result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveSummary {
    /// Total boxes placed.
    pub total_placed: usize,
    /// Number of containers used.
    pub containers_used: usize,
    /// Utilization percentage.
    pub utilization_percent: f64,
    /// Computation time in milliseconds.
    pub time_ms: u64,
    /// Strategy used.
    pub strategy: String,
}

impl From<&PackingResult> for SolveSummary {
    fn from(result: &PackingResult) -> Self {
        Self {
            total_placed: result.total_boxes(),
            containers_used: result.total_containers,
            utilization_percent: result.overall_utilization * 100.0,
            time_ms: result.computation_time_ms,
            strategy: result
                .strategy
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

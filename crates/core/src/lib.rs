//! # bopax core
//!
//! Shared types for the bopax 3D bin packing engine.
//!
//! ## Core Components
//!
//! - **Geometry**: [`BoxItem`], [`BoxType`], [`ContainerType`] and box rotations
//! - **Spatial model**: [`PackingContainer`], [`PlacedBox`], [`FreeSpace`], [`SplitRule`]
//! - **Results**: [`PackingResult`] with per-container [`ContainerReport`]s
//! - **Solver trait**: [`Solver`], configured by [`Config`] and [`Strategy`]
//!
//! Dimensions are integer millimetres ([`Coord`]); positions and sizes are
//! [`Vec3`] vectors in (width/x, depth/y, height/z) order.
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod container;
pub mod error;
pub mod geometry;
pub mod result;
pub mod solver;

// Re-exports
pub use container::{ContainerSnapshot, FreeSpace, PackingContainer, PlacedBox, SplitRule};
pub use error::{Error, Result};
pub use geometry::{
    expand_box_types, normalize_catalog, BoxItem, BoxType, ContainerType, Coord, TotalVolume, Vec3,
    Vector3, MAX_DIMENSION,
};
pub use result::{ContainerReport, PackedBoxReport, PackingResult, SolveSummary};
pub use solver::{Config, ProgressCallback, ProgressEvent, Solver, Strategy};

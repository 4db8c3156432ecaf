//! # bopax
//!
//! 3D bin packing engine: assign boxes to containers drawn from a catalog of
//! container types, with no overlaps, every box inside its container, and as
//! few containers and as little wasted volume as possible.
//!
//! ## Quick Start
//!
//! ```rust
//! use bopax::{expand_box_types, BoxType, Config, ContainerType, Packer, Solver, Strategy};
//!
//! let boxes = expand_box_types(&[BoxType::new("Crate", 100, 100, 100)]);
//! let catalog = vec![ContainerType::new("Pallet", 100, 100, 100)];
//!
//! let packer = Packer::new(Config::default().with_strategy(Strategy::Optimal));
//! let result = packer.solve(&boxes, &catalog).unwrap();
//! assert_eq!(result.total_containers, 1);
//! assert_eq!(result.overall_utilization, 1.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support for inputs and results

/// Core types and traits.
pub use bopax_core as core;

/// Packing strategies.
pub use bopax_packing as packing;

// Re-export commonly used types at root level
pub use bopax_core::{
    expand_box_types, BoxItem, BoxType, Config, ContainerType, Error, PackingResult,
    ProgressCallback, ProgressEvent, Result, Solver, Strategy,
};
pub use bopax_packing::Packer;

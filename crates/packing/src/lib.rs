//! # bopax packing
//!
//! 3D bin packing strategies built on the `bopax-core` spatial model.
//!
//! ## Strategies
//!
//! | Packer | Approach | Free-space split |
//! |--------|----------|------------------|
//! | [`ExhaustivePacker`] | Backtracking over container budgets 1..=n | Guillotine |
//! | [`GreedyPacker`] | First-fit decreasing, single pass | Capped |
//! | [`HybridPacker`] | Best container per round from 3 heuristics | Guillotine |
//! | [`OptimalPacker`] | Best of 4 whole-problem passes | Capped |
//!
//! [`Packer`] dispatches on [`Config::strategy`](bopax_core::Config).
//!
//! ## Quick Start
//!
//! ```rust
//! use bopax_core::{expand_box_types, BoxType, Config, ContainerType, Solver, Strategy};
//! use bopax_packing::Packer;
//!
//! let boxes = expand_box_types(&[
//!     BoxType::new("Small", 50, 50, 50).with_quantity(2),
//!     BoxType::new("Big", 100, 100, 100),
//! ]);
//! let catalog = vec![
//!     ContainerType::new("S", 150, 150, 150),
//!     ContainerType::new("M", 300, 300, 300),
//! ];
//!
//! let packer = Packer::new(Config::default().with_strategy(Strategy::Greedy));
//! let result = packer.solve(&boxes, &catalog).unwrap();
//! assert_eq!(result.total_boxes(), 3);
//! ```

pub mod container_search;
pub mod exhaustive;
pub mod greedy;
pub mod hybrid;
pub mod optimal;
pub mod packer;
pub mod packing_utils;
pub mod placement;

// Re-exports
pub use container_search::{ContainerCandidate, ContainerSearch};
pub use exhaustive::ExhaustivePacker;
pub use greedy::GreedyPacker;
pub use hybrid::HybridPacker;
pub use optimal::{OptimalPacker, Pass};
pub use packer::Packer;
pub use placement::{candidate_positions, place_first_fit};

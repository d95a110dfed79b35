//! Incremental A* shortest paths on editable 2D grids.
//!
//! A [`GridGraph`] holds the fixed topology of a `width × height` grid
//! (4- or 8-connected adjacency stored as index lists) together with the
//! mutable obstacle flags and start/end endpoints. An [`AStarSolver`] runs a
//! search over it and returns a [`SearchState`] with per-node visited flags,
//! costs and parent links alongside the [`SolveOutcome`]. [`Planner`] bundles
//! the two for front ends that edit a grid and re-solve after each change.
//!
//! Edge cost is the Euclidean distance between adjacent cells (1 orthogonal,
//! √2 diagonal) and the default heuristic is Euclidean distance, so returned
//! paths are shortest paths. Among equal-priority frontier nodes the one
//! inserted first is expanded first, which makes results reproducible.
//!
//! ```
//! use gridstar_core::Point;
//! use gridstar_paths::{Planner, SolveOutcome};
//!
//! let mut planner = Planner::new(3, 3).unwrap();
//! let path = planner.solve().path().unwrap().points().to_vec();
//! assert_eq!(path, vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]);
//!
//! for y in 0..3 {
//!     planner.set_obstacle(Point::new(1, y), true).unwrap();
//! }
//! assert_eq!(planner.solve(), SolveOutcome::NoPath);
//! ```

mod astar;
mod config;
mod distance;
mod error;
mod graph;
mod planner;
mod state;

pub use astar::AStarSolver;
pub use config::{AStarConfig, Heuristic, Relaxation};
pub use distance::{euclidean, manhattan, octile};
pub use error::GridError;
pub use graph::{Connectivity, GridGraph};
pub use planner::Planner;
pub use state::{NodeSnapshot, Path, SearchState, SolveOutcome};

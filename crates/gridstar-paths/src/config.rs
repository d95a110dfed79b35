//! Solver configuration.

use gridstar_core::Point;

use crate::distance;

/// Remaining-cost estimate used to order the frontier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// Straight-line distance. Admissible and consistent for both
    /// connectivities.
    #[default]
    Euclidean,
    /// Octile distance. Tighter than Euclidean on 8-connected grids.
    Octile,
    /// Taxicab distance. Only admissible on 4-connected grids.
    Manhattan,
    /// No estimate; the search degenerates to Dijkstra.
    Zero,
}

impl Heuristic {
    #[inline]
    pub fn estimate(self, from: Point, to: Point) -> f32 {
        match self {
            Self::Euclidean => distance::euclidean(from, to),
            Self::Octile => distance::octile(from, to),
            Self::Manhattan => distance::manhattan(from, to),
            Self::Zero => 0.0,
        }
    }
}

/// Which neighbors of an expanded node get their cost relaxed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Relaxation {
    /// Relax only neighbors admitted to the open set (not visited, not an
    /// obstacle). Obstacle cells keep infinite costs and no parent.
    #[default]
    Traversable,
    /// Relax every neighbor, obstacles and visited nodes included. Costs
    /// and parents then show up on obstacle cells too.
    Unconditional,
}

/// A* settings.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AStarConfig {
    pub heuristic: Heuristic,
    pub relaxation: Relaxation,
    /// Maximum number of node expansions before giving up. `None` searches
    /// until the frontier is exhausted.
    pub max_expansions: Option<usize>,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::Euclidean,
            relaxation: Relaxation::Traversable,
            max_expansions: None,
        }
    }
}

impl AStarConfig {
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_relaxation(mut self, relaxation: Relaxation) -> Self {
        self.relaxation = relaxation;
        self
    }

    /// Bound the number of expansions per solve.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }
}

//! One editable grid plus its latest solve, for interactive front ends.

use gridstar_core::Point;

use crate::astar::AStarSolver;
use crate::config::AStarConfig;
use crate::error::GridError;
use crate::graph::{Connectivity, GridGraph};
use crate::state::{NodeSnapshot, SearchState, SolveOutcome};

/// Owns a [`GridGraph`] and the [`SearchState`] of its last solve.
///
/// A rendering/input layer edits obstacles and endpoints through the
/// planner, calls [`solve`](Self::solve), and reads cells back with
/// [`node_at`](Self::node_at). Edits do not re-solve on their own; until the
/// next `solve` the snapshots show the previous run's search fields against
/// the current obstacles and endpoints.
#[derive(Clone, Debug)]
pub struct Planner {
    graph: GridGraph,
    solver: AStarSolver,
    state: Option<SearchState>,
}

impl Planner {
    /// An 8-connected `width × height` planner with default settings.
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        Ok(Self::from_graph(GridGraph::new(width, height)?, AStarConfig::default()))
    }

    pub fn with_config(
        width: i32,
        height: i32,
        connectivity: Connectivity,
        config: AStarConfig,
    ) -> Result<Self, GridError> {
        let graph = GridGraph::with_connectivity(width, height, connectivity)?;
        Ok(Self::from_graph(graph, config))
    }

    pub fn from_graph(graph: GridGraph, config: AStarConfig) -> Self {
        Self {
            graph,
            solver: AStarSolver::new(config),
            state: None,
        }
    }

    #[inline]
    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// The last solve, if any.
    #[inline]
    pub fn state(&self) -> Option<&SearchState> {
        self.state.as_ref()
    }

    pub fn set_obstacle(&mut self, p: Point, value: bool) -> Result<(), GridError> {
        self.graph.set_obstacle(p, value)
    }

    pub fn toggle_obstacle(&mut self, p: Point) -> Result<bool, GridError> {
        self.graph.toggle_obstacle(p)
    }

    pub fn set_obstacle_brush(&mut self, p: Point, value: bool) -> Result<(), GridError> {
        self.graph.set_obstacle_brush(p, value)
    }

    pub fn clear_obstacles(&mut self) {
        self.graph.clear_obstacles();
    }

    pub fn set_start(&mut self, p: Point) -> Result<(), GridError> {
        self.graph.set_start(p)
    }

    pub fn set_end(&mut self, p: Point) -> Result<(), GridError> {
        self.graph.set_end(p)
    }

    /// Re-run the search for the current configuration.
    pub fn solve(&mut self) -> SolveOutcome {
        let state = self.state.get_or_insert_with(SearchState::default);
        self.solver.solve_into(&self.graph, state).clone()
    }

    /// Snapshot of `p`, including the last solve's search fields.
    pub fn node_at(&self, p: Point) -> Result<NodeSnapshot, GridError> {
        match &self.state {
            Some(state) => state.node_at(&self.graph, p),
            None => self.graph.node_at(p),
        }
    }
}

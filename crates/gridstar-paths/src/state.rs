use gridstar_core::{Point, Range};

use crate::error::GridError;
use crate::graph::GridGraph;

/// Sentinel for "no node" in parent links and insertion sequence numbers.
pub(crate) const NONE: usize = usize::MAX;

/// A found path: the cells from start to end inclusive and the total cost.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    points: Vec<Point>,
    cost: f32,
}

impl Path {
    pub(crate) fn new(points: Vec<Point>, cost: f32) -> Self {
        Self { points, cost }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Sum of edge costs along the path.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// Number of cells, endpoints included.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// `false` for any constructed path: a path holds at least its start.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

/// Result of a solve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolveOutcome {
    Found(Path),
    /// The end cannot be reached from the start.
    NoPath,
    /// The expansion budget ran out before the search finished.
    Exhausted { expanded: usize },
}

impl SolveOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Read-only view of one node, for rendering and inspection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSnapshot {
    pub pos: Point,
    pub is_obstacle: bool,
    pub is_visited: bool,
    pub is_start: bool,
    pub is_end: bool,
    /// Part of the last reconstructed path.
    pub on_path: bool,
    pub local_cost: f32,
    pub global_cost: f32,
    pub parent: Option<Point>,
}

// ---------------------------------------------------------------------------
// Per-run node bookkeeping
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct NodeState {
    pub(crate) visited: bool,
    pub(crate) local: f32,
    pub(crate) global: f32,
    pub(crate) parent: usize,
    /// Order of first insertion into the open set, or `NONE`.
    pub(crate) seq: usize,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            visited: false,
            local: f32::INFINITY,
            global: f32::INFINITY,
            parent: NONE,
            seq: NONE,
        }
    }
}

/// Everything one solve leaves behind: per-node visited flags, costs and
/// parent links, plus the outcome.
///
/// A `SearchState` is tied to the grid dimensions it was solved on. Reusing
/// one through [`AStarSolver::solve_into`](crate::AStarSolver::solve_into)
/// resets it first, so nothing leaks between runs.
#[derive(Clone, Debug)]
pub struct SearchState {
    pub(crate) rng: Range,
    pub(crate) nodes: Vec<NodeState>,
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) expanded: usize,
    pub(crate) outcome: SolveOutcome,
    path_mask: Vec<bool>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            rng: Range::default(),
            nodes: Vec::new(),
            start: 0,
            end: 0,
            expanded: 0,
            outcome: SolveOutcome::NoPath,
            path_mask: Vec::new(),
        }
    }
}

impl SearchState {
    /// Restore every node to its initial values for a run over `rng`.
    pub(crate) fn reset(&mut self, rng: Range, start: usize, end: usize) {
        let len = rng.len();
        self.rng = rng;
        self.nodes.clear();
        self.nodes.resize(len, NodeState::default());
        self.path_mask.clear();
        self.path_mask.resize(len, false);
        self.start = start;
        self.end = end;
        self.expanded = 0;
        self.outcome = SolveOutcome::NoPath;
    }

    /// Record the outcome, reconstructing the path when the end was reached.
    pub(crate) fn finish(&mut self, reached: bool, exhausted: bool) {
        self.outcome = if reached {
            let mut chain = self.chain(self.end);
            chain.reverse();
            let points = chain
                .into_iter()
                .map(|i| {
                    self.path_mask[i] = true;
                    self.rng.point_at(i)
                })
                .collect();
            SolveOutcome::Found(Path::new(points, self.nodes[self.end].local))
        } else if exhausted {
            SolveOutcome::Exhausted {
                expanded: self.expanded,
            }
        } else {
            SolveOutcome::NoPath
        };
    }

    /// Indices along parent links from `from`, `from` first.
    fn chain(&self, from: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut ci = from;
        // Parent links always point at a strictly cheaper node, so the walk
        // terminates; the bound only guards the arena size.
        while ci != NONE && out.len() < self.nodes.len() {
            out.push(ci);
            ci = self.nodes[ci].parent;
        }
        out
    }

    #[inline]
    fn node(&self, p: Point) -> Option<&NodeState> {
        self.rng.index_of(p).and_then(|i| self.nodes.get(i))
    }

    // -----------------------------------------------------------------------
    // Public queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn outcome(&self) -> &SolveOutcome {
        &self.outcome
    }

    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.outcome.path()
    }

    /// Number of nodes expanded (marked visited) by the run.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Start the run searched from; `(0, 0)` for a state never solved.
    pub fn start(&self) -> Point {
        if self.nodes.is_empty() {
            return Point::ZERO;
        }
        self.rng.point_at(self.start)
    }

    /// End the run searched for; `(0, 0)` for a state never solved.
    pub fn end(&self) -> Point {
        if self.nodes.is_empty() {
            return Point::ZERO;
        }
        self.rng.point_at(self.end)
    }

    pub fn is_visited(&self, p: Point) -> bool {
        self.node(p).is_some_and(|n| n.visited)
    }

    /// Best known cost from the start; infinite when never reached.
    pub fn local_cost(&self, p: Point) -> f32 {
        self.node(p).map_or(f32::INFINITY, |n| n.local)
    }

    /// Local cost plus heuristic; infinite when never reached.
    pub fn global_cost(&self, p: Point) -> f32 {
        self.node(p).map_or(f32::INFINITY, |n| n.global)
    }

    pub fn parent(&self, p: Point) -> Option<Point> {
        let n = self.node(p)?;
        (n.parent != NONE).then(|| self.rng.point_at(n.parent))
    }

    pub fn on_path(&self, p: Point) -> bool {
        self.rng
            .index_of(p)
            .and_then(|i| self.path_mask.get(i).copied())
            .unwrap_or(false)
    }

    /// The parent chain from the end backwards, end first.
    ///
    /// Available even when no path was found (e.g. an unconditionally
    /// relaxed obstacle end), since renderers draw whatever chain exists.
    pub fn trail(&self) -> Vec<Point> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        self.chain(self.end)
            .into_iter()
            .map(|i| self.rng.point_at(i))
            .collect()
    }

    /// Full snapshot of `p`: static fields from `graph`, search fields from
    /// this run. A solved state must be paired with a graph of the size it
    /// was solved on; a never-solved state contributes nothing.
    pub fn node_at(&self, graph: &GridGraph, p: Point) -> Result<NodeSnapshot, GridError> {
        let mut snap = graph.node_at(p)?;
        if self.nodes.is_empty() {
            return Ok(snap);
        }
        debug_assert_eq!(
            self.rng,
            graph.range(),
            "search state solved on a different grid"
        );
        if let Some(n) = self.node(p) {
            snap.is_visited = n.visited;
            snap.local_cost = n.local;
            snap.global_cost = n.global;
            snap.parent = self.parent(p);
            snap.on_path = self.on_path(p);
        }
        Ok(snap)
    }
}

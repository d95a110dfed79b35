//! Static grid topology plus the editable obstacle/endpoint configuration.

use gridstar_core::{Point, Range};

use crate::error::GridError;
use crate::state::NodeSnapshot;

/// Neighborhood used when building adjacency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Orthogonal moves only.
    Four,
    /// Orthogonal and diagonal moves.
    #[default]
    Eight,
}

impl Connectivity {
    // Order matters: it fixes neighbor iteration and thus tie-breaking.
    const ORTHOGONAL: [Point; 4] = [
        Point::new(0, -1),
        Point::new(0, 1),
        Point::new(-1, 0),
        Point::new(1, 0),
    ];
    const ALL: [Point; 8] = [
        Point::new(0, -1),
        Point::new(0, 1),
        Point::new(-1, 0),
        Point::new(1, 0),
        Point::new(-1, -1),
        Point::new(-1, 1),
        Point::new(1, -1),
        Point::new(1, 1),
    ];

    /// Neighbor offsets: up, down, left, right, then (for `Eight`) up-left,
    /// down-left, up-right, down-right.
    pub fn offsets(self) -> &'static [Point] {
        match self {
            Self::Four => &Self::ORTHOGONAL,
            Self::Eight => &Self::ALL,
        }
    }
}

/// A fixed-size grid of nodes with precomputed adjacency.
///
/// Nodes live in a row-major arena (index `y * width + x`). Adjacency is
/// stored as flat index lists and never changes after construction; only
/// obstacle flags and the start/end endpoints are mutable.
#[derive(Clone, Debug)]
pub struct GridGraph {
    rng: Range,
    connectivity: Connectivity,
    obstacles: Vec<bool>,
    // neighbors of node i are adjacency[offsets[i]..offsets[i + 1]]
    offsets: Vec<usize>,
    adjacency: Vec<usize>,
    start: usize,
    end: usize,
}

impl GridGraph {
    /// Create an 8-connected `width × height` grid with no obstacles, start
    /// at `(0, 0)` and end at `(width - 1, height - 1)`.
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        Self::with_connectivity(width, height, Connectivity::Eight)
    }

    /// Like [`new`](Self::new) with an explicit neighborhood.
    pub fn with_connectivity(
        width: i32,
        height: i32,
        connectivity: Connectivity,
    ) -> Result<Self, GridError> {
        let invalid = GridError::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        let dirs = connectivity.offsets();
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(invalid.clone())?;
        let adjacency_len = len.checked_mul(dirs.len()).ok_or(invalid.clone())?;
        if adjacency_len > isize::MAX as usize / std::mem::size_of::<usize>() {
            return Err(invalid);
        }

        // Grids too large to allocate are rejected rather than aborting.
        let mut offsets: Vec<usize> = Vec::new();
        let mut adjacency: Vec<usize> = Vec::new();
        let mut obstacles: Vec<bool> = Vec::new();
        offsets
            .try_reserve_exact(len + 1)
            .and_then(|()| adjacency.try_reserve_exact(adjacency_len))
            .and_then(|()| obstacles.try_reserve_exact(len))
            .map_err(|_| invalid)?;
        obstacles.resize(len, false);

        let rng = Range::with_size(width, height);
        offsets.push(0);
        for p in rng.iter() {
            adjacency.extend(dirs.iter().filter_map(|&d| rng.index_of(p + d)));
            offsets.push(adjacency.len());
        }

        Ok(Self {
            rng,
            connectivity,
            obstacles,
            offsets,
            adjacency,
            start: 0,
            end: len - 1,
        })
    }

    /// Build an 8-connected grid from an ASCII layout.
    ///
    /// See [`parse_with`](Self::parse_with).
    pub fn parse(s: &str) -> Result<Self, GridError> {
        Self::parse_with(s, Connectivity::Eight)
    }

    /// Build a grid from an ASCII layout.
    ///
    /// `.` is a free cell, `#` an obstacle, `S` the start and `E` the end.
    /// Leading/trailing whitespace around the whole text is trimmed and
    /// every line must have the same width. Endpoints not given keep their
    /// defaults; if a marker repeats, the last one wins.
    pub fn parse_with(s: &str, connectivity: Connectivity) -> Result<Self, GridError> {
        let s = s.trim();
        let lines: Vec<&str> = s.lines().collect();
        let width = lines.first().map_or(0, |l| l.chars().count());
        if width == 0 || lines.iter().any(|l| l.chars().count() != width) {
            return Err(GridError::InconsistentSize(s.to_string()));
        }

        let mut graph = Self::with_connectivity(width as i32, lines.len() as i32, connectivity)?;
        for (y, line) in lines.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let p = Point::new(x as i32, y as i32);
                match ch {
                    '.' => {}
                    '#' => graph.set_obstacle(p, true)?,
                    'S' => graph.set_start(p)?,
                    'E' => graph.set_end(p)?,
                    _ => return Err(GridError::InvalidRune { ch, pos: p }),
                }
            }
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Dimensions
    // -----------------------------------------------------------------------

    #[inline]
    pub fn width(&self) -> i32 {
        self.rng.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.rng.height()
    }

    /// (width, height) as a point.
    #[inline]
    pub fn size(&self) -> Point {
        self.rng.size()
    }

    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    /// Number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    /// `false` for any constructed graph: construction rejects empty grids.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    #[inline]
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.rng.contains(p)
    }

    // -----------------------------------------------------------------------
    // Obstacles
    // -----------------------------------------------------------------------

    /// Set or clear the obstacle flag at `p`.
    pub fn set_obstacle(&mut self, p: Point, value: bool) -> Result<(), GridError> {
        let i = self.checked_index(p)?;
        self.obstacles[i] = value;
        Ok(())
    }

    /// Flip the obstacle flag at `p` and return its new value.
    pub fn toggle_obstacle(&mut self, p: Point) -> Result<bool, GridError> {
        let i = self.checked_index(p)?;
        self.obstacles[i] = !self.obstacles[i];
        Ok(self.obstacles[i])
    }

    /// Set or clear the obstacle flag at `p` and at every node adjacent to
    /// it.
    pub fn set_obstacle_brush(&mut self, p: Point, value: bool) -> Result<(), GridError> {
        let i = self.checked_index(p)?;
        let (lo, hi) = (self.offsets[i], self.offsets[i + 1]);
        for &ni in &self.adjacency[lo..hi] {
            self.obstacles[ni] = value;
        }
        self.obstacles[i] = value;
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.fill(false);
    }

    /// Whether `p` is an obstacle. Points outside the grid are not.
    #[inline]
    pub fn is_obstacle(&self, p: Point) -> bool {
        self.index(p).is_some_and(|i| self.obstacles[i])
    }

    /// All obstacle positions in row-major order.
    pub fn obstacles(&self) -> impl Iterator<Item = Point> + '_ {
        self.obstacles
            .iter()
            .enumerate()
            .filter(|&(_, &blocked)| blocked)
            .map(|(i, _)| self.point(i))
    }

    // -----------------------------------------------------------------------
    // Endpoints
    // -----------------------------------------------------------------------

    /// Move the start. Obstacle cells are accepted.
    pub fn set_start(&mut self, p: Point) -> Result<(), GridError> {
        self.start = self.checked_index(p)?;
        Ok(())
    }

    /// Move the end. An obstacle end is accepted but is never reachable.
    pub fn set_end(&mut self, p: Point) -> Result<(), GridError> {
        self.end = self.checked_index(p)?;
        Ok(())
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.point(self.start)
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.point(self.end)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Positions adjacent to `p`, in neighbor order.
    pub fn neighbors(&self, p: Point) -> Result<impl Iterator<Item = Point> + '_, GridError> {
        let i = self.checked_index(p)?;
        Ok(self.neighbor_indices(i).iter().map(|&ni| self.point(ni)))
    }

    /// Snapshot of the static state at `p`. Search fields hold their reset
    /// values; use [`SearchState::node_at`](crate::SearchState::node_at) for
    /// the result of a solve.
    pub fn node_at(&self, p: Point) -> Result<NodeSnapshot, GridError> {
        let i = self.checked_index(p)?;
        Ok(NodeSnapshot {
            pos: p,
            is_obstacle: self.obstacles[i],
            is_visited: false,
            is_start: i == self.start,
            is_end: i == self.end,
            on_path: false,
            local_cost: f32::INFINITY,
            global_cost: f32::INFINITY,
            parent: None,
        })
    }

    // -----------------------------------------------------------------------
    // Index helpers
    // -----------------------------------------------------------------------

    #[inline]
    pub(crate) fn index(&self, p: Point) -> Option<usize> {
        self.rng.index_of(p)
    }

    pub(crate) fn checked_index(&self, p: Point) -> Result<usize, GridError> {
        self.index(p).ok_or(GridError::OutOfBounds {
            pos: p,
            size: self.size(),
        })
    }

    #[inline]
    pub(crate) fn point(&self, idx: usize) -> Point {
        self.rng.point_at(idx)
    }

    #[inline]
    pub(crate) fn neighbor_indices(&self, idx: usize) -> &[usize] {
        &self.adjacency[self.offsets[idx]..self.offsets[idx + 1]]
    }

    #[inline]
    pub(crate) fn is_obstacle_index(&self, idx: usize) -> bool {
        self.obstacles[idx]
    }

    #[inline]
    pub(crate) fn start_index(&self) -> usize {
        self.start
    }

    #[inline]
    pub(crate) fn end_index(&self) -> usize {
        self.end
    }
}

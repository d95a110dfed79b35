use gridstar_core::Point;

/// Euclidean (L2) distance between two points.
///
/// This is also the edge cost between adjacent cells: 1 for orthogonal
/// steps and √2 for diagonal ones.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Octile distance: the cost of the cheapest 8-connected route ignoring
/// obstacles.
#[inline]
pub fn octile(a: Point, b: Point) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    lo as f32 * std::f32::consts::SQRT_2 + (hi - lo) as f32
}

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> f32 {
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as f32
}

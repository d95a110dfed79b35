use std::fmt;

use gridstar_core::Point;

/// Errors reported by grid construction and editing.
///
/// An unreachable goal is not an error: see
/// [`SolveOutcome::NoPath`](crate::SolveOutcome::NoPath).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is not positive, or the cell count overflows.
    InvalidDimensions { width: i32, height: i32 },
    /// A coordinate lies outside `[0, width) × [0, height)`.
    OutOfBounds { pos: Point, size: Point },
    /// An ASCII layout is empty or its lines have different widths.
    InconsistentSize(String),
    /// An ASCII layout contains a character other than `.`, `#`, `S`, `E`.
    InvalidRune { ch: char, pos: Point },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid grid dimensions {width}x{height}")
            }
            Self::OutOfBounds { pos, size } => {
                write!(f, "position {pos} out of bounds for {}x{} grid", size.x, size.y)
            }
            Self::InconsistentSize(s) => write!(f, "grid layout: inconsistent size:\n{s}"),
            Self::InvalidRune { ch, pos } => {
                write!(f, "grid layout contains invalid rune \u{201c}{ch}\u{201d} at {pos}")
            }
        }
    }
}

impl std::error::Error for GridError {}

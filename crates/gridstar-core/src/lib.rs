//! **gridstar-core**: geometry primitives shared by the *gridstar* crates.
//!
//! Grid cells are addressed by integer [`Point`]s inside a half-open
//! [`Range`], which also provides the row-major index mapping used by the
//! node arenas in `gridstar-paths`.

pub mod geom;

pub use geom::{Point, Range, RangeIter};

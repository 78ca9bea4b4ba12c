//! Broad-phase collision grid: a uniform 3D cell index over a triangle set,
//! traversed with a DDA (Amanatides-Woo) ray march for amortized-O(1)
//! segment-vs-mesh queries.

mod grid;

pub use grid::{Cell, Grid, Trace, MAX_TRACE_STEPS};

//! Ring layout and drawing
//!
//! - Ring capacity table and bitstream partition
//! - Differential run-length marks within a ring
//! - The canvas seam plus SVG and raster canvases

/// Drawing seam and the deterministic render sequence
pub mod canvas;
/// Run-length arcs and dots
pub mod marks;
/// Raster canvas producing grayscale images
pub mod raster;
/// Ring capacities, partition and marker placement
pub mod rings;
/// SVG canvas with a per-ring color gradient
pub mod svg;

pub use canvas::{Canvas, Group, code_extent, render};
pub use marks::{BoundaryPolicy, Mark, RingMarks};
pub use raster::RasterCanvas;
pub use rings::{MarkerPlacement, Ring, RingLayout, RingTable};
pub use svg::{SvgCanvas, SvgStyle};

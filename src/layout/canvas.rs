//! Drawing seam between the ring layout and concrete output formats.
//!
//! Coordinates are in drawing units around the code center at the origin,
//! y pointing down; angles are clockwise degrees from straight up.

use crate::encoder::EncodedCode;
use crate::layout::marks::Mark;
use crate::layout::rings::{
    CENTER_RADIUS, DOT_RADIUS, ORIENTATION_GAP_DEG, ORIENTATION_RADIUS, RingLayout, STROKE_WIDTH,
    ring_radius,
};
use crate::models::Point;
use crate::utils::geometry::polar_to_cartesian;

/// Maximum characters per label line.
pub const LABEL_LINE_CHARS: usize = 24;

/// Drawing group, used by canvases to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Center disc, orientation ring, orientation dot and outer marker
    Structure,
    /// Marks of one data ring
    Ring {
        /// Ring number, 1-based
        number: usize,
        /// Number of data rings in the code
        total: usize,
    },
}

/// Output surface for a rendered code.
pub trait Canvas {
    /// Start a group; every draw call until `end_group` belongs to it.
    fn begin_group(&mut self, group: Group);
    /// Stroke a clockwise arc of `STROKE_WIDTH` with round caps.
    fn draw_arc(&mut self, radius: f32, start_deg: f32, end_deg: f32);
    /// Fill a disc.
    fn draw_dot(&mut self, center: Point, radius: f32);
    /// Write text lines below the code.
    fn draw_text(&mut self, lines: &[String]);
    /// Close the current group.
    fn end_group(&mut self);
}

/// Radius enclosing every mark of `layout`, stroke included.
pub fn code_extent(layout: &RingLayout) -> f32 {
    let outer = if layout.rings.is_empty() {
        ORIENTATION_RADIUS
    } else {
        ring_radius(layout.drawn_rings())
    };
    outer + STROKE_WIDTH / 2.0
}

/// Split `text` into lines of at most `LABEL_LINE_CHARS` characters.
pub fn label_lines(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(LABEL_LINE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Emit the draw calls for `code`, always in the same order.
pub fn render<C: Canvas + ?Sized>(code: &EncodedCode, canvas: &mut C, label: Option<&str>) {
    let origin = Point::default();

    canvas.begin_group(Group::Structure);
    canvas.draw_dot(origin, CENTER_RADIUS);
    canvas.draw_dot(polar_to_cartesian(&origin, ORIENTATION_RADIUS, 0.0), DOT_RADIUS);
    canvas.draw_arc(
        ORIENTATION_RADIUS,
        ORIENTATION_GAP_DEG,
        360.0 - ORIENTATION_GAP_DEG,
    );
    if !code.layout.rings.is_empty() {
        let marker_radius = ring_radius(code.layout.marker.ring());
        canvas.draw_dot(polar_to_cartesian(&origin, marker_radius, 0.0), DOT_RADIUS);
    }
    canvas.end_group();

    let total = code.layout.rings.len();
    for ring in &code.marks {
        canvas.begin_group(Group::Ring {
            number: ring.ring,
            total,
        });
        for mark in &ring.marks {
            match *mark {
                Mark::Dot { angle, .. } => {
                    canvas.draw_dot(polar_to_cartesian(&origin, ring.radius, angle), DOT_RADIUS)
                }
                Mark::Arc { start, end, .. } => canvas.draw_arc(ring.radius, start, end),
            }
        }
        canvas.end_group();
    }

    if let Some(text) = label {
        let lines = label_lines(text);
        if !lines.is_empty() {
            canvas.draw_text(&lines);
        }
    }
}

use crate::models::{CandidateShape, Point};

/// The code's center and the two nested structures anchoring it.
#[derive(Debug, Clone)]
pub struct CenterDescriptor {
    /// Center coordinate (centroid of the center disc)
    pub center: Point,
    /// Filled center disc
    pub center_shape: CandidateShape,
    /// Broken ring around the center disc
    pub orientation_ring: CandidateShape,
}

/// The orientation dot, which fixes 0° and the base length unit.
#[derive(Debug, Clone)]
pub struct OrientationDescriptor {
    /// The dot shape
    pub dot: CandidateShape,
    /// Centroid distance from the code center
    pub distance: f32,
    /// Vector from the code center to the dot
    pub axis: Point,
}

/// A candidate with its position relative to the code center.
#[derive(Debug, Clone)]
pub struct PlacedShape {
    /// The underlying shape
    pub shape: CandidateShape,
    /// Clockwise angle from the orientation axis in [0, 360)
    pub angle: f32,
    /// Farthest outline point from the code center
    pub outer_radius: f32,
}

/// Shapes sharing one radius band, sorted by angle.
#[derive(Debug, Clone, Default)]
pub struct RingGroup {
    /// Members in ascending angle order
    pub members: Vec<PlacedShape>,
}

impl RingGroup {
    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Everything the locator knows about one code in an image.
#[derive(Debug, Clone)]
pub struct LocatedCode {
    /// Center descriptor
    pub center: CenterDescriptor,
    /// Orientation descriptor
    pub orientation: OrientationDescriptor,
    /// Ring groups: 0 = center disc, 1 = orientation ring and dot, 2.. = data
    pub rings: Vec<RingGroup>,
    /// Candidates left after outlier removal
    pub retained: usize,
}

//! Code geometry recovery from candidate shapes.
//!
//! Locating runs in four steps, each producing a new descriptor:
//! 1. Center: the best scoring nested pair of center disc and orientation ring
//! 2. Orientation: the nearest shape smaller than the center disc
//! 3. Sanitization: drop shapes separated from the code by a radial gap
//! 4. Grouping: split the survivors into rings by outer radius

use tracing::debug;

use crate::detector::hough::HoughCircle;
use crate::error::{FgcError, LocatorError, Result};
use crate::models::{
    CandidateShape, CenterDescriptor, LocatedCode, OrientationDescriptor, PlacedShape, Point,
    RingGroup,
};
use crate::utils::geometry::signed_angle_deg;

/// Weights and thresholds used to recover the code geometry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Weight of the centroid offset between the pair members
    pub w_offset: f32,
    /// Weight of the pair midpoint's distance to the nearest circle center
    pub w_hough: f32,
    /// Weight of the summed side counts
    pub w_sides: f32,
    /// Weight of the mean fill intensity
    pub w_dark: f32,
    /// Weight of the near-equal size penalty
    pub w_equal: f32,
    /// Weight of the larger member's reach around the smaller's centroid
    pub w_enclose: f32,
    /// Smallest enclosed-area to rectangle-area ratio of a center disc
    pub min_center_fill: f32,
    /// Largest rectangle area ratio between the two pair members
    pub max_pair_area_ratio: f32,
    /// Radial gap, relative to the dot distance, that ends the code
    pub sanitize_jump_fraction: f32,
    /// Radial gap, relative to the dot distance, that starts a new ring
    pub ring_jump_fraction: f32,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            w_offset: 1.0,
            w_hough: 1.0,
            w_sides: 0.5,
            w_dark: 0.05,
            w_equal: 0.25,
            w_enclose: 1.0,
            min_center_fill: 0.5,
            max_pair_area_ratio: 0.8,
            sanitize_jump_fraction: 0.7,
            ring_jump_fraction: 0.3,
        }
    }
}

/// Recovers center, orientation and rings from candidate shapes.
#[derive(Debug, Clone, Default)]
pub struct CodeLocator {
    config: LocatorConfig,
}

impl CodeLocator {
    /// Create a locator with custom settings
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Run every locating step.
    pub fn locate(&self, shapes: &[CandidateShape], circles: &[HoughCircle]) -> Result<LocatedCode> {
        let center = self.find_center(shapes, circles)?;
        let orientation = self.find_orientation(shapes, &center)?;
        let placed = self.sanitize(shapes, &center, &orientation)?;
        let retained = placed.len();
        let rings = self.group_rings(placed, orientation.distance);

        debug!(
            center_x = center.center.x,
            center_y = center.center.y,
            dot_distance = orientation.distance,
            retained,
            rings = rings.len(),
            "code located"
        );
        Ok(LocatedCode {
            center,
            orientation,
            rings,
            retained,
        })
    }

    /// Composite score of a pair, lower is better; `None` if inadmissible.
    ///
    /// `a` must be the member with the smaller rectangle.
    pub fn pair_score(
        &self,
        a: &CandidateShape,
        b: &CandidateShape,
        circles: &[HoughCircle],
    ) -> Option<f32> {
        let cfg = &self.config;
        let (area_a, area_b) = (a.area(), b.area());
        if area_b <= f32::EPSILON || area_a > cfg.max_pair_area_ratio * area_b {
            return None;
        }
        if a.solidity() < cfg.min_center_fill || b.contains(&a.centroid) {
            return None;
        }

        let midpoint = Point::new(
            (a.centroid.x + b.centroid.x) / 2.0,
            (a.centroid.y + b.centroid.y) / 2.0,
        );
        let hough = circles
            .iter()
            .map(|c| c.center.distance(&midpoint))
            .fold(f32::INFINITY, f32::min);
        if !hough.is_finite() {
            return None;
        }

        Some(
            cfg.w_offset * a.centroid.distance(&b.centroid)
                + cfg.w_hough * hough
                + cfg.w_sides * (a.sides + b.sides) as f32
                + cfg.w_dark * (a.intensity + b.intensity) / 2.0
                + cfg.w_equal * (area_a / area_b) * area_a.sqrt()
                + cfg.w_enclose * b.outer_radius(&a.centroid),
        )
    }

    /// Select the center disc and orientation ring.
    pub fn find_center(
        &self,
        shapes: &[CandidateShape],
        circles: &[HoughCircle],
    ) -> std::result::Result<CenterDescriptor, LocatorError> {
        if circles.is_empty() {
            return Err(LocatorError::NoHoughCircle);
        }

        let mut best: Option<(f32, usize, usize)> = None;
        for (i, a) in shapes.iter().enumerate() {
            for (j, b) in shapes.iter().enumerate() {
                if i == j || a.area() > b.area() || (a.area() == b.area() && i > j) {
                    continue;
                }
                let Some(score) = self.pair_score(a, b, circles) else {
                    continue;
                };
                if best.is_none_or(|(s, _, _)| score < s) {
                    best = Some((score, i, j));
                }
            }
        }

        let (score, i, j) = best.ok_or(LocatorError::NoCenterFound {
            candidates: shapes.len(),
        })?;
        debug!(score, center_id = shapes[i].id, ring_id = shapes[j].id, "center pair");
        Ok(CenterDescriptor {
            center: shapes[i].centroid,
            center_shape: shapes[i].clone(),
            orientation_ring: shapes[j].clone(),
        })
    }

    /// Nearest shape to the center that is smaller than the center disc.
    pub fn find_orientation(
        &self,
        shapes: &[CandidateShape],
        center: &CenterDescriptor,
    ) -> std::result::Result<OrientationDescriptor, LocatorError> {
        let skip = [center.center_shape.id, center.orientation_ring.id];
        let limit = center.center_shape.area();

        let mut by_distance: Vec<&CandidateShape> =
            shapes.iter().filter(|s| !skip.contains(&s.id)).collect();
        by_distance.sort_by(|a, b| {
            a.centroid
                .distance(&center.center)
                .total_cmp(&b.centroid.distance(&center.center))
                .then(a.id.cmp(&b.id))
        });

        let dot = by_distance
            .into_iter()
            .find(|s| s.area() < limit)
            .ok_or(LocatorError::NoOrientationDot)?;
        let axis = dot.centroid.sub(&center.center);
        Ok(OrientationDescriptor {
            dot: dot.clone(),
            distance: axis.norm(),
            axis,
        })
    }

    /// Place every shape around the center and drop those beyond the first
    /// radial gap outside the orientation dot.
    pub fn sanitize(
        &self,
        shapes: &[CandidateShape],
        center: &CenterDescriptor,
        orientation: &OrientationDescriptor,
    ) -> Result<Vec<PlacedShape>> {
        let mut placed: Vec<PlacedShape> = shapes
            .iter()
            .map(|s| PlacedShape {
                angle: signed_angle_deg(&orientation.axis, &s.centroid.sub(&center.center)),
                outer_radius: s.outer_radius(&center.center),
                shape: s.clone(),
            })
            .collect();
        placed.sort_by(|a, b| {
            a.outer_radius
                .total_cmp(&b.outer_radius)
                .then(a.shape.id.cmp(&b.shape.id))
        });

        let jump = self.config.sanitize_jump_fraction * orientation.distance;
        let dot_index = placed
            .iter()
            .position(|p| p.shape.id == orientation.dot.id)
            .unwrap_or(0);
        let mut keep = dot_index + 1;
        while keep < placed.len()
            && placed[keep].outer_radius - placed[keep - 1].outer_radius <= jump
        {
            keep += 1;
        }
        let dropped = placed.len() - keep.min(placed.len());
        placed.truncate(keep);

        debug!(retained = placed.len(), dropped, "sanitization");
        if placed.len() < 3 {
            return Err(FgcError::Sanitization {
                survivors: placed.len(),
            });
        }
        Ok(placed)
    }

    /// Split shapes sorted by outer radius into rings, each sorted by angle.
    pub fn group_rings(&self, placed: Vec<PlacedShape>, dot_distance: f32) -> Vec<RingGroup> {
        let jump = self.config.ring_jump_fraction * dot_distance;
        let mut groups: Vec<RingGroup> = Vec::new();
        let mut last_radius = f32::NEG_INFINITY;

        for shape in placed {
            let radius = shape.outer_radius;
            match groups.last_mut() {
                Some(group) if radius - last_radius <= jump => group.members.push(shape),
                _ => groups.push(RingGroup {
                    members: vec![shape],
                }),
            }
            last_radius = radius;
        }

        for group in &mut groups {
            group.members.sort_by(|a, b| {
                a.angle
                    .total_cmp(&b.angle)
                    .then(a.shape.id.cmp(&b.shape.id))
            });
        }
        groups
    }
}

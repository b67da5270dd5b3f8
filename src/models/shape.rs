use crate::models::Point;
use crate::utils::geometry::{point_in_polygon, point_polygon_distance};

/// Minimum-area rotated bounding rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct MinAreaRect {
    /// Rectangle center
    pub center: Point,
    /// Length of the first side
    pub width: f32,
    /// Length of the second side
    pub height: f32,
    /// Rotation of the first side in degrees
    pub angle: f32,
}

impl MinAreaRect {
    /// Build from four corners in order
    pub fn from_corners(corners: &[Point; 4]) -> Self {
        let center = Point::new(
            corners.iter().map(|p| p.x).sum::<f32>() / 4.0,
            corners.iter().map(|p| p.y).sum::<f32>() / 4.0,
        );
        let side = corners[1].sub(&corners[0]);
        Self {
            center,
            width: side.norm(),
            height: corners[0].distance(&corners[3]),
            angle: side.y.atan2(side.x).to_degrees(),
        }
    }

    /// Rectangle area
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// A closed contour that passed feature filtering.
///
/// Immutable once built; identity is the `id` assigned at extraction.
#[derive(Debug, Clone)]
pub struct CandidateShape {
    /// Extraction order index, unique within one decode
    pub id: usize,
    /// Closed outline in image coordinates
    pub contour: Vec<Point>,
    /// Area centroid
    pub centroid: Point,
    /// Side count after polygon approximation
    pub sides: usize,
    /// Minimum-area bounding rectangle
    pub rect: MinAreaRect,
    /// Mean grayscale intensity inside the outline
    pub intensity: f32,
    /// Outline length in pixels
    pub perimeter: f32,
    /// Area enclosed by the outline
    pub polygon_area: f32,
}

impl CandidateShape {
    /// Bounding rectangle area, the size measure used for every comparison
    pub fn area(&self) -> f32 {
        self.rect.area()
    }

    /// Enclosed area over rectangle area; near π/4 for discs, small for thin arcs
    pub fn solidity(&self) -> f32 {
        let rect = self.area();
        if rect <= f32::EPSILON {
            0.0
        } else {
            self.polygon_area / rect
        }
    }

    /// Whether `point` lies strictly inside the outline
    pub fn contains(&self, point: &Point) -> bool {
        point_in_polygon(point, &self.contour)
    }

    /// Distance from `point` to the outline
    pub fn distance_to(&self, point: &Point) -> f32 {
        point_polygon_distance(point, &self.contour)
    }

    /// Farthest outline point from `center`
    pub fn outer_radius(&self, center: &Point) -> f32 {
        self.contour
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_shape() -> CandidateShape {
        let contour = vec![
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(10.0, 20.0),
        ];
        let corners = [contour[0], contour[1], contour[2], contour[3]];
        CandidateShape {
            id: 0,
            centroid: Point::new(15.0, 15.0),
            sides: 4,
            rect: MinAreaRect::from_corners(&corners),
            intensity: 0.0,
            perimeter: 40.0,
            polygon_area: 100.0,
            contour,
        }
    }

    #[test]
    fn test_rect_from_corners() {
        let shape = square_shape();
        assert!((shape.area() - 100.0).abs() < 1e-4);
        assert_eq!(shape.rect.center, Point::new(15.0, 15.0));
        assert_eq!(shape.rect.angle, 0.0);
        assert!((shape.solidity() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shape_queries() {
        let shape = square_shape();
        assert!(shape.contains(&Point::new(12.0, 12.0)));
        assert!(!shape.contains(&Point::new(25.0, 12.0)));
        assert!((shape.distance_to(&Point::new(25.0, 15.0)) - 5.0).abs() < 1e-5);
        let r = shape.outer_radius(&Point::new(15.0, 15.0));
        assert!((r - 50.0f32.sqrt()).abs() < 1e-4);
    }
}

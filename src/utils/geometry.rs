//! Planar geometry helpers for contours and ring angles

use crate::models::Point;

/// Clockwise angle in degrees from `reference` to `v`, normalized to [0, 360).
///
/// Computed as the arccosine of the normalized dot product, negated when the
/// cross product is negative. Zero-length vectors yield 0.
pub fn signed_angle_deg(reference: &Point, v: &Point) -> f32 {
    let denom = reference.norm() * v.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    let cos = (reference.dot(v) / denom).clamp(-1.0, 1.0);
    let mut deg = cos.acos().to_degrees();
    if reference.cross(v) < 0.0 {
        deg = -deg;
    }
    let deg = deg.rem_euclid(360.0);
    if deg >= 360.0 { 0.0 } else { deg }
}

/// Signed polygon area (shoelace); positive for clockwise winding in image space.
pub fn polygon_area(polygon: &[Point]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        sum += a.x as f64 * b.y as f64 - b.x as f64 * a.y as f64;
    }
    (sum / 2.0) as f32
}

/// Area centroid of a closed polygon (first-order moments over the area).
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    let n = polygon.len();
    if n < 3 {
        return None;
    }
    let mut a = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    for i in 0..n {
        let p = &polygon[i];
        let q = &polygon[(i + 1) % n];
        let w = p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        a += w;
        cx += (p.x as f64 + q.x as f64) * w;
        cy += (p.y as f64 + q.y as f64) * w;
    }
    if a.abs() < 1e-9 {
        return None;
    }
    Some(Point::new((cx / (3.0 * a)) as f32, (cy / (3.0 * a)) as f32))
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pj.x + (point.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `point` to the segment `a`-`b`.
pub fn point_segment_distance(point: &Point, a: &Point, b: &Point) -> f32 {
    let ab = b.sub(a);
    let len_sq = ab.dot(&ab);
    if len_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = (point.sub(a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    point.distance(&a.translate(ab.x * t, ab.y * t))
}

/// Minimum distance from `point` to the closed outline of `polygon`.
pub fn point_polygon_distance(point: &Point, polygon: &[Point]) -> f32 {
    match polygon.len() {
        0 => f32::INFINITY,
        1 => point.distance(&polygon[0]),
        n => (0..n)
            .map(|i| point_segment_distance(point, &polygon[i], &polygon[(i + 1) % n]))
            .fold(f32::INFINITY, f32::min),
    }
}

/// Sorted x positions where the horizontal line at `y` crosses the polygon outline.
///
/// Consecutive pairs bound the interior spans on that row.
pub fn scanline_crossings(polygon: &[Point], y: f32) -> Vec<f32> {
    let n = polygon.len();
    let mut xs = Vec::new();
    if n < 3 {
        return xs;
    }
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > y) != (pj.y > y) {
            xs.push(pj.x + (y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y));
        }
        j = i;
    }
    xs.sort_by(|a, b| a.total_cmp(b));
    xs
}

/// Point at `radius` and clockwise `degrees` from straight up around `center`.
pub fn polar_to_cartesian(center: &Point, radius: f32, degrees: f32) -> Point {
    let (s, c) = degrees.to_radians().sin_cos();
    Point::new(center.x + radius * s, center.y - radius * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn test_signed_angle() {
        let up = Point::new(0.0, -1.0);
        assert!((signed_angle_deg(&up, &Point::new(1.0, 0.0)) - 90.0).abs() < 0.01);
        assert!((signed_angle_deg(&up, &Point::new(-1.0, 0.0)) - 270.0).abs() < 0.01);
        assert!((signed_angle_deg(&up, &Point::new(0.0, 1.0)) - 180.0).abs() < 0.01);
        assert_eq!(signed_angle_deg(&up, &up), 0.0);
        assert_eq!(signed_angle_deg(&up, &Point::default()), 0.0);
    }

    #[test]
    fn test_polygon_moments() {
        let sq = square(4.0);
        assert!((polygon_area(&sq).abs() - 16.0).abs() < 1e-4);
        let c = polygon_centroid(&sq).unwrap();
        assert!((c.x - 2.0).abs() < 1e-4 && (c.y - 2.0).abs() < 1e-4);
        assert!(polygon_centroid(&sq[..2]).is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(4.0);
        assert!(point_in_polygon(&Point::new(1.0, 1.0), &sq));
        assert!(!point_in_polygon(&Point::new(5.0, 1.0), &sq));
        assert!(!point_in_polygon(&Point::new(1.0, -1.0), &sq));
    }

    #[test]
    fn test_point_polygon_distance() {
        let sq = square(4.0);
        assert!((point_polygon_distance(&Point::new(6.0, 2.0), &sq) - 2.0).abs() < 1e-5);
        assert!((point_polygon_distance(&Point::new(2.0, 1.0), &sq) - 1.0).abs() < 1e-5);
        assert_eq!(point_polygon_distance(&Point::new(0.0, 0.0), &[]), f32::INFINITY);
    }

    #[test]
    fn test_scanline_crossings() {
        let xs = scanline_crossings(&square(4.0), 2.0);
        assert_eq!(xs, vec![0.0, 4.0]);
        assert!(scanline_crossings(&square(4.0), 5.0).is_empty());
    }

    #[test]
    fn test_polar_to_cartesian() {
        let origin = Point::default();
        let top = polar_to_cartesian(&origin, 6.0, 0.0);
        assert!(top.x.abs() < 1e-5 && (top.y + 6.0).abs() < 1e-5);
        let right = polar_to_cartesian(&origin, 6.0, 90.0);
        assert!((right.x - 6.0).abs() < 1e-5 && right.y.abs() < 1e-5);
    }
}

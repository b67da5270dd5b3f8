//! Contour tracing and per-contour measurements.
//!
//! Tracing, polygon approximation, arc length and the rotated bounding
//! rectangle come from `imageproc`; moments and region intensity are
//! computed on the traced outline.

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length, min_area_rect};
use imageproc::point::Point as IpPoint;

use crate::models::{BitMatrix, MinAreaRect, Point};
use crate::utils::geometry::{polygon_area, polygon_centroid, scanline_crossings};

/// Outer outlines of every ink component in `mask`.
pub fn outer_contours(mask: &BitMatrix) -> Vec<Vec<IpPoint<i32>>> {
    find_contours::<i32>(&mask.to_mask_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .map(|c| c.points)
        .collect()
}

/// Geometry of one traced outline.
#[derive(Debug, Clone)]
pub struct ContourMetrics {
    /// Outline as floating point positions
    pub outline: Vec<Point>,
    /// Area centroid
    pub centroid: Point,
    /// Enclosed area
    pub area: f32,
    /// Closed outline length
    pub perimeter: f32,
    /// Vertex count after Douglas-Peucker approximation
    pub sides: usize,
    /// Minimum-area bounding rectangle
    pub rect: MinAreaRect,
}

/// Measure an outline; `None` for degenerate outlines (fewer than three
/// points or no enclosed area).
pub fn measure(points: &[IpPoint<i32>], epsilon_fraction: f64) -> Option<ContourMetrics> {
    if points.len() < 3 {
        return None;
    }
    let outline: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x as f32, p.y as f32))
        .collect();
    let area = polygon_area(&outline).abs();
    if area <= f32::EPSILON {
        return None;
    }
    let centroid = polygon_centroid(&outline)?;

    let perimeter = arc_length(points, true);
    let epsilon = (epsilon_fraction * perimeter).max(f64::EPSILON);
    let mut approx = approximate_polygon_dp(points, epsilon, true);
    if approx.len() > 1 && approx.first() == approx.last() {
        approx.pop();
    }

    let corners = min_area_rect(points);
    let corners = [
        Point::new(corners[0].x as f32, corners[0].y as f32),
        Point::new(corners[1].x as f32, corners[1].y as f32),
        Point::new(corners[2].x as f32, corners[2].y as f32),
        Point::new(corners[3].x as f32, corners[3].y as f32),
    ];

    Some(ContourMetrics {
        outline,
        centroid,
        area,
        perimeter: perimeter as f32,
        sides: approx.len(),
        rect: MinAreaRect::from_corners(&corners),
    })
}

/// Mean intensity of `gray` over the pixels inside `outline`, boundary included.
pub fn mean_intensity(gray: &GrayImage, outline: &[Point]) -> f32 {
    let (w, h) = gray.dimensions();
    if outline.is_empty() || w == 0 || h == 0 {
        return 0.0;
    }
    let min_y = outline.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = outline.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    let y0 = min_y.ceil().max(0.0) as u32;
    let y1 = (max_y.floor().max(0.0) as u32).min(h - 1);

    let mut sum = 0u64;
    let mut count = 0u64;
    for y in y0..=y1 {
        let xs = scanline_crossings(outline, y as f32);
        for span in xs.chunks_exact(2) {
            let x0 = span[0].ceil().max(0.0) as u32;
            let x1 = (span[1].floor().max(0.0) as u32).min(w - 1);
            for x in x0..=x1 {
                sum += gray.get_pixel(x, y)[0] as u64;
                count += 1;
            }
        }
    }
    for p in outline {
        let (x, y) = (p.x as u32, p.y as u32);
        if x < w && y < h {
            sum += gray.get_pixel(x, y)[0] as u64;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum as f32 / count as f32
    }
}

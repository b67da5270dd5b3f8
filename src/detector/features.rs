//! Candidate shape extraction from a binary image.

use image::GrayImage;
use tracing::debug;

use crate::detector::contour::{mean_intensity, measure, outer_contours};
use crate::models::{BitMatrix, CandidateShape};

/// Contour filter settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Fewest polygon sides a candidate may have
    pub min_sides: usize,
    /// Most polygon sides a candidate may have
    pub max_sides: usize,
    /// Smallest bounding rectangle area in square pixels
    pub min_area: f32,
    /// Douglas-Peucker epsilon as a fraction of the perimeter
    pub approx_epsilon_fraction: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_sides: 5,
            max_sides: 25,
            min_area: 30.0,
            approx_epsilon_fraction: 0.01,
        }
    }
}

/// How many contours each filter let through or rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FeatureStats {
    /// Outer contours traced
    pub contours: usize,
    /// Fewer than three points or no enclosed area
    pub degenerate: usize,
    /// Side count outside the allowed range
    pub rejected_sides: usize,
    /// Bounding rectangle too small
    pub rejected_area: usize,
    /// Contours kept as candidates
    pub accepted: usize,
}

/// Turns a binary image into filtered candidate shapes.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    /// Create an extractor with custom filters
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract candidates from `mask`, reading fill intensity from `gray`.
    ///
    /// Candidate ids follow contour tracing order.
    pub fn extract(&self, mask: &BitMatrix, gray: &GrayImage) -> (Vec<CandidateShape>, FeatureStats) {
        let cfg = &self.config;
        let mut stats = FeatureStats::default();
        let mut shapes = Vec::new();

        for points in outer_contours(mask) {
            stats.contours += 1;
            let Some(metrics) = measure(&points, cfg.approx_epsilon_fraction) else {
                stats.degenerate += 1;
                continue;
            };
            if metrics.sides < cfg.min_sides || metrics.sides > cfg.max_sides {
                stats.rejected_sides += 1;
                continue;
            }
            if metrics.rect.area() < cfg.min_area {
                stats.rejected_area += 1;
                continue;
            }

            let intensity = mean_intensity(gray, &metrics.outline);
            shapes.push(CandidateShape {
                id: shapes.len(),
                contour: metrics.outline,
                centroid: metrics.centroid,
                sides: metrics.sides,
                rect: metrics.rect,
                intensity,
                perimeter: metrics.perimeter,
                polygon_area: metrics.area,
            });
        }

        stats.accepted = shapes.len();
        debug!(?stats, "feature extraction");
        (shapes, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn paint(mask: &mut BitMatrix, gray: &mut GrayImage, f: impl Fn(f32, f32) -> bool) {
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if f(x as f32, y as f32) {
                    mask.set(x, y, true);
                    gray.put_pixel(x as u32, y as u32, image::Luma([10]));
                }
            }
        }
    }

    #[test]
    fn test_filters() {
        let mut mask = BitMatrix::new(100, 100);
        let mut gray = GrayImage::from_pixel(100, 100, image::Luma([250]));
        // disc: accepted
        paint(&mut mask, &mut gray, |x, y| {
            Point::new(x, y).distance(&Point::new(30.0, 30.0)) <= 12.0
        });
        // single pixel: degenerate
        paint(&mut mask, &mut gray, |x, y| x == 80.0 && y == 10.0);
        // square: four sides
        paint(&mut mask, &mut gray, |x, y| {
            (60.0..=80.0).contains(&x) && (60.0..=80.0).contains(&y)
        });
        // small disc: too small
        paint(&mut mask, &mut gray, |x, y| {
            Point::new(x, y).distance(&Point::new(20.0, 80.0)) <= 2.5
        });

        let (shapes, stats) = FeatureExtractor::default().extract(&mask, &gray);
        assert_eq!(stats.contours, 4);
        assert_eq!(stats.degenerate, 1);
        assert_eq!(stats.rejected_sides, 1);
        assert_eq!(stats.rejected_area, 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].id, 0);
        assert!(shapes[0].centroid.distance(&Point::new(30.0, 30.0)) < 0.5);
        assert!(shapes[0].intensity < 20.0);
    }

    #[test]
    fn test_empty_mask() {
        let mask = BitMatrix::new(10, 10);
        let gray = GrayImage::from_pixel(10, 10, image::Luma([255]));
        let (shapes, stats) = FeatureExtractor::default().extract(&mask, &gray);
        assert!(shapes.is_empty());
        assert_eq!(stats, FeatureStats::default());
    }
}

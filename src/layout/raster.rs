//! Grayscale raster output: dark ink on white paper.

use image::{GrayImage, Luma};

use crate::layout::canvas::{Canvas, Group};
use crate::layout::rings::STROKE_WIDTH;
use crate::models::Point;
use crate::utils::geometry::polar_to_cartesian;

/// Ink intensity.
pub const INK: u8 = 0;
/// Paper intensity.
pub const PAPER: u8 = 255;

/// Canvas that rasterizes marks into a `GrayImage`.
///
/// Each pixel is inked when its center lies within half a stroke of an arc
/// (round caps included) or inside a dot.
pub struct RasterCanvas {
    image: GrayImage,
    scale: f32,
    origin: Point,
}

impl RasterCanvas {
    /// Create a square canvas covering `extent + margin` drawing units around
    /// the center at `scale` pixels per unit.
    pub fn new(extent: f32, margin: f32, scale: f32) -> Self {
        let half = (extent + margin).max(0.0) * scale;
        let size = (2.0 * half).ceil().max(1.0) as u32;
        Self {
            image: GrayImage::from_pixel(size, size, Luma([PAPER])),
            scale,
            origin: Point::new(size as f32 / 2.0, size as f32 / 2.0),
        }
    }

    /// Pixel position of a point in drawing units.
    pub fn to_pixel(&self, p: &Point) -> Point {
        Point::new(
            self.origin.x + p.x * self.scale,
            self.origin.y + p.y * self.scale,
        )
    }

    /// Consume the canvas and return the image.
    pub fn into_image(self) -> GrayImage {
        self.image
    }

    /// Ink every pixel within `reach` pixels of `center` for which `inked` holds.
    fn fill_where<F: Fn(Point) -> bool>(&mut self, center: Point, reach: f32, inked: F) {
        let (w, h) = self.image.dimensions();
        let x0 = (center.x - reach).floor().max(0.0) as u32;
        let y0 = (center.y - reach).floor().max(0.0) as u32;
        let x1 = ((center.x + reach).ceil().max(0.0) as u32).min(w.saturating_sub(1));
        let y1 = ((center.y + reach).ceil().max(0.0) as u32).min(h.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                // Back to drawing units, relative to the code center.
                let p = Point::new(
                    (x as f32 + 0.5 - self.origin.x) / self.scale,
                    (y as f32 + 0.5 - self.origin.y) / self.scale,
                );
                if inked(p) {
                    self.image.put_pixel(x, y, Luma([INK]));
                }
            }
        }
    }
}

/// Whether `angle` lies on the clockwise sweep from `start` spanning `sweep` degrees.
fn within_sweep(angle: f32, start: f32, sweep: f32) -> bool {
    (angle - start).rem_euclid(360.0) <= sweep
}

impl Canvas for RasterCanvas {
    fn begin_group(&mut self, _group: Group) {}

    fn draw_arc(&mut self, radius: f32, start_deg: f32, end_deg: f32) {
        let half = STROKE_WIDTH / 2.0;
        let sweep = end_deg - start_deg;
        let origin = Point::default();
        let a = polar_to_cartesian(&origin, radius, start_deg);
        let b = polar_to_cartesian(&origin, radius, end_deg);
        let center = self.origin;
        let reach = (radius + half) * self.scale + 1.0;
        self.fill_where(center, reach, |p| {
            let rho = p.norm();
            let angle = p.x.atan2(-p.y).to_degrees();
            if sweep >= 360.0 || within_sweep(angle, start_deg, sweep) {
                (rho - radius).abs() <= half
            } else {
                p.distance(&a) <= half || p.distance(&b) <= half
            }
        });
    }

    fn draw_dot(&mut self, center: Point, radius: f32) {
        let pixel_center = self.to_pixel(&center);
        let reach = radius * self.scale + 1.0;
        self.fill_where(pixel_center, reach, |p| p.distance(&center) <= radius);
    }

    fn draw_text(&mut self, _lines: &[String]) {}

    fn end_group(&mut self) {}
}

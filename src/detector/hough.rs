//! Gradient-voting circle finder.
//!
//! Every pixel with a strong gradient votes along both gradient directions
//! at each radius in `[r_min, r_max]`. Concentric rings converge on their
//! common center, so the code center stands out as the accumulator peak.
//! A radius is then estimated for each peak from the radially aligned
//! edge pixels around it.

use image::{GrayImage, ImageBuffer, Luma};
use tracing::debug;

use crate::models::Point;

/// Circle finder settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Minimum voting radius in pixels
    pub r_min: f32,
    /// Maximum voting radius in pixels
    pub r_max: f32,
    /// Gradient magnitude threshold as a fraction of the strongest gradient
    pub grad_threshold: f32,
    /// Non-maximum suppression radius in pixels
    pub nms_radius: f32,
    /// Minimum accumulator value as a fraction of the peak
    pub min_vote_frac: f32,
    /// Gaussian sigma applied to the accumulator
    pub accum_sigma: f32,
    /// Cap on returned circles, strongest first
    pub max_candidates: Option<usize>,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            r_min: 4.0,
            r_max: 160.0,
            grad_threshold: 0.1,
            nms_radius: 10.0,
            min_vote_frac: 0.5,
            accum_sigma: 2.0,
            max_candidates: Some(16),
        }
    }
}

/// A detected circle.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct HoughCircle {
    /// Circle center in pixels
    pub center: Point,
    /// Dominant edge radius around the center
    pub radius: f32,
    /// Smoothed accumulator value at the center
    pub score: f32,
}

/// Circle finder over a grayscale image.
#[derive(Debug, Clone, Default)]
pub struct HoughCircles {
    config: HoughConfig,
}

/// Scharr gradients with the magnitude threshold already applied.
struct Gradients {
    gx: Vec<f32>,
    gy: Vec<f32>,
    threshold_sq: f32,
}

impl Gradients {
    fn compute(gray: &GrayImage, grad_threshold: f32) -> Option<Self> {
        let gx: Vec<f32> = imageproc::gradients::horizontal_scharr(gray)
            .into_raw()
            .into_iter()
            .map(f32::from)
            .collect();
        let gy: Vec<f32> = imageproc::gradients::vertical_scharr(gray)
            .into_raw()
            .into_iter()
            .map(f32::from)
            .collect();

        let max_mag_sq = gx
            .iter()
            .zip(&gy)
            .map(|(x, y)| x * x + y * y)
            .fold(0.0f32, f32::max);
        if max_mag_sq.sqrt() < 1e-6 {
            return None;
        }
        let threshold = grad_threshold * max_mag_sq.sqrt();
        Some(Self {
            gx,
            gy,
            threshold_sq: threshold * threshold,
        })
    }

    /// Normalized direction and magnitude at `idx`, if above threshold
    #[inline]
    fn strong(&self, idx: usize) -> Option<(f32, f32, f32)> {
        let (x, y) = (self.gx[idx], self.gy[idx]);
        let mag_sq = x * x + y * y;
        if mag_sq < self.threshold_sq {
            return None;
        }
        let mag = mag_sq.sqrt();
        Some((x / mag, y / mag, mag))
    }
}

/// Deposit a weighted vote using bilinear interpolation.
#[inline]
fn bilinear_add(accum: &mut [f32], stride: usize, x: f32, y: f32, weight: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let base = y0 * stride + x0;
    accum[base] += weight * (1.0 - fx) * (1.0 - fy);
    accum[base + 1] += weight * fx * (1.0 - fy);
    accum[base + stride] += weight * (1.0 - fx) * fy;
    accum[base + stride + 1] += weight * fx * fy;
}

impl HoughCircles {
    /// Create a finder with custom settings
    pub fn new(config: HoughConfig) -> Self {
        Self { config }
    }

    /// Current settings
    pub fn config(&self) -> &HoughConfig {
        &self.config
    }

    /// Find circles, strongest first. Blank or tiny images yield none.
    pub fn detect(&self, gray: &GrayImage) -> Vec<HoughCircle> {
        let config = &self.config;
        let (w, h) = gray.dimensions();
        if w < 4 || h < 4 || config.r_max < config.r_min || config.r_min <= 0.0 {
            return Vec::new();
        }
        let Some(grad) = Gradients::compute(gray, config.grad_threshold) else {
            return Vec::new();
        };

        let stride = w as usize;
        let rows = h as usize;
        let radii: Vec<f32> = (0..)
            .map(|i| config.r_min + i as f32)
            .take_while(|r| *r <= config.r_max)
            .collect();
        let x_limit = (w - 1) as f32;
        let y_limit = (h - 1) as f32;

        let mut accum = vec![0.0f32; stride * rows];
        for y in 0..rows {
            for x in 0..stride {
                let Some((dx, dy, mag)) = grad.strong(y * stride + x) else {
                    continue;
                };
                let (xf, yf) = (x as f32, y as f32);
                for &r in &radii {
                    for sign in [1.0f32, -1.0] {
                        let vx = xf + sign * dx * r;
                        let vy = yf + sign * dy * r;
                        if vx >= 0.0 && vx < x_limit && vy >= 0.0 && vy < y_limit {
                            bilinear_add(&mut accum, stride, vx, vy, mag);
                        }
                    }
                }
            }
        }

        let Some(accum_img) = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(w, h, accum) else {
            return Vec::new();
        };
        let smoothed = imageproc::filter::gaussian_blur_f32(&accum_img, config.accum_sigma);
        let mut peaks = non_maximum_suppression(
            smoothed.as_raw(),
            stride,
            rows,
            config.nms_radius,
            config.min_vote_frac,
        );
        peaks.sort_by(|a, b| b.2.total_cmp(&a.2));
        if let Some(max) = config.max_candidates {
            peaks.truncate(max);
        }

        let circles: Vec<HoughCircle> = peaks
            .into_iter()
            .map(|(x, y, score)| {
                let center = Point::new(x as f32, y as f32);
                HoughCircle {
                    center,
                    radius: self.estimate_radius(&grad, stride, rows, &center),
                    score,
                }
            })
            .collect();
        debug!(circles = circles.len(), "circle detection");
        circles
    }

    /// Most populated distance among edge pixels whose gradient points at `center`.
    fn estimate_radius(&self, grad: &Gradients, stride: usize, rows: usize, center: &Point) -> f32 {
        let r_max = self.config.r_max;
        let bins = r_max.ceil() as usize + 1;
        let mut histogram = vec![0.0f32; bins];

        let x0 = (center.x - r_max).max(0.0) as usize;
        let x1 = ((center.x + r_max).ceil() as usize).min(stride - 1);
        let y0 = (center.y - r_max).max(0.0) as usize;
        let y1 = ((center.y + r_max).ceil() as usize).min(rows - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let Some((dx, dy, mag)) = grad.strong(y * stride + x) else {
                    continue;
                };
                let v = Point::new(x as f32, y as f32).sub(center);
                let dist = v.norm();
                if dist < self.config.r_min || dist > r_max {
                    continue;
                }
                let cos = (v.x * dx + v.y * dy) / dist;
                if cos.abs() > 0.9 {
                    histogram[dist.round() as usize] += mag;
                }
            }
        }

        histogram
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(r, _)| r as f32)
            .unwrap_or(0.0)
    }
}

/// Local maxima above `min_vote_frac` of the global peak, as (x, y, value).
fn non_maximum_suppression(
    data: &[f32],
    stride: usize,
    rows: usize,
    nms_radius: f32,
    min_vote_frac: f32,
) -> Vec<(usize, usize, f32)> {
    let max_val = data.iter().copied().fold(0.0f32, f32::max);
    if max_val < 1e-6 {
        return Vec::new();
    }
    let vote_threshold = min_vote_frac * max_val;
    let nms_r = nms_radius.ceil().max(1.0) as usize;
    let nms_r_sq = nms_radius * nms_radius;
    if stride <= 2 * nms_r || rows <= 2 * nms_r {
        return Vec::new();
    }

    let r = nms_r as isize;
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx == 0 && dy == 0) || (dx * dx + dy * dy) as f32 > nms_r_sq {
                continue;
            }
            offsets.push(dy * stride as isize + dx);
        }
    }

    let mut peaks = Vec::new();
    for y in nms_r..(rows - nms_r) {
        for x in nms_r..(stride - nms_r) {
            let idx = y * stride + x;
            let val = data[idx];
            if val < vote_threshold {
                continue;
            }
            let is_max = offsets.iter().all(|&off| {
                let nidx = idx.wrapping_add_signed(off);
                !(data[nidx] > val || (data[nidx] == val && nidx < idx))
            });
            if is_max {
                peaks.push((x, y, val));
            }
        }
    }
    peaks
}

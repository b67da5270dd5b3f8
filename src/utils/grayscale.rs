//! RGB to luminance conversion
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed in fixed point as
//! Y = (76*R + 150*G + 29*B) >> 8.

use image::{DynamicImage, GrayImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: i32 = 76;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

/// Images with at least this many pixels are converted row-parallel.
pub const PARALLEL_THRESHOLD: usize = 640 * 480;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as i32 + COEF_G * g as i32 + COEF_B * b as i32) >> 8;
    lum.min(255) as u8
}

/// Convert RGB bytes (3 per pixel) to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    rgb.chunks_exact(3)
        .take(width * height)
        .map(|px| luminance(px[0], px[1], px[2]))
        .collect()
}

/// Convert RGB to grayscale using parallel processing
/// Processes rows in parallel for multi-core speedup
pub fn rgb_to_grayscale_parallel(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luminance(rgb[idx], rgb[idx + 1], rgb[idx + 2]);
        }
    });

    gray
}

/// Convert any decoded image to an 8-bit luminance image.
///
/// Grayscale inputs are passed through; color inputs drop alpha and use the
/// fixed-point weights above.
pub fn to_luma(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();
    let (width, height) = (w as usize, h as usize);
    let data = if width * height >= PARALLEL_THRESHOLD {
        rgb_to_grayscale_parallel(rgb.as_raw(), width, height)
    } else {
        rgb_to_grayscale(rgb.as_raw(), width, height)
    };
    // Buffer length is width * height by construction.
    GrayImage::from_raw(w, h, data).unwrap_or_else(|| GrayImage::new(w, h))
}

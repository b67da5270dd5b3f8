use image::GrayImage;

use crate::models::BitMatrix;

/// Global threshold selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    /// Otsu's between-class variance maximum
    #[default]
    Otsu,
    /// Fixed luminance threshold
    Fixed(u8),
}

/// Binarize a grayscale image; returns the ink mask and the threshold used.
pub fn binarize(gray: &GrayImage, method: Threshold) -> (BitMatrix, u8) {
    let (w, h) = gray.dimensions();
    let threshold = match method {
        Threshold::Otsu => calculate_otsu_threshold(gray.as_raw()),
        Threshold::Fixed(t) => t,
    };
    (
        threshold_binarize(gray.as_raw(), w as usize, h as usize, threshold),
        threshold,
    )
}

/// Calculate Otsu's optimal threshold
///
/// Pixels strictly below the returned value belong to the dark class.
pub fn calculate_otsu_threshold(gray: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let total_pixels = gray.len() as f64;
    let total_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut max_variance = 0.0;
    let mut optimal_threshold = 128u8;
    let mut class1_pixels = 0u64;
    let mut class1_sum = 0.0f64;

    // Threshold t splits intensities into [0, t) and [t, 255].
    for threshold in 1..=255usize {
        class1_pixels += histogram[threshold - 1];
        class1_sum += (threshold - 1) as f64 * histogram[threshold - 1] as f64;
        let class2_pixels = gray.len() as u64 - class1_pixels;
        if class1_pixels == 0 || class2_pixels == 0 {
            continue;
        }

        let class1_mean = class1_sum / class1_pixels as f64;
        let class2_mean = (total_sum - class1_sum) / class2_pixels as f64;
        let weight1 = class1_pixels as f64 / total_pixels;
        let weight2 = class2_pixels as f64 / total_pixels;
        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    let mut binary = BitMatrix::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            binary.set(x, y, gray[idx] < threshold);
        }
    }

    binary
}

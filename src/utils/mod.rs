//! Utility functions for image processing
//!
//! This module provides helper functions for FGC detection:
//! - Grayscale conversion (RGB to luminance)
//! - Binarization (Otsu's method and fixed threshold)
//! - Planar geometry (polygon moments, point-in-polygon, angles)

/// Global thresholding
pub mod binarization;
/// Planar geometry helpers
pub mod geometry;
/// RGB to luminance conversion
pub mod grayscale;

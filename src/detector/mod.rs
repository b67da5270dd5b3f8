//! FGC detection modules
//!
//! This module contains all the logic for finding a code in an image:
//! - Circle finding (gradient voting for the code center)
//! - Contour tracing and shape measurements
//! - Candidate filtering by side count and size
//! - Geometry recovery (center, orientation, rings)
//! - Differential bit sampling along each ring

/// Contour tracing and per-contour measurements
pub mod contour;
/// Candidate shape extraction and filtering
pub mod features;
/// Gradient-voting circle finder
pub mod hough;
/// Center, orientation and ring recovery
pub mod locator;
/// Slot-by-slot bit recovery
pub mod sampler;

pub use features::{FeatureConfig, FeatureExtractor, FeatureStats};
pub use hough::{HoughCircle, HoughCircles, HoughConfig};
pub use locator::{CodeLocator, LocatorConfig};
pub use sampler::{BitSampler, SamplerConfig, SlotSample};

//! Decoder configuration.
//!
//! Every heuristic constant of the decoding pipeline lives here with its
//! default. Values can come from a JSON document (`--config` on the command
//! line) and be overridden by `FGC_*` environment variables.

use std::path::Path;

use crate::detector::{FeatureConfig, HoughConfig, LocatorConfig, SamplerConfig};
use crate::error::{FgcError, Result};
use crate::layout::RingTable;
use crate::utils::binarization::Threshold;

fn parse_env_f32<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<f32> {
    lookup(name)
        .and_then(|v| v.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
}

fn parse_env_usize<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<usize> {
    lookup(name).and_then(|v| v.trim().parse::<usize>().ok())
}

fn parse_env_u32<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<u32> {
    lookup(name).and_then(|v| v.trim().parse::<u32>().ok())
}

/// Settings for one decoder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Global threshold method
    pub threshold: Threshold,
    /// Median blur radius in pixels; 0 disables the blur
    pub blur_radius: u32,
    /// Draw the detected geometry onto a copy of the input
    pub annotate: bool,
    /// Ring table; must match the one used for encoding
    pub table: RingTable,
    /// Contour filters
    pub features: FeatureConfig,
    /// Circle finder
    pub hough: HoughConfig,
    /// Geometry recovery
    pub locator: LocatorConfig,
    /// Bit sampling
    pub sampler: SamplerConfig,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::Otsu,
            blur_radius: 2,
            annotate: false,
            table: RingTable::default(),
            features: FeatureConfig::default(),
            hough: HoughConfig::default(),
            locator: LocatorConfig::default(),
            sampler: SamplerConfig::default(),
        }
    }
}

impl DecodeConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON document from `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Settings file (or defaults) with environment overrides applied,
    /// validated. This is how the command line tools load their settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `FGC_*` environment variables; unparsable values
    /// are ignored.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Override fields from `FGC_*` variables read through `lookup`.
    pub fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(v) = parse_env_f32(&lookup, "FGC_SANITIZE_JUMP") {
            self.locator.sanitize_jump_fraction = v;
        }
        if let Some(v) = parse_env_f32(&lookup, "FGC_RING_JUMP") {
            self.locator.ring_jump_fraction = v;
        }
        if let Some(v) = parse_env_f32(&lookup, "FGC_SLOT_TOLERANCE") {
            self.sampler.slot_tolerance_fraction = v;
        }
        if let Some(v) = parse_env_usize(&lookup, "FGC_MIN_SIDES") {
            self.features.min_sides = v;
        }
        if let Some(v) = parse_env_usize(&lookup, "FGC_MAX_SIDES") {
            self.features.max_sides = v;
        }
        if let Some(v) = parse_env_f32(&lookup, "FGC_MIN_AREA") {
            self.features.min_area = v;
        }
        if let Some(v) = parse_env_u32(&lookup, "FGC_BLUR_RADIUS") {
            self.blur_radius = v;
        }
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.table.validate()?;
        if self.features.min_sides > self.features.max_sides {
            return Err(FgcError::Config(format!(
                "min_sides {} exceeds max_sides {}",
                self.features.min_sides, self.features.max_sides
            )));
        }
        if self.features.approx_epsilon_fraction <= 0.0 {
            return Err(FgcError::Config(
                "approx_epsilon_fraction must be positive".to_string(),
            ));
        }
        if self.hough.r_min <= 0.0 || self.hough.r_max < self.hough.r_min {
            return Err(FgcError::Config(format!(
                "invalid circle radius range {}..={}",
                self.hough.r_min, self.hough.r_max
            )));
        }
        if self.hough.accum_sigma <= 0.0 {
            return Err(FgcError::Config("accum_sigma must be positive".to_string()));
        }
        let fractions = [
            ("sanitize_jump_fraction", self.locator.sanitize_jump_fraction),
            ("ring_jump_fraction", self.locator.ring_jump_fraction),
            ("slot_tolerance_fraction", self.sampler.slot_tolerance_fraction),
        ];
        for (name, value) in fractions {
            if !value.is_finite() || value < 0.0 {
                return Err(FgcError::Config(format!("{name} must be non-negative, got {value}")));
            }
        }
        Ok(())
    }
}

//! End-to-end decoding.
//!
//! grayscale → median blur → circle finding → binarization → candidate
//! shapes → code geometry → ring sampling → error correction → text
//!
//! Every stage returns `Result` and the first failure stops the pipeline.
//! [`FgcDecoder::read`] keeps whatever the earlier stages produced in the
//! returned [`DecodeReport`]; [`FgcDecoder::decode`] keeps only the outcome.

use std::time::Instant;

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::{
    draw_cross_mut, draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut,
};
use rayon::prelude::*;
use tracing::debug;

use crate::codec::{BitCodec, ErrorCorrector};
use crate::config::DecodeConfig;
use crate::detector::{
    BitSampler, CodeLocator, FeatureExtractor, HoughCircle, HoughCircles, SlotSample,
};
use crate::error::Result;
use crate::models::{
    BitStream, DecodeReport, DecodedMessage, Diagnostics, LocatedCode, format_bits,
};
use crate::utils::binarization::binarize;
use crate::utils::grayscale::to_luma;

const CIRCLE_COLOR: Rgb<u8> = Rgb([255, 200, 0]);
const CENTER_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const AXIS_COLOR: Rgb<u8> = Rgb([230, 0, 0]);
const RING_COLOR: Rgb<u8> = Rgb([0, 120, 255]);
const ONE_COLOR: Rgb<u8> = Rgb([230, 0, 0]);
const ZERO_COLOR: Rgb<u8> = Rgb([0, 120, 255]);
const MISS_COLOR: Rgb<u8> = Rgb([160, 160, 160]);

/// Intermediate results kept for the report.
#[derive(Default)]
struct Trace {
    diagnostics: Diagnostics,
    raw_bits: BitStream,
    circles: Vec<HoughCircle>,
    located: Option<LocatedCode>,
}

/// Image to text decoder.
#[derive(Debug, Clone)]
pub struct FgcDecoder {
    config: DecodeConfig,
    hough: HoughCircles,
    features: FeatureExtractor,
    locator: CodeLocator,
    sampler: BitSampler,
}

impl Default for FgcDecoder {
    fn default() -> Self {
        Self::from_valid(DecodeConfig::default())
    }
}

impl FgcDecoder {
    /// Create a decoder, rejecting invalid settings.
    pub fn new(config: DecodeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: DecodeConfig) -> Self {
        Self {
            hough: HoughCircles::new(config.hough.clone()),
            features: FeatureExtractor::new(config.features.clone()),
            locator: CodeLocator::new(config.locator.clone()),
            sampler: BitSampler::new(config.sampler.clone()),
            config,
        }
    }

    /// Decoder settings
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode `image`, returning the outcome with diagnostics.
    pub fn read(&self, image: &DynamicImage) -> DecodeReport {
        self.read_gray(&to_luma(image))
    }

    /// Decode a grayscale image, returning the outcome with diagnostics.
    pub fn read_gray(&self, gray: &GrayImage) -> DecodeReport {
        let start = Instant::now();
        let mut trace = Trace::default();
        let outcome = self.run(gray, &mut trace);
        let elapsed = start.elapsed();

        let annotated = self.config.annotate.then(|| annotate(gray, &trace));
        let outcome = outcome.map(|(version, text, corrected_bit)| DecodedMessage {
            version,
            text,
            raw_bits: trace.raw_bits.clone(),
            elapsed,
            corrected_bit,
        });
        match &outcome {
            Ok(message) => debug!(text = %message.text, ?elapsed, "decoded"),
            Err(err) => debug!(%err, ?elapsed, "decode failed"),
        }

        DecodeReport {
            outcome,
            raw_bits: trace.raw_bits,
            elapsed,
            diagnostics: trace.diagnostics,
            annotated,
        }
    }

    /// Decode `image` to a message.
    pub fn decode(&self, image: &DynamicImage) -> Result<DecodedMessage> {
        self.read(image).into_result()
    }

    /// Decode several images in parallel, one result per image in order.
    pub fn decode_batch(&self, images: &[DynamicImage]) -> Vec<Result<DecodedMessage>> {
        images.par_iter().map(|image| self.decode(image)).collect()
    }

    fn run(&self, gray: &GrayImage, trace: &mut Trace) -> Result<(u8, String, Option<usize>)> {
        let blurred = if self.config.blur_radius > 0 {
            let r = self.config.blur_radius;
            imageproc::filter::median_filter(gray, r, r)
        } else {
            gray.clone()
        };

        trace.circles = self.hough.detect(&blurred);
        trace.diagnostics.hough_circles = trace.circles.len();

        let (mask, threshold) = binarize(&blurred, self.config.threshold);
        debug!(threshold, ink = mask.count_ones(), "binarized");

        let (shapes, stats) = self.features.extract(&mask, &blurred);
        trace.diagnostics.features = stats;

        let located = self.locator.locate(&shapes, &trace.circles)?;
        trace.diagnostics.retained = located.retained;
        trace.diagnostics.ring_sizes = located.rings.iter().map(|g| g.len()).collect();

        let (bits, samples) = self.sampler.sample(&located, &self.config.table);
        trace.located = Some(located);
        trace.diagnostics.samples = samples;
        trace.raw_bits = bits;
        debug!("sampled bits:\n{}", format_bits(&trace.raw_bits, 60));

        let corrected = ErrorCorrector::decode(&trace.raw_bits);
        if let Some(bit) = corrected.corrected {
            debug!(bit, "corrected a flipped bit");
        }
        let (version, text) = BitCodec::decode(&corrected.data)?;
        Ok((version, text, corrected.corrected))
    }
}

/// Draw circles, code geometry and slot probes over the input.
fn annotate(gray: &GrayImage, trace: &Trace) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(gray.clone()).to_rgb8();

    for circle in &trace.circles {
        let (x, y) = (circle.center.x as i32, circle.center.y as i32);
        draw_cross_mut(&mut canvas, CIRCLE_COLOR, x, y);
        draw_hollow_circle_mut(&mut canvas, (x, y), circle.radius as i32, CIRCLE_COLOR);
    }

    if let Some(located) = &trace.located {
        let c = located.center.center;
        let center = (c.x as i32, c.y as i32);
        let r = located.center.center_shape.outer_radius(&c);
        draw_hollow_circle_mut(&mut canvas, center, r as i32, CENTER_COLOR);

        let dot = located.orientation.dot.centroid;
        draw_line_segment_mut(&mut canvas, (c.x, c.y), (dot.x, dot.y), AXIS_COLOR);

        for group in located.rings.iter().skip(2) {
            if group.is_empty() {
                continue;
            }
            let mean = group.members.iter().map(|m| m.outer_radius).sum::<f32>()
                / group.len() as f32;
            draw_hollow_circle_mut(&mut canvas, center, mean as i32, RING_COLOR);
        }
    }

    for sample in &trace.diagnostics.samples {
        draw_filled_circle_mut(
            &mut canvas,
            (sample.position.x as i32, sample.position.y as i32),
            2,
            sample_color(sample),
        );
    }
    canvas
}

fn sample_color(sample: &SlotSample) -> Rgb<u8> {
    match sample.bit {
        Some(true) => ONE_COLOR,
        Some(false) => ZERO_COLOR,
        None if sample.container.is_some() => CENTER_COLOR,
        None => MISS_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FgcError, LocatorError};

    #[test]
    fn test_blank_image_reports_no_circle() {
        let decoder = FgcDecoder::default();
        let report = decoder.read_gray(&GrayImage::from_pixel(64, 64, image::Luma([255])));
        assert!(!report.is_ok());
        assert_eq!(report.text(), "");
        assert!(matches!(
            report.error(),
            Some(FgcError::Locator(LocatorError::NoHoughCircle))
        ));
        assert_eq!(report.diagnostics.hough_circles, 0);
        assert!(report.raw_bits.is_empty());
        assert!(report.annotated.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DecodeConfig::default();
        config.features.min_sides = 40;
        assert!(FgcDecoder::new(config).is_err());
    }

    #[test]
    fn test_annotated_image_on_failure() {
        let config = DecodeConfig {
            annotate: true,
            ..DecodeConfig::default()
        };
        let decoder = FgcDecoder::new(config).unwrap();
        let report = decoder.read(&DynamicImage::ImageLuma8(GrayImage::from_pixel(
            40,
            30,
            image::Luma([200]),
        )));
        let annotated = report.annotated.unwrap();
        assert_eq!(annotated.dimensions(), (40, 30));
    }
}

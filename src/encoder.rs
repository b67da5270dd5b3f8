//! Text to ring geometry.
//!
//! text → version + UTF-8 bits → Hamming parity → rings → marks

use image::GrayImage;
use tracing::debug;

use crate::codec::{BitCodec, CURRENT_VERSION, ErrorCorrector};
use crate::error::Result;
use crate::layout::canvas::{Canvas, code_extent, render};
use crate::layout::marks::{BoundaryPolicy, RingMarks, ring_marks};
use crate::layout::raster::RasterCanvas;
use crate::layout::rings::{RingLayout, RingTable};
use crate::layout::svg::{SvgCanvas, SvgStyle};
use crate::models::{BitStream, format_bits};

/// Margin around rendered codes, in drawing units.
pub const QUIET_ZONE: f32 = 3.0;

/// Encoder settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Per-ring angular resolution
    pub table: RingTable,
    /// Handling of runs meeting at 0° in full rings
    pub boundary: BoundaryPolicy,
    /// Version written to the header
    pub version: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            table: RingTable::default(),
            boundary: BoundaryPolicy::default(),
            version: CURRENT_VERSION,
        }
    }
}

/// A fully laid-out code.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EncodedCode {
    /// Encoded text
    pub text: String,
    /// Header version
    pub version: u8,
    /// Version + payload bits
    pub raw_bits: BitStream,
    /// Bits after parity insertion
    pub encoded_bits: BitStream,
    /// Ring partition of `encoded_bits`
    pub layout: RingLayout,
    /// Marks per data ring
    pub marks: Vec<RingMarks>,
}

impl EncodedCode {
    /// Emit the draw calls for this code.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C, label: Option<&str>) {
        render(self, canvas, label);
    }

    /// Render as an SVG document.
    pub fn to_svg(&self, style: SvgStyle, label: bool) -> String {
        let mut canvas = SvgCanvas::new(code_extent(&self.layout) + QUIET_ZONE, style);
        let text = label.then_some(self.text.as_str());
        self.draw(&mut canvas, text);
        canvas.finish()
    }

    /// Rasterize at `scale` pixels per drawing unit.
    pub fn to_image(&self, scale: f32) -> GrayImage {
        let mut canvas = RasterCanvas::new(code_extent(&self.layout), QUIET_ZONE, scale);
        self.draw(&mut canvas, None);
        canvas.into_image()
    }
}

/// Builds [`EncodedCode`]s.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    /// Create an encoder, validating the ring table.
    pub fn new(options: EncodeOptions) -> Result<Self> {
        options.table.validate()?;
        Ok(Self { options })
    }

    /// Encoder settings
    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Lay out `text`.
    pub fn encode(&self, text: &str) -> Result<EncodedCode> {
        let raw_bits = BitCodec::encode_with_version(self.options.version, text)?;
        let encoded_bits = ErrorCorrector::encode(&raw_bits);
        let layout = RingLayout::partition(&encoded_bits, &self.options.table);
        let marks = layout
            .rings
            .iter()
            .map(|ring| ring_marks(ring, self.options.boundary))
            .collect();

        debug!(
            text_bytes = text.len(),
            raw_bits = raw_bits.len(),
            encoded_bits = encoded_bits.len(),
            rings = layout.rings.len(),
            marker = ?layout.marker,
            "encoded code"
        );
        debug!("encoded bits:\n{}", format_bits(&encoded_bits, 60));

        Ok(EncodedCode {
            text: text.to_string(),
            version: self.options.version,
            raw_bits,
            encoded_bits,
            layout,
            marks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rings::MarkerPlacement;

    #[test]
    fn test_encode_milch() {
        let code = Encoder::default().encode("Milch.").unwrap();
        assert_eq!(code.version, 1);
        assert_eq!(code.raw_bits.len(), 52);
        assert_eq!(code.encoded_bits.len(), 58);
        assert_eq!(code.layout.rings.len(), 4);
        assert_eq!(code.layout.marker, MarkerPlacement::SameRing(4));
        assert_eq!(code.marks.len(), 4);
        assert_eq!(code.layout.flatten(), code.encoded_bits);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = Encoder::default();
        assert_eq!(encoder.encode("same").unwrap(), encoder.encode("same").unwrap());
    }

    #[test]
    fn test_invalid_options() {
        let options = EncodeOptions {
            version: 16,
            ..EncodeOptions::default()
        };
        let encoder = Encoder::new(options).unwrap();
        assert!(encoder.encode("x").is_err());

        let options = EncodeOptions {
            table: RingTable {
                degrees: vec![5, 10],
                floor: 4,
            },
            ..EncodeOptions::default()
        };
        assert!(Encoder::new(options).is_err());
    }

    #[test]
    fn test_raster_size() {
        let code = Encoder::default().encode("Milch.").unwrap();
        let img = code.to_image(4.0);
        // (19 + 3) units each side at 4 px per unit.
        assert_eq!(img.dimensions(), (176, 176));
    }
}

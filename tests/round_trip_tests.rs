//! Integration tests for encode → render → decode round trips
//!
//! Codes are rasterized at 12 px per layout unit and fed back through the
//! full decoding pipeline. They protect the agreement between the ring
//! layout written by the encoder and the geometry the sampler expects.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rust_fgc::encoder::{EncodeOptions, Encoder};
use rust_fgc::error::LocatorError;
use rust_fgc::layout::marks::ring_marks;
use rust_fgc::layout::{BoundaryPolicy, MarkerPlacement, RingLayout, RingTable};
use rust_fgc::{DecodeConfig, EncodedCode, FgcDecoder, FgcError};

const SCALE: f32 = 12.0;

fn render(code: &EncodedCode) -> DynamicImage {
    DynamicImage::ImageLuma8(code.to_image(SCALE))
}

fn encoder(boundary: BoundaryPolicy) -> Encoder {
    Encoder::new(EncodeOptions {
        boundary,
        ..EncodeOptions::default()
    })
    .expect("default options are valid")
}

#[test]
fn test_round_trip_milch() {
    let code = rust_fgc::encode("Milch.").unwrap();
    assert_eq!(code.encoded_bits.len(), 58);
    assert_eq!(code.layout.marker, MarkerPlacement::SameRing(4));

    let message = FgcDecoder::default().decode(&render(&code)).unwrap();
    assert_eq!(message.text, "Milch.");
    assert_eq!(message.version, 1);
    assert_eq!(message.raw_bits, code.encoded_bits);
    assert_eq!(message.corrected_bit, None);
}

#[test]
fn test_round_trip_both_boundary_policies() {
    let decoder = FgcDecoder::default();
    for boundary in [BoundaryPolicy::Closed, BoundaryPolicy::Open] {
        let encoder = encoder(boundary);
        for text in ["Milch.", "FGC", "Fancy Galaxy Code"] {
            let code = encoder.encode(text).unwrap();
            let message = decoder.decode(&render(&code)).unwrap_or_else(|err| {
                panic!("{text:?} with {boundary:?} failed: {err}");
            });
            assert_eq!(message.text, text, "boundary {boundary:?}");
        }
    }
}

#[test]
fn test_full_last_ring_uses_extra_marker_ring() {
    // One character plus its parity fills ring 1 exactly.
    let code = rust_fgc::encode("A").unwrap();
    assert_eq!(code.encoded_bits.len(), 17);
    assert_eq!(code.layout.marker, MarkerPlacement::ExtraRing(2));

    let message = FgcDecoder::default().decode(&render(&code)).unwrap();
    assert_eq!(message.text, "A");
}

#[test]
fn test_partly_filled_last_ring_moves_marker_outward() {
    // Every ring holds 17 bits; 16 or 15 bits in the last ring leave too few
    // free slots for the marker, its gap and the sentinel.
    let table = RingTable::new(vec![20], 20).unwrap();
    let encoder = Encoder::new(EncodeOptions {
        table: table.clone(),
        ..EncodeOptions::default()
    })
    .unwrap();
    let decoder = FgcDecoder::new(DecodeConfig {
        table,
        ..DecodeConfig::default()
    })
    .unwrap();

    for (text, last_ring, used) in [("Milk!", 3, 16), ("Fancy FGC", 5, 15)] {
        let code = encoder.encode(text).unwrap();
        assert_eq!(code.layout.marker, MarkerPlacement::ExtraRing(last_ring + 1));
        let last = code.layout.rings.last().unwrap();
        assert_eq!((last.number, last.data.len(), last.capacity), (last_ring, used, 17));

        let message = decoder.decode(&render(&code)).unwrap();
        assert_eq!(message.text, text);
        assert_eq!(message.raw_bits, code.encoded_bits);
    }
}

#[test]
fn test_single_flipped_mark_is_corrected() {
    let mut code = rust_fgc::encode("Milch.").unwrap();
    code.encoded_bits[10] = !code.encoded_bits[10];
    let table = RingTable::default();
    code.layout = RingLayout::partition(&code.encoded_bits, &table);
    code.marks = code
        .layout
        .rings
        .iter()
        .map(|ring| ring_marks(ring, BoundaryPolicy::Closed))
        .collect();

    let message = FgcDecoder::default().decode(&render(&code)).unwrap();
    assert_eq!(message.text, "Milch.");
    assert_eq!(message.corrected_bit, Some(10));
}

#[test]
fn test_rotated_code_decodes() {
    let code = rust_fgc::encode("Milch.").unwrap();
    let upright = code.to_image(SCALE);
    let decoder = FgcDecoder::default();

    let quarter = DynamicImage::ImageLuma8(image::imageops::rotate90(&upright));
    assert_eq!(decoder.decode(&quarter).unwrap().text, "Milch.");

    let tilted = rotate_about_center(
        &upright,
        30f32.to_radians(),
        Interpolation::Bilinear,
        Luma([255u8]),
    );
    let message = decoder.decode(&DynamicImage::ImageLuma8(tilted)).unwrap();
    assert_eq!(message.text, "Milch.");
}

#[test]
fn test_color_input_decodes() {
    let code = rust_fgc::encode("Hi").unwrap();
    let rgb = render(&code).to_rgb8();
    let message = rust_fgc::decode(&DynamicImage::ImageRgb8(rgb)).unwrap();
    assert_eq!(message.text, "Hi");
}

#[test]
fn test_blank_image_has_no_circle() {
    let blank = DynamicImage::ImageLuma8(GrayImage::from_pixel(200, 200, Luma([255])));
    let err = rust_fgc::decode(&blank).unwrap_err();
    assert!(matches!(err, FgcError::Locator(LocatorError::NoHoughCircle)));
}

#[test]
fn test_decode_batch_keeps_order() {
    let images: Vec<DynamicImage> = ["one", "two", "three"]
        .iter()
        .map(|text| render(&rust_fgc::encode(text).unwrap()))
        .chain(std::iter::once(DynamicImage::new_luma8(50, 50)))
        .collect();

    let results = rust_fgc::decode_batch(&images);
    assert_eq!(results.len(), 4);
    let texts: Vec<&str> = results[..3]
        .iter()
        .map(|r| r.as_ref().map(|m| m.text.as_str()).unwrap())
        .collect();
    assert_eq!(texts, ["one", "two", "three"]);
    assert!(results[3].is_err());
}

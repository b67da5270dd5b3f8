//! SVG output with a per-ring color gradient.

use std::fmt::Write as _;
use std::path::Path;

use image::Rgb;

use crate::error::{FgcError, Result};
use crate::layout::canvas::{Canvas, Group};
use crate::layout::rings::STROKE_WIDTH;
use crate::models::Point;
use crate::utils::geometry::polar_to_cartesian;

/// Vertical distance between label lines, in drawing units.
const LABEL_LINE_HEIGHT: f32 = 5.0;
/// Gap between the code and the first label line.
const LABEL_MARGIN: f32 = 3.0;

/// Parse a `#rrggbb` color.
pub fn parse_hex_color(text: &str) -> Result<Rgb<u8>> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(FgcError::Config(format!("invalid color '{}'", text)));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| FgcError::Config(format!("invalid color '{}'", text)))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

fn hex(color: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Colors and decorations of an SVG rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgStyle {
    /// Color of the innermost data ring
    pub inner: Rgb<u8>,
    /// Color of the outermost data ring
    pub outer: Rgb<u8>,
    /// Background fill, transparent when `None`
    pub background: Option<Rgb<u8>>,
    /// Color of the center structure
    pub structure: Rgb<u8>,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            inner: Rgb([0x39, 0xa8, 0x87]),
            outer: Rgb([0x0f, 0x1a, 0x3b]),
            background: Some(Rgb([0xff, 0xff, 0xff])),
            structure: Rgb([0, 0, 0]),
        }
    }
}

impl SvgStyle {
    /// Linear RGB interpolation between inner and outer color for a ring.
    pub fn ring_color(&self, number: usize, total: usize) -> Rgb<u8> {
        let t = if total > 1 {
            (number.saturating_sub(1)) as f32 / (total - 1) as f32
        } else {
            0.0
        };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb([
            mix(self.inner[0], self.outer[0]),
            mix(self.inner[1], self.outer[1]),
            mix(self.inner[2], self.outer[2]),
        ])
    }
}

/// Canvas that builds an SVG document.
pub struct SvgCanvas {
    extent: f32,
    style: SvgStyle,
    body: String,
    color: Rgb<u8>,
    text_lines: usize,
}

impl SvgCanvas {
    /// Create a canvas covering `extent` drawing units around the center.
    pub fn new(extent: f32, style: SvgStyle) -> Self {
        Self {
            extent,
            style,
            body: String::new(),
            color: style.structure,
            text_lines: 0,
        }
    }

    /// Finish the document.
    pub fn finish(&self) -> String {
        let e = self.extent;
        let height = if self.text_lines > 0 {
            2.0 * e + LABEL_MARGIN + self.text_lines as f32 * LABEL_LINE_HEIGHT
        } else {
            2.0 * e
        };
        let mut doc = String::new();
        let _ = writeln!(
            doc,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{:.3} {:.3} {:.3} {:.3}\" width=\"{:.0}mm\" height=\"{:.0}mm\">",
            -e,
            -e,
            2.0 * e,
            height,
            2.0 * e,
            height
        );
        if let Some(bg) = self.style.background {
            let _ = writeln!(
                doc,
                "<rect x=\"{:.3}\" y=\"{:.3}\" width=\"{:.3}\" height=\"{:.3}\" fill=\"{}\"/>",
                -e,
                -e,
                2.0 * e,
                height,
                hex(bg)
            );
        }
        doc.push_str(&self.body);
        doc.push_str("</svg>\n");
        doc
    }

    /// Write the document to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.finish())?;
        Ok(())
    }
}

impl Canvas for SvgCanvas {
    fn begin_group(&mut self, group: Group) {
        let (id, color) = match group {
            Group::Structure => ("structure".to_string(), self.style.structure),
            Group::Ring { number, total } => {
                (format!("ring-{}", number), self.style.ring_color(number, total))
            }
        };
        self.color = color;
        let _ = writeln!(self.body, "<g id=\"{}\" fill=\"{}\">", id, hex(color));
    }

    fn draw_arc(&mut self, radius: f32, start_deg: f32, end_deg: f32) {
        let color = hex(self.color);
        if end_deg - start_deg >= 360.0 {
            let _ = writeln!(
                self.body,
                "<circle cx=\"0\" cy=\"0\" r=\"{:.3}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
                radius, color, STROKE_WIDTH
            );
            return;
        }
        let origin = Point::default();
        let start = polar_to_cartesian(&origin, radius, start_deg);
        let end = polar_to_cartesian(&origin, radius, end_deg);
        let large = if end_deg - start_deg > 180.0 { 1 } else { 0 };
        let _ = writeln!(
            self.body,
            "<path d=\"M {:.3} {:.3} A {:.3} {:.3} 0 {} 1 {:.3} {:.3}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"/>",
            start.x, start.y, radius, radius, large, end.x, end.y, color, STROKE_WIDTH
        );
    }

    fn draw_dot(&mut self, center: Point, radius: f32) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.3}\" cy=\"{:.3}\" r=\"{:.3}\"/>",
            center.x, center.y, radius
        );
    }

    fn draw_text(&mut self, lines: &[String]) {
        for (i, line) in lines.iter().enumerate() {
            let y = self.extent + LABEL_MARGIN + (self.text_lines + i) as f32 * LABEL_LINE_HEIGHT;
            let escaped = line
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            let _ = writeln!(
                self.body,
                "<text x=\"0\" y=\"{:.3}\" font-size=\"4\" font-family=\"monospace\" text-anchor=\"middle\">{}</text>",
                y, escaped
            );
        }
        self.text_lines += lines.len();
    }

    fn end_group(&mut self) {
        self.body.push_str("</g>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::layout::canvas::{code_extent, render};

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#39a887").unwrap(), Rgb([0x39, 0xa8, 0x87]));
        assert_eq!(parse_hex_color("ffffff").unwrap(), Rgb([255, 255, 255]));
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
    }

    #[test]
    fn test_ring_gradient_endpoints() {
        let style = SvgStyle::default();
        assert_eq!(style.ring_color(1, 4), style.inner);
        assert_eq!(style.ring_color(4, 4), style.outer);
        assert_eq!(style.ring_color(1, 1), style.inner);
    }

    #[test]
    fn test_svg_document() {
        let code = Encoder::default().encode("Milch.").unwrap();
        let mut canvas = SvgCanvas::new(code_extent(&code.layout), SvgStyle::default());
        render(&code, &mut canvas, Some("Milch."));
        let svg = canvas.finish();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<g id=\"ring-4\""));
        assert!(svg.contains("stroke-linecap=\"round\""));
        assert!(svg.contains(">Milch.</text>"));
        assert_eq!(svg.matches("<g ").count(), svg.matches("</g>").count());
    }

    #[test]
    fn test_full_arc_is_circle() {
        let mut canvas = SvgCanvas::new(10.0, SvgStyle::default());
        canvas.begin_group(Group::Ring { number: 1, total: 1 });
        canvas.draw_arc(9.0, 0.0, 360.0);
        canvas.end_group();
        assert!(canvas.finish().contains("<circle cx=\"0\" cy=\"0\" r=\"9.000\" fill=\"none\""));
    }
}

//! Rasterizes the watermark text onto a blank canvas.
//!
//! Glyphs come from the public domain 8x8 bitmap font. Every font bit is blown up to a square of
//! [`GLYPH_CELL`] times the font scale, and lit bits are widened by the same amount on all four
//! sides to emulate the stroke thickness.
//!
//! All geometry is done in saturating `i64` arithmetic; any scale or thickness renders, oversized
//! strokes just cover the whole canvas.
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

use crate::algorithm::EmbedConfig;

/// Size in pixels of a single font bit at scale 1.
pub const GLYPH_CELL: u32 = 4;

/// Number of bits per glyph row and per glyph column.
const GLYPH_BITS: i64 = 8;

/// Glyph used for characters the font doesn't cover.
const FALLBACK: char = '?';

fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get(FALLBACK))
}

/// Geometry shared by measuring and drawing.
#[derive(Debug, Copy, Clone)]
struct Metrics {
    /// Pixels per font bit.
    cell: i64,
    /// Growth of a lit bit on each side.
    pad: i64,
}

impl Metrics {
    fn new(font_scale: u32, thickness: u32) -> Self {
        Metrics {
            cell: (GLYPH_CELL as i64).saturating_mul(font_scale.max(1) as i64),
            pad: (thickness.saturating_sub(1) / 2) as i64,
        }
    }

    fn advance(&self) -> i64 {
        GLYPH_BITS.saturating_mul(self.cell)
    }

    /// Side of a lit bit once widened.
    fn stroke(&self) -> i64 {
        self.cell.saturating_add(self.pad.saturating_mul(2))
    }

    fn size(&self, text: &str) -> (i64, i64) {
        let count = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
        if count == 0 {
            return (0, 0);
        }
        let grow = self.pad.saturating_mul(2);
        (
            count.saturating_mul(self.advance()).saturating_add(grow),
            self.advance().saturating_add(grow),
        )
    }
}

/// Width and height of the bounding box of the rendered text, including the stroke growth.
///
/// Empty text measures zero by zero.
pub fn text_size(text: &str, font_scale: u32, thickness: u32) -> (i64, i64) {
    Metrics::new(font_scale, thickness).size(text)
}

/// Origin (bottom left of the bounding box) that centers a box of the given size on the canvas.
///
/// Uses floor division, so text wider than the canvas gets a negative origin.
pub fn centered_origin(
    canvas_width: u32,
    canvas_height: u32,
    text_width: i64,
    text_height: i64,
) -> (i64, i64) {
    (
        (canvas_width as i64).saturating_sub(text_width).div_euclid(2),
        (canvas_height as i64).saturating_add(text_height).div_euclid(2),
    )
}

/// Render `text` centered on an all black canvas of the given dimensions.
///
/// Anything falling outside the canvas is clipped.
pub fn render(width: u32, height: u32, text: &str, config: &EmbedConfig) -> RgbImage {
    let mut canvas = RgbImage::new(width, height);
    let metrics = Metrics::new(config.font_scale, config.thickness);
    let (text_width, text_height) = metrics.size(text);
    if text_width == 0 {
        return canvas;
    }
    let (origin_x, origin_y) = centered_origin(width, height, text_width, text_height);
    tracing::trace!(text_width, text_height, origin_x, origin_y, "rendering pattern");

    let color = Rgb(config.color);
    // Glyphs sit inside the bounding box, inset by the stroke growth.
    let glyph_top = origin_y
        .saturating_sub(text_height)
        .saturating_add(metrics.pad);
    let glyph_left = origin_x.saturating_add(metrics.pad);
    for (index, ch) in text.chars().enumerate() {
        let Some(bits) = glyph(ch) else {
            continue;
        };
        let glyph_x = glyph_left.saturating_add((index as i64).saturating_mul(metrics.advance()));
        if glyph_x.saturating_sub(metrics.pad) >= width as i64 {
            break;
        }
        for (row, byte) in bits.iter().enumerate() {
            for col in 0..GLYPH_BITS {
                // Least significant bit is the leftmost pixel.
                if (*byte >> col) & 1 == 0 {
                    continue;
                }
                let bit_x = glyph_x.saturating_add(col.saturating_mul(metrics.cell));
                let bit_y = glyph_top.saturating_add((row as i64).saturating_mul(metrics.cell));
                fill_rect(
                    &mut canvas,
                    bit_x.saturating_sub(metrics.pad),
                    bit_y.saturating_sub(metrics.pad),
                    metrics.stroke(),
                    color,
                );
            }
        }
    }
    canvas
}

/// Fill an axis aligned square, clipped to the canvas.
fn fill_rect(canvas: &mut RgbImage, x0: i64, y0: i64, side: i64, color: Rgb<u8>) {
    let x_start = x0.max(0);
    let y_start = y0.max(0);
    let x_end = x0.saturating_add(side).min(canvas.width() as i64);
    let y_end = y0.saturating_add(side).min(canvas.height() as i64);
    for y in y_start..y_end {
        for x in x_start..x_end {
            canvas.put_pixel(x as u32, y as u32, color);
        }
    }
}

//! Reduction of colour images to a single luma plane, and back.
use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// Single channel floating point plane, used as transform input and output.
pub type Luma32FImage = ImageBuffer<Luma<f32>, Vec<f32>>;

// ITU-R BT.601 weights.
const WEIGHT_R: f32 = 0.299;
const WEIGHT_G: f32 = 0.587;
const WEIGHT_B: f32 = 0.114;

/// Luma of a single pixel, quantized to 8 bits.
pub fn pixel_luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let y = WEIGHT_R * r as f32 + WEIGHT_G * g as f32 + WEIGHT_B * b as f32;
    y.round().clamp(0.0, 255.0) as u8
}

/// Reduce an rgb image to its luma plane.
///
/// The luma is quantized to 8 bits before it is widened to a float, so a gray pixel keeps its
/// exact value.
pub fn to_luma(img: &RgbImage) -> Luma32FImage {
    let (width, height) = img.dimensions();
    Luma32FImage::from_fn(width, height, |x, y| {
        Luma([pixel_luma(img.get_pixel(x, y)) as f32])
    })
}

/// Replicate a single channel into three identical channels.
pub fn replicate(gray: &GrayImage) -> RgbImage {
    let (width, height) = gray.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    })
}

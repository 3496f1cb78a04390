//! Exact comparison of two images.
//!
//! This is not a similarity metric; a single differing byte means the images are not the same.
use std::path::Path;

use image::RgbImage;

use crate::error::Result;

/// Absolute per pixel, per channel difference. `None` if the dimensions differ.
pub fn abs_diff(a: &RgbImage, b: &RgbImage) -> Option<RgbImage> {
    if a.dimensions() != b.dimensions() {
        return None;
    }
    let (width, height) = a.dimensions();
    let data = a
        .as_raw()
        .iter()
        .zip(b.as_raw().iter())
        .map(|(av, bv)| av.abs_diff(*bv))
        .collect::<Vec<u8>>();
    RgbImage::from_raw(width, height, data)
}

/// Number of samples that are not zero.
pub fn count_nonzero(img: &RgbImage) -> usize {
    img.as_raw().iter().filter(|v| **v != 0).count()
}

/// True if both images have the same dimensions and every sample is identical.
pub fn unchanged_images(a: &RgbImage, b: &RgbImage) -> bool {
    match abs_diff(a, b) {
        Some(diff) => count_nonzero(&diff) == 0,
        None => {
            tracing::debug!(a = ?a.dimensions(), b = ?b.dimensions(), "dimensions differ");
            false
        }
    }
}

/// Decode both images and report whether they are byte for byte identical.
///
/// Differing dimensions are not an error, they yield `false`.
#[tracing::instrument(skip_all, fields(a = ?path_a.as_ref(), b = ?path_b.as_ref()))]
pub fn unchanged(path_a: impl AsRef<Path>, path_b: impl AsRef<Path>) -> Result<bool> {
    let a = crate::storage::open_rgb(&path_a)?;
    let b = crate::storage::open_rgb(&path_b)?;
    Ok(unchanged_images(&a, &b))
}

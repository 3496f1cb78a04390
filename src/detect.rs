//! Watermark detection.
//!
//! There is no detection algorithm; the image is decoded and handed back unchanged so the caller
//! can display it.
use std::path::Path;

use image::RgbImage;

use crate::error::Result;

/// Decode the image at `path` and return it as is.
pub fn detect(path: impl AsRef<Path>) -> Result<RgbImage> {
    crate::storage::open_rgb(path)
}

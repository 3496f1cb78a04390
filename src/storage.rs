//! Reading images from, and writing them to, storage.
use std::path::Path;

use image::RgbImage;

use crate::error::{Result, WatermarkError};

/// Decode the image at `path` as 8 bit rgb; an alpha channel is dropped.
pub fn open_rgb(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|e| WatermarkError::decode(path, e))?
        .into_rgb8();
    tracing::debug!(?path, width = img.width(), height = img.height(), "decoded image");
    Ok(img)
}

/// Encode the image to `path`, the format is inferred from the extension.
pub fn save(img: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    img.save(path).map_err(|e| WatermarkError::encode(path, e))?;
    tracing::debug!(?path, "encoded image");
    Ok(())
}

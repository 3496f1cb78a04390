//! Contains the actual logic that ties everything together.
//!
//! The main steps in the algorithm are:
//! - Render the watermark text onto a black canvas the size of the carrier.
//! - Reduce both carrier and canvas to their luma planes.
//! - Compute the discrete cosine transform of both planes.
//! - Blend the coefficients; `carrier + alpha * pattern`.
//! - Perform the inverse discrete cosine transform on the blended coefficients.
//! - Stretch the result to the full 8 bit range and replicate it into three channels.
//!
//! The output is gray by construction, the chrominance of the carrier does not survive.

use std::path::Path;

use image::RgbImage;
use rustdct::DctPlanner;
use serde::{Deserialize, Serialize};

use crate::dct2d::{dct2_2d, Type};
use crate::error::Result;
use crate::luma::Luma32FImage;

/// Configuration to embed the watermark with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Strength of the watermark; the pattern coefficients are scaled by this before being added.
    pub alpha: f32,
    /// Scale factor of the font.
    pub font_scale: u32,
    /// Stroke thickness of the text, in pixels.
    pub thickness: u32,
    /// Color the text is drawn in.
    pub color: [u8; 3],
}

impl Default for EmbedConfig {
    /// Default configuration; alpha of 0.1, font scale 2, thickness 5, white text.
    fn default() -> Self {
        EmbedConfig {
            alpha: 0.1,
            font_scale: 2,
            thickness: 5,
            color: [255, 255, 255],
        }
    }
}

impl EmbedConfig {
    /// Load the configuration from a json file, absent fields take their default.
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

/// Embedder to write visible text watermarks into images.
///
/// Holds no state between calls other than the transform planner.
pub struct Embedder {
    config: EmbedConfig,
    planner: DctPlanner<f32>,
}

impl Embedder {
    /// Create an embedder with the given configuration.
    pub fn new(config: EmbedConfig) -> Self {
        Embedder {
            config,
            planner: DctPlanner::<f32>::new(),
        }
    }

    /// Embed the text into the carrier, returning the gray, three channel result.
    #[tracing::instrument(skip(self, carrier), fields(width = carrier.width(), height = carrier.height()))]
    pub fn embed(&mut self, carrier: &RgbImage, text: &str) -> RgbImage {
        let (width, height) = carrier.dimensions();
        let pattern = crate::pattern::render(width, height, text, &self.config);

        let carrier_luma = crate::luma::to_luma(carrier);
        let pattern_luma = crate::luma::to_luma(&pattern);

        let blended = self.blend(&carrier_luma, &pattern_luma);
        let gray = crate::util::rescale_to_u8(&blended);
        tracing::debug!(alpha = self.config.alpha, "embedded watermark");
        crate::luma::replicate(&gray)
    }

    /// Transform both planes, blend the coefficients and transform back.
    ///
    /// This is the result before it is stretched to 8 bits. Panics if the planes differ in size.
    pub fn blend(&mut self, carrier: &Luma32FImage, pattern: &Luma32FImage) -> Luma32FImage {
        assert_eq!(
            carrier.dimensions(),
            pattern.dimensions(),
            "carrier and pattern must be equally sized"
        );
        let mut coefficients = self.coefficients(carrier);
        let pattern_coefficients = self.coefficients(pattern);

        Self::embed_coefficients(&mut coefficients, &pattern_coefficients, self.config.alpha);

        // Convert back from cosine transform domain to real.
        self.transform(&mut coefficients, Type::DCT3);
        coefficients
    }

    /// Obtain the transform coefficients of a plane.
    pub fn coefficients(&mut self, plane: &Luma32FImage) -> Luma32FImage {
        let mut out = plane.clone();
        self.transform(&mut out, Type::DCT2);
        out
    }

    fn transform(&mut self, plane: &mut Luma32FImage, transform: Type) {
        let width = plane.width() as usize;
        let height = plane.height() as usize;
        let samples: &mut [f32] = plane;
        dct2_2d(&mut self.planner, transform, width, height, samples);
    }

    /// Modify the carrier coefficients in place; `c_i' = c_i + alpha * w_i`.
    fn embed_coefficients(coefficients: &mut [f32], pattern: &[f32], alpha: f32) {
        for (c, w) in coefficients.iter_mut().zip(pattern.iter()) {
            *c += alpha * w;
        }
    }
}

/// Embed `text` into the image at `carrier_path` with the default configuration.
pub fn embed(carrier_path: impl AsRef<Path>, text: &str) -> Result<RgbImage> {
    embed_with(carrier_path, text, &EmbedConfig::default())
}

/// Embed `text` into the image at `carrier_path`.
///
/// Fails if the carrier can't be decoded.
pub fn embed_with(
    carrier_path: impl AsRef<Path>,
    text: &str,
    config: &EmbedConfig,
) -> Result<RgbImage> {
    let carrier = crate::storage::open_rgb(carrier_path)?;
    let mut embedder = Embedder::new(config.clone());
    Ok(embedder.embed(&carrier, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    /// Horizontal gray ramp spanning the full 8 bit range.
    fn ramp(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _y| {
            let v = ((x * 255) / (width - 1)) as u8;
            Rgb([v, v, v])
        })
    }

    fn mean_abs_diff(a: &RgbImage, b: &RgbImage) -> f32 {
        let total: u64 = a
            .as_raw()
            .iter()
            .zip(b.as_raw().iter())
            .map(|(x, y)| x.abs_diff(*y) as u64)
            .sum();
        total as f32 / a.as_raw().len() as f32
    }

    fn with_alpha(alpha: f32) -> EmbedConfig {
        EmbedConfig {
            alpha,
            ..EmbedConfig::default()
        }
    }

    #[test]
    fn test_embed_coefficients() {
        let mut coefficients = [-3f32, 5.0, -8.0, 7.0];
        let pattern = [10f32, 0.0, -20.0, 1.0];
        Embedder::embed_coefficients(&mut coefficients, &pattern, 0.5);
        assert_eq!(&coefficients, &[2.0f32, 5.0, -18.0, 7.5]);
    }

    #[test]
    fn test_blend_is_additive_in_pixel_domain() {
        // The transform is linear, so the blend equals carrier + alpha * pattern.
        let carrier = Luma32FImage::from_fn(6, 4, |x, y| Luma([(x * 10 + y) as f32]));
        let pattern = Luma32FImage::from_fn(6, 4, |x, y| {
            Luma([if (x + y) % 3 == 0 { 255.0 } else { 0.0 }])
        });
        let mut embedder = Embedder::new(with_alpha(0.1));
        let blended = embedder.blend(&carrier, &pattern);
        let expected: Vec<f32> = carrier
            .iter()
            .zip(pattern.iter())
            .map(|(c, w)| c + 0.1 * w)
            .collect();
        crate::util::approx_equal(&expected, &blended, 0.001);
    }

    #[test]
    fn test_zero_alpha_reconstructs_carrier() {
        let img = ramp(64, 16);
        let mut embedder = Embedder::new(with_alpha(0.0));
        let out = embedder.embed(&img, "HI");
        // The ramp already spans 0..=255, so the stretch is a no-op up to truncation.
        for (o, i) in out.as_raw().iter().zip(img.as_raw().iter()) {
            assert!(o.abs_diff(*i) <= 1);
        }
    }

    #[test]
    fn test_output_is_gray_and_sized() {
        let img = RgbImage::from_fn(37, 23, |x, y| Rgb([x as u8 * 5, y as u8 * 9, 77]));
        let mut embedder = Embedder::new(EmbedConfig::default());
        let out = embedder.embed(&img, "A");
        assert_eq!(out.dimensions(), (37, 23));
        assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_deterministic() {
        let img = ramp(80, 40);
        let a = Embedder::new(EmbedConfig::default()).embed(&img, "OK");
        let b = Embedder::new(EmbedConfig::default()).embed(&img, "OK");
        assert_eq!(a.as_raw(), b.as_raw());

        // Reusing an embedder gives the same result too.
        let mut embedder = Embedder::new(EmbedConfig::default());
        let c = embedder.embed(&img, "OK");
        let d = embedder.embed(&img, "OK");
        assert_eq!(c.as_raw(), d.as_raw());
        assert_eq!(a.as_raw(), c.as_raw());
    }

    #[test]
    fn test_alpha_monotonicity() {
        let img = ramp(512, 160);
        let plain = Embedder::new(with_alpha(0.0)).embed(&img, "TEST");
        let mut previous = 0.0f32;
        // Stays below saturation; the text sits on ramp values well under 255 - 0.2 * 255.
        for alpha in [0.05f32, 0.1, 0.2] {
            let marked = Embedder::new(with_alpha(alpha)).embed(&img, "TEST");
            let diff = mean_abs_diff(&marked, &plain);
            assert!(
                diff > previous,
                "alpha {alpha}: diff {diff} not above previous {previous}"
            );
            previous = diff;
        }
    }

    #[test]
    fn test_huge_font_scale_from_config() {
        let config = EmbedConfig::from_json(r#"{"font_scale": 2000000000, "thickness": 4294967295}"#)
            .unwrap();
        let img = RgbImage::from_pixel(30, 20, Rgb([90, 90, 90]));
        let out = Embedder::new(config).embed(&img, "A");
        assert_eq!(out.dimensions(), (30, 20));
        assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }

    #[test]
    fn test_config_from_json() {
        let config = EmbedConfig::from_json(r#"{"alpha": 0.25}"#).unwrap();
        assert_eq!(config.alpha, 0.25);
        assert_eq!(config.font_scale, 2);
        assert_eq!(config.thickness, 5);
        assert_eq!(config.color, [255, 255, 255]);

        let round = serde_json::to_string(&config).unwrap();
        assert_eq!(EmbedConfig::from_json(&round).unwrap(), config);
    }

    #[test]
    fn test_embed_missing_file() {
        let r = embed("/this/path/does/not/exist.png", "x");
        assert!(matches!(
            r,
            Err(crate::error::WatermarkError::Decode { .. })
        ));
    }
}

#![allow(dead_code)]
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use text_watermark as wm;

/// Assert that two slices are equal in length and element-wise within `max_error`.
pub fn approx_equal(a: &[f32], b: &[f32], max_error: f32) {
    assert_eq!(a.len(), b.len(), "a and b are not equal length");
    for (i, (av, bv)) in a.iter().zip(b.iter()).enumerate() {
        let delta = (av - bv).abs();
        assert!(
            delta <= max_error,
            "index {i}: {av} vs {bv}, delta was {delta}, this exceeded allowed {max_error}."
        );
    }
}

pub fn generate_fixed_normal_sequence(seed: u64, length: usize) -> Vec<f32> {
    use rand::prelude::*;
    use rand_distr::StandardNormal;
    let mut generator = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(length);
    data.resize_with(length, || generator.sample(StandardNormal));
    data
}

/// A plane of the given dimensions, filled with a scaled normal sequence around mid gray.
pub fn generate_fixed_plane(seed: u64, width: u32, height: u32) -> wm::luma::Luma32FImage {
    let data = generate_fixed_normal_sequence(seed, (width * height) as usize)
        .iter()
        .map(|v| 128.0 + 40.0 * v)
        .collect::<Vec<f32>>();
    wm::luma::Luma32FImage::from_raw(width, height, data).expect("Guaranteed dimensions")
}

/// A colourful image with uniformly distributed samples.
pub fn generate_fixed_image(seed: u64, width: u32, height: u32) -> image::RgbImage {
    use rand::prelude::*;
    let mut generator = ChaCha8Rng::seed_from_u64(seed);
    image::RgbImage::from_fn(width, height, |_x, _y| image::Rgb(generator.gen()))
}

pub fn write_into(dir: &Path, name: &str, img: &image::RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path)
        .unwrap_or_else(|_| panic!("could not write image at {:?}", path));
    path
}

use crate::luma::Luma32FImage;

/// The value every sample takes when a plane has no dynamic range to stretch.
pub const FLAT_VALUE: u8 = 128;

/// Ranges below this are treated as flat; it is far under one 8-bit step, so it only absorbs the
/// rounding noise of the transform round trip.
pub const FLAT_RANGE_EPSILON: f32 = 1e-3;

/// Linearly rescale the plane such that its minimum maps to 0 and its maximum to 255, then
/// truncate to 8 bits.
///
/// A flat plane maps to [`FLAT_VALUE`] everywhere.
pub fn rescale_to_u8(plane: &Luma32FImage) -> image::GrayImage {
    let (width, height) = plane.dimensions();
    let samples: &[f32] = plane;
    let min = samples.iter().copied().fold(f32::INFINITY, f32::min);
    let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    tracing::trace!(min, max, "rescaling plane");

    if samples.is_empty() || !(range >= FLAT_RANGE_EPSILON) {
        return image::GrayImage::from_pixel(width, height, image::Luma([FLAT_VALUE]));
    }
    let gain = 255.0 / range;
    // Float to int casts saturate, which also absorbs rounding just past either end.
    image::GrayImage::from_fn(width, height, |x, y| {
        image::Luma([((plane.get_pixel(x, y).0[0] - min) * gain) as u8])
    })
}

/// Assert that two slices are equal in length and element-wise within `max_error`.
#[cfg(test)]
pub(crate) fn approx_equal(a: &[f32], b: &[f32], max_error: f32) {
    assert_eq!(a.len(), b.len(), "a and b are not equal length");
    for delta in a.iter().zip(b.iter()).map(|(av, bv)| (*av - *bv).abs()) {
        assert!(
            delta <= max_error,
            "a: {a:?}, b: {b:?}, delta was {delta}, this exceeded allowed {max_error}."
        );
    }
}

use rustdct::num_traits::Float;
use rustdct::DctNum;
use rustdct::DctPlanner;

use crate::luma::Luma32FImage;

// https://github.com/mpizenberg/fft2d exists, but it doesn't handle f32s, which seems to be more
// than sufficient and would allow more simd instructions.

/*
This file implements the following python code:

coefficients = cv2.dct(np.float32(luma))
luma = cv2.idct(coefficients)

Both are the orthonormal transforms over the full matrix, so the pair is exactly invertible. Scipy
spells the same thing as dct(dct(x, norm='ortho').T, norm='ortho').T.
*/

/// The transform to perform.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum Type {
    /// Forward transform, discrete cosine transform of type II.
    DCT2,
    /// Inverse transform, discrete cosine transform of type III.
    DCT3,
}

#[derive(PartialEq, Debug, Copy, Clone)]
enum Direction {
    Row,
    Column,
}

/// Perform an orthonormal two dimensional discrete cosine transform of the given type.
/// Data is assumed to be ordered row first and will be overwritten with the result.
///
/// No assumption is made on the dimensions, they need not be square or a power of two.
pub fn dct2_2d<T: DctNum + Float>(
    planner: &mut DctPlanner<T>,
    transform: Type,
    width: usize,
    height: usize,
    data: &mut [T],
) {
    assert_eq!(data.len(), (width * height));
    if data.is_empty() {
        return;
    }
    // The order of rows / columns and then columns / rows does not matter.
    // We can do the largest dimension first, to allow reuse of the scratch buffer.
    let first = if width >= height {
        Direction::Row
    } else {
        Direction::Column
    };
    let second = if first == Direction::Row {
        Direction::Column
    } else {
        Direction::Row
    };

    // Allocate the vector we'll use for the intermediate row / column storage.
    let mut tmp: Vec<T> = Vec::<T>::new();

    // Allocate the scratch buffer.
    let mut scratch: Vec<T> = Vec::<T>::new();

    for current in [first, second] {
        let (iter_max, step, skip_mult, take) = match current {
            Direction::Row => (height, 1, width, width),
            Direction::Column => (width, width, 1, height),
        };
        let length = take;

        let dct = planner.plan_dct2(length);
        tmp.resize(length, T::zero());
        scratch.resize(dct.get_scratch_len(), T::zero());

        // sqrt(1/N) for the DC term, sqrt(2/N) for the others.
        let n = T::from_usize(length).unwrap();
        let dc_scale = (T::one() / n).sqrt();
        let ac_scale = (T::two() / n).sqrt();

        // Generalised iteration.
        for i in 0..iter_max {
            // Copy the row into tmp.
            let row_iter = data.iter().skip(i * skip_mult).step_by(step).take(take);
            for (orig, out) in row_iter.zip(tmp.iter_mut()) {
                *out = *orig;
            }

            match transform {
                Type::DCT2 => {
                    dct.process_dct2_with_scratch(&mut tmp, &mut scratch);
                    tmp[0] = tmp[0] * dc_scale;
                    for v in tmp.iter_mut().skip(1) {
                        *v = *v * ac_scale;
                    }
                }
                Type::DCT3 => {
                    // rustdct's type III halves the DC term, undo the orthonormal scaling
                    // with that in mind.
                    tmp[0] = tmp[0] * dc_scale * T::two();
                    for v in tmp.iter_mut().skip(1) {
                        *v = *v * ac_scale;
                    }
                    dct.process_dct3_with_scratch(&mut tmp, &mut scratch);
                }
            }

            // Copy tmp back into the data, overwriting the original input.
            let row_iter_mut = data.iter_mut().skip(i * skip_mult).step_by(step).take(take);
            for (data_dct, result) in row_iter_mut.zip(tmp.iter()) {
                *data_dct = *result;
            }
        }
    }
}

/// Forward transform of a luma plane, returning the coefficients.
pub fn forward(plane: &Luma32FImage) -> Luma32FImage {
    transformed(plane, Type::DCT2)
}

/// Inverse transform of the coefficients, returning the luma plane.
pub fn inverse(coefficients: &Luma32FImage) -> Luma32FImage {
    transformed(coefficients, Type::DCT3)
}

fn transformed(plane: &Luma32FImage, transform: Type) -> Luma32FImage {
    let mut planner = DctPlanner::<f32>::new();
    let mut out = plane.clone();
    let (width, height) = out.dimensions();
    let samples: &mut [f32] = &mut out;
    dct2_2d(
        &mut planner,
        transform,
        width as usize,
        height as usize,
        samples,
    );
    out
}

use tcd_core::Image;

use crate::error::{BsifError, BsifResult};

/// 5-tap binomial anti-alias kernel used before decimation
const PYR_KERNEL: [f64; 5] = [
    1.0 / 16.0,
    4.0 / 16.0,
    6.0 / 16.0,
    4.0 / 16.0,
    1.0 / 16.0,
];

/// Halve an image in both dimensions: separable binomial smoothing with
/// reflected borders, then drop every other row and column.
///
/// Filtering a half-resolution image at kernel size `s` stands in for a
/// size-`2s` descriptor, for which no literal kernel exists.
pub fn downsample_half(img: &[u8], width: usize, height: usize) -> BsifResult<(Image, usize, usize)> {
    if width < 2 || height < 2 {
        return Err(BsifError::InvalidImageSize { width, height });
    }
    let expected_len = width * height;
    if img.len() != expected_len {
        return Err(BsifError::InvalidImageData {
            expected_len,
            actual_len: img.len(),
        });
    }

    let out_width = width / 2;
    let out_height = height / 2;

    // Horizontal pass over full-resolution rows
    let mut blurred_rows = vec![0.0f64; width * height];
    for r in 0..height {
        let src = &img[r * width..(r + 1) * width];
        let dst = &mut blurred_rows[r * width..(r + 1) * width];
        for c in 0..width {
            let mut acc = 0.0;
            for (t, &coeff) in PYR_KERNEL.iter().enumerate() {
                let sc = reflect(c as isize + t as isize - 2, width);
                acc += src[sc] as f64 * coeff;
            }
            dst[c] = acc;
        }
    }

    // Vertical pass, sampled only at the surviving even coordinates
    let mut out = vec![0u8; out_width * out_height];
    for r in 0..out_height {
        for c in 0..out_width {
            let src_c = c * 2;
            let mut acc = 0.0;
            for (t, &coeff) in PYR_KERNEL.iter().enumerate() {
                let sr = reflect((r * 2) as isize + t as isize - 2, height);
                acc += blurred_rows[sr * width + src_c] * coeff;
            }
            out[r * out_width + c] = acc.round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok((out, out_width, out_height))
}

/// Reflect an index into [0, n) without repeating the edge sample
/// (reflect-101: ... 2 1 | 0 1 2 ... n-1 | n-2 n-3 ...).
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    let period = 2 * n - 2;
    let mut idx = i.rem_euclid(period);
    if idx >= n {
        idx = period - idx;
    }
    idx as usize
}

use rayon::prelude::*;
use tcd_core::{Histogram, Image};

use crate::bank::{FilterBank, FilterBankEntry};
use crate::error::{BsifError, BsifResult};

/// Convolution responses must exceed this to set a code bit.
const RESPONSE_THRESHOLD: f64 = 1e-3;

/// BSIF descriptor engine bound to one filter bank entry.
///
/// Applies every kernel of the entry to a grayscale image via
/// cross-correlation over a circularly padded copy, accumulating a per-pixel
/// integer code which is either binned into a histogram or rendered for
/// inspection. The input image is never mutated.
pub struct BsifExtractor<'a> {
    entry: &'a FilterBankEntry,
}

impl<'a> BsifExtractor<'a> {
    pub fn new(bank: &'a FilterBank, kernel_size: usize, bit_depth: usize) -> BsifResult<Self> {
        let entry = bank.entry(kernel_size, bit_depth)?;
        Ok(Self { entry })
    }

    pub fn kernel_size(&self) -> usize {
        self.entry.kernel_size()
    }

    pub fn bit_depth(&self) -> usize {
        self.entry.bit_depth()
    }

    /// Histogram length including the reserved zero bin.
    pub fn histogram_len(&self) -> usize {
        (1usize << self.entry.bit_depth()) + 1
    }

    fn validate(&self, img: &[u8], width: usize, height: usize) -> BsifResult<()> {
        if width == 0 || height == 0 {
            return Err(BsifError::InvalidImageSize { width, height });
        }
        let expected_len = width * height;
        if img.len() != expected_len {
            return Err(BsifError::InvalidImageData {
                expected_len,
                actual_len: img.len(),
            });
        }
        Ok(())
    }

    /// Accumulated per-pixel codes, width x height row-major.
    ///
    /// Cells start at 1 so a downstream histogram never touches bin 0. Bit
    /// planes are processed from `bit_depth - 1` down to 0; the plane
    /// processed first contributes the least-significant bit.
    pub fn code_image(&self, img: &[u8], width: usize, height: usize) -> BsifResult<Vec<f64>> {
        self.validate(img, width, height)?;

        let size = self.entry.kernel_size();
        let bits = self.entry.bit_depth();
        let border = size / 2;
        let padded = wrap_pad(img, width, height, border);
        let padded_width = width + 2 * border;

        let mut code = vec![1.0f64; width * height];
        let mut itr = 0u32;
        for bit in (0..bits).rev() {
            let kernel = self.entry.kernel(bit);
            let gain = (1u64 << itr) as f64;

            // Responses are only needed over the original extent; the wrap
            // border is already baked into the padded copy, so the window at
            // (r, c) reads padded rows r..r+size without further clamping.
            code.par_chunks_mut(width).enumerate().for_each(|(r, row)| {
                for c in 0..width {
                    let mut acc = 0.0f64;
                    for kr in 0..size {
                        let img_base = (r + kr) * padded_width + c;
                        let kernel_row = &kernel[kr * size..(kr + 1) * size];
                        for (kc, &coeff) in kernel_row.iter().enumerate() {
                            acc += padded[img_base + kc] * coeff;
                        }
                    }
                    if acc > RESPONSE_THRESHOLD {
                        row[c] += gain;
                    }
                }
            });
            itr += 1;
        }

        Ok(code)
    }

    /// Code frequency histogram of length `2^bit_depth + 1`.
    ///
    /// Bin 0 stays 0 by construction; bins 1.. sum to `width * height`.
    pub fn histogram(&self, img: &[u8], width: usize, height: usize) -> BsifResult<Histogram> {
        let code = self.code_image(img, width, height)?;
        let mut histogram = vec![0u32; self.histogram_len()];
        for &value in &code {
            histogram[value as usize] += 1;
        }
        Ok(histogram)
    }

    /// Min-max normalized 8-bit rendering of the code image, for inspection.
    pub fn visual_image(&self, img: &[u8], width: usize, height: usize) -> BsifResult<Image> {
        let code = self.code_image(img, width, height)?;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in &code {
            min = min.min(value);
            max = max.max(value);
        }
        let span = max - min;
        let out = code
            .iter()
            .map(|&value| {
                if span > 0.0 {
                    ((value - min) / span * 255.0).round() as u8
                } else {
                    0
                }
            })
            .collect();
        Ok(out)
    }
}

/// Extend an image by `border` pixels on every side with circular
/// (wrap-around) padding, converting samples to f64.
fn wrap_pad(img: &[u8], width: usize, height: usize, border: usize) -> Vec<f64> {
    let padded_width = width + 2 * border;
    let padded_height = height + 2 * border;
    let mut out = vec![0.0f64; padded_width * padded_height];
    for pr in 0..padded_height {
        let sr = (pr as isize - border as isize).rem_euclid(height as isize) as usize;
        let src_row = &img[sr * width..(sr + 1) * width];
        let dst_row = &mut out[pr * padded_width..(pr + 1) * padded_width];
        for (pc, dst) in dst_row.iter_mut().enumerate() {
            let sc = (pc as isize - border as isize).rem_euclid(width as isize) as usize;
            *dst = src_row[sc] as f64;
        }
    }
    out
}

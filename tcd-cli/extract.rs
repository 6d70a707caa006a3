use std::path::Path;

use rayon::prelude::*;
use tcd_bsif::{downsample_half, BsifExtractor, FilterBank};
use tcd_core::Histogram;

use crate::config::{ModelSpec, Segmentation};
use crate::{TcdError, TcdResult};

/// Fixed iris region used by best-guess segmentation, in pixels.
const IRIS_CROP_X: u32 = 195;
const IRIS_CROP_Y: u32 = 125;
const IRIS_CROP_SIZE: u32 = 250;

/// Batch descriptor extraction over a directory of grayscale images.
pub struct Extractor<'a> {
    bank: &'a FilterBank,
    image_dir: &'a Path,
    segmentation: Segmentation,
}

impl<'a> Extractor<'a> {
    pub fn new(bank: &'a FilterBank, image_dir: &'a Path, segmentation: Segmentation) -> Self {
        Self { bank, image_dir, segmentation }
    }

    /// Load one image as 8-bit grayscale and apply the configured
    /// segmentation.
    fn load_image(&self, filename: &str) -> TcdResult<(Vec<u8>, usize, usize)> {
        let path = self.image_dir.join(filename);
        let img = image::open(&path)
            .map_err(|source| TcdError::ImageLoad {
                path: path.display().to_string(),
                source,
            })?
            .to_luma8();

        let img = match self.segmentation {
            Segmentation::WholeImage => img,
            Segmentation::BestGuess => {
                if img.width() < IRIS_CROP_X + IRIS_CROP_SIZE
                    || img.height() < IRIS_CROP_Y + IRIS_CROP_SIZE
                {
                    return Err(TcdError::CropOutOfBounds {
                        path: path.display().to_string(),
                        width: img.width(),
                        height: img.height(),
                    });
                }
                image::imageops::crop_imm(
                    &img,
                    IRIS_CROP_X,
                    IRIS_CROP_Y,
                    IRIS_CROP_SIZE,
                    IRIS_CROP_SIZE,
                )
                .to_image()
            }
        };

        let (width, height) = (img.width() as usize, img.height() as usize);
        Ok((img.into_raw(), width, height))
    }

    fn histogram_for(&self, spec: &ModelSpec, filename: &str) -> TcdResult<Histogram> {
        let (effective_size, downsample) = spec.effective_kernel();
        let extractor = BsifExtractor::new(self.bank, effective_size, spec.bit_depth)?;

        let (mut img, mut width, mut height) = self.load_image(filename)?;
        if downsample {
            let (down, w, h) = downsample_half(&img, width, height)?;
            img = down;
            width = w;
            height = h;
        }
        Ok(extractor.histogram(&img, width, height)?)
    }

    /// Extract histograms for every image of a split in parallel.
    ///
    /// A failing image is reported and skipped so one unreadable file does
    /// not abort a long batch; an entirely failed batch is an error.
    pub fn extract_batch(
        &self,
        spec: &ModelSpec,
        filenames: &[String],
    ) -> TcdResult<Vec<(String, Histogram)>> {
        let rows: Vec<(String, Histogram)> = filenames
            .par_iter()
            .filter_map(|name| match self.histogram_for(spec, name) {
                Ok(histogram) => Some((name.clone(), histogram)),
                Err(err) => {
                    eprintln!("Skipping {}: {}", name, err);
                    None
                }
            })
            .collect();

        if rows.is_empty() && !filenames.is_empty() {
            return Err(TcdError::EmptyBatch);
        }
        Ok(rows)
    }
}

/// Row-major 8-bit grayscale image
pub type Image = Vec<u8>;

/// BSIF code frequencies; bin 0 is reserved and always stays 0
pub type Histogram = Vec<u32>;

/// Per-sample feature vector (histogram bins 1.., optionally z-scored)
pub type FeatureVector = Vec<f32>;

/// Binary class label
pub type Label = i32;

/// Clear (non-textured) iris, the bona fide class
pub const LABEL_CLEAR: Label = 0;

/// Textured (cosmetic) contact lens, the attack class
pub const LABEL_TEXTURED: Label = 1;

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

pub mod bank;
pub mod engine;
pub mod error;
pub mod pyramid;

pub use bank::{FilterBank, FilterBankEntry, KERNEL_SIZES, MAX_BIT_DEPTH, MIN_BIT_DEPTH};
pub use engine::BsifExtractor;
pub use error::{BsifError, BsifResult};
pub use pyramid::downsample_half;

#[derive(Debug)]
pub enum BsifError {
    InvalidImageSize { width: usize, height: usize },
    InvalidImageData { expected_len: usize, actual_len: usize },
    UnknownFilterConfiguration { kernel_size: usize, bit_depth: usize },
    MalformedFilterPack { reason: String },
    Io(std::io::Error),
}

impl std::fmt::Display for BsifError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BsifError::InvalidImageSize { width, height } => {
                write!(f, "Invalid image dimensions: {}x{} (must be > 0)", width, height)
            }
            BsifError::InvalidImageData { expected_len, actual_len } => {
                write!(f, "Image data length mismatch: expected {}, got {}", expected_len, actual_len)
            }
            BsifError::UnknownFilterConfiguration { kernel_size, bit_depth } => {
                write!(f, "No filter bank entry for kernel size {} at bit depth {}", kernel_size, bit_depth)
            }
            BsifError::MalformedFilterPack { reason } => {
                write!(f, "Malformed filter pack: {}", reason)
            }
            BsifError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BsifError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BsifError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BsifError {
    fn from(err: std::io::Error) -> Self {
        BsifError::Io(err)
    }
}

pub type BsifResult<T> = Result<T, BsifError>;

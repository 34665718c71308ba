//! Error types for the JPEG 2000 pixel data transcoder.

use thiserror::Error;

/// Result type alias for the library.
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Main error type for the transcoder.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// Bits allocated or samples per pixel outside what the codec handles.
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    /// A per-slice fragment carried no payload.
    #[error("Fragment {index} is empty")]
    EmptyFragment {
        /// Position of the offending fragment in the sequence.
        index: usize,
    },

    /// The compression engine reported a failure.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Decoded component precision differs from the configured bits allocated.
    #[error("Precision mismatch on component {component}: expected {expected} bits, decoded {actual}")]
    PrecisionMismatch {
        /// Component index.
        component: usize,
        /// Bits allocated of the pixel format.
        expected: u16,
        /// Precision reported by the engine.
        actual: u8,
    },

    /// Internal consistency check failed.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Decoded component planes cannot be re-interleaved.
    #[error("Component layout error: {0}")]
    ComponentLayout(String),

    /// A decoded frame does not have the size of one slice.
    #[error("Frame {index} decoded to {actual} bytes, expected {expected}")]
    FrameSize {
        /// Frame index.
        index: usize,
        /// Expected byte length of one slice.
        expected: usize,
        /// Actual decoded byte length.
        actual: usize,
    },

    /// Number of fragments does not match the number of slices.
    #[error("Fragment count {fragments} does not match depth {depth}")]
    FragmentCount {
        /// Fragments present in the sequence.
        fragments: usize,
        /// Slices described by the dimensions.
        depth: u32,
    },

    /// Image dimensions or data mismatch.
    #[error("Image data error: {0}")]
    ImageData(String),

    /// Malformed fragment stream or container bytes.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The operation was cancelled between slices.
    #[error("Operation cancelled")]
    Cancelled,

    /// Error reading or parsing DICOM file.
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dicom::object::ReadError> for TranscodeError {
    fn from(err: dicom::object::ReadError) -> Self {
        TranscodeError::Dicom(err.to_string())
    }
}

impl From<toml::de::Error> for TranscodeError {
    fn from(err: toml::de::Error) -> Self {
        TranscodeError::Config(err.to_string())
    }
}

//! JPEG 2000 Pixel Data Transcoder
//!
//! Converts raw DICOM pixel data (a raster buffer plus its pixel format and
//! dimensions) to and from a sequence of JPEG 2000 fragments, one per slice.
//!
//! # Features
//!
//! - **Raster packing**: 8, 16 and 32 bit samples, signed or unsigned, one or three channels
//! - **Both codestream flavors**: raw J2K codestreams and boxed JP2 files are sniffed and decoded
//! - **Pseudo-volumes**: each slice of a multi-frame image is encoded independently, in parallel
//! - **Pluggable engines**: the wavelet codec sits behind the [`codec::Engine`] trait
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use medimg_j2k::{CodecConfig, Dimensions, Jpeg2000Codec, PixelFormat};
//!
//! let codec = Jpeg2000Codec::new(CodecConfig::default());
//! let format = PixelFormat::unsigned(16, 1);
//! let dims = Dimensions::volume(512, 512, 4);
//!
//! let fragments = codec.encode(&raster, &format, &dims)?;
//! assert_eq!(fragments.len(), 4);
//! let decoded = codec.decode(&fragments, &format, &dims)?;
//! assert_eq!(decoded, raster);
//! ```
//!
//! # Fragment count
//!
//! Decoding a volume assumes fragment `i` holds slice `i`. Nothing in the
//! pixel data guarantees this, so a count mismatch is only logged unless
//! `strict_fragment_count` is enabled:
//!
//! ```rust,ignore
//! let mut config = CodecConfig::default();
//! config.decode.strict_fragment_count = true;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod dicom;
pub mod error;
pub mod fragment;
pub mod pipeline;
pub mod pixel;
pub mod progress;

// Re-export commonly used types
pub use codec::{sniff, CodestreamFormat, DiagnosticSink, Engine, ReferenceEngine};
pub use config::{CodecConfig, DecodeOptions, EncodeParameters};
pub use dicom::{DicomFile, DicomMetadata};
pub use error::{Result, TranscodeError};
pub use fragment::{Fragment, FragmentSequence};
pub use pipeline::{Jpeg2000Codec, PipelineBuilder};
pub use pixel::{Dimensions, PixelFormat};

/// Library version information.
pub mod version {
    /// Library version string.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Library name.
    pub const NAME: &str = env!("CARGO_PKG_NAME");

    /// Get full version string.
    pub fn full_version() -> String {
        format!("{} {}", NAME, VERSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version() {
        assert_eq!(version::full_version(), format!("medimg_j2k {}", version::VERSION));
    }

    #[test]
    fn test_reexported_roundtrip() {
        let codec = Jpeg2000Codec::default();
        let format = PixelFormat::signed(16, 1);
        let dims = Dimensions::volume(3, 2, 2);
        let raster: Vec<u8> = (0u8..24).collect();

        let fragments = codec.encode(&raster, &format, &dims).unwrap();
        assert_eq!(sniff(fragments.fragments()[0].data()), CodestreamFormat::RawCodestream);
        assert_eq!(codec.decode(&fragments, &format, &dims).unwrap(), raster);
    }
}

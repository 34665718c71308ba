//! Codestream flavor detection.

/// Leading bytes of a boxed (JP2) file: the signature box.
pub const JP2_SIGNATURE: [u8; 12] = [
    0x00, 0x00, 0x00, 0x0C, 0x6A, 0x50, 0x20, 0x20, 0x0D, 0x0A, 0x87, 0x0A,
];

/// Flavor of a compressed byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodestreamFormat {
    /// Bare J2K codestream starting with the SOC marker.
    RawCodestream,
    /// Codestream wrapped in JP2 boxes.
    BoxedContainer,
}

impl std::fmt::Display for CodestreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RawCodestream => write!(f, "J2K codestream"),
            Self::BoxedContainer => write!(f, "JP2 container"),
        }
    }
}

/// Classify a compressed byte range by its first 12 bytes.
pub fn sniff(data: &[u8]) -> CodestreamFormat {
    if data.starts_with(&JP2_SIGNATURE) {
        log::warn!("J2K data starts like a JPEG 2000 file (JP2 boxes) instead of a codestream");
        CodestreamFormat::BoxedContainer
    } else {
        CodestreamFormat::RawCodestream
    }
}

//! Image geometry, pixel format and the engine-facing component image.
//!
//! [`PixelFormat`] and [`Dimensions`] are supplied by the caller once per
//! codec invocation. [`ComponentImage`] is the planar intermediate exchanged
//! with the compression engine; one is built per frame and dropped as soon as
//! that frame has been packed or unpacked.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranscodeError};

/// Integer width of one stored sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 8-bit samples.
    Eight,
    /// 16-bit samples.
    Sixteen,
    /// 32-bit samples.
    ThirtyTwo,
}

impl BitDepth {
    /// Map a bits-allocated value onto a supported sample width.
    pub fn from_bits(bits_allocated: u16) -> Result<Self> {
        match bits_allocated {
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            32 => Ok(BitDepth::ThirtyTwo),
            other => Err(TranscodeError::UnsupportedFormat(format!(
                "bits allocated must be 8, 16 or 32, got {}",
                other
            ))),
        }
    }

    /// Number of bits of the sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
            BitDepth::ThirtyTwo => 32,
        }
    }

    /// Number of bytes of the sample.
    pub fn bytes(&self) -> usize {
        self.bits() as usize / 8
    }
}

/// Pixel format of the raster buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    /// Bits allocated per sample (8, 16 or 32 for this codec).
    pub bits_allocated: u16,
    /// Samples per pixel (1 = grayscale, 3 = RGB).
    pub samples_per_pixel: u16,
    /// Pixel representation (0 = unsigned, 1 = signed).
    pub pixel_representation: u16,
}

impl PixelFormat {
    /// Create a pixel format.
    pub fn new(bits_allocated: u16, samples_per_pixel: u16, pixel_representation: u16) -> Self {
        Self {
            bits_allocated,
            samples_per_pixel,
            pixel_representation,
        }
    }

    /// Unsigned pixel format.
    pub fn unsigned(bits_allocated: u16, samples_per_pixel: u16) -> Self {
        Self::new(bits_allocated, samples_per_pixel, 0)
    }

    /// Signed (two's complement) pixel format.
    pub fn signed(bits_allocated: u16, samples_per_pixel: u16) -> Self {
        Self::new(bits_allocated, samples_per_pixel, 1)
    }

    /// Whether samples are signed.
    pub fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }

    /// Bytes per stored sample, rounded up.
    pub fn bytes_per_sample(&self) -> usize {
        ((self.bits_allocated + 7) / 8) as usize
    }

    /// Supported sample width for this format.
    pub fn bit_depth(&self) -> Result<BitDepth> {
        BitDepth::from_bits(self.bits_allocated)
    }

    /// Color space implied by the number of samples per pixel.
    pub fn color_space(&self) -> Result<ColorSpace> {
        match self.samples_per_pixel {
            1 => Ok(ColorSpace::Gray),
            3 => Ok(ColorSpace::Srgb),
            other => Err(TranscodeError::UnsupportedFormat(format!(
                "samples per pixel must be 1 or 3, got {}",
                other
            ))),
        }
    }

    /// Check that the codec can handle this format.
    pub fn validate(&self) -> Result<()> {
        self.bit_depth()?;
        self.color_space()?;
        Ok(())
    }
}

/// Image geometry: width, height and number of slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Number of slices; 1 for a single 2D image.
    pub depth: u32,
}

impl Dimensions {
    /// Create dimensions.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// A single 2D image.
    pub fn planar(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    /// A pseudo-volume of `depth` independent frames.
    pub fn volume(width: u32, height: u32, depth: u32) -> Self {
        Self::new(width, height, depth)
    }

    /// Whether more than one slice is described.
    pub fn is_volume(&self) -> bool {
        self.depth > 1
    }

    /// Number of pixels in one slice.
    pub fn pixels_per_frame(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Byte length of one raster slice, saturating at `usize::MAX`.
    pub fn frame_len(&self, format: &PixelFormat) -> usize {
        self.pixels_per_frame()
            .saturating_mul(format.samples_per_pixel as usize)
            .saturating_mul(format.bytes_per_sample())
    }

    /// Byte length of the whole raster buffer, saturating at `usize::MAX`.
    pub fn total_len(&self, format: &PixelFormat) -> usize {
        self.frame_len(format).saturating_mul(self.depth as usize)
    }

    /// Byte length of the whole raster buffer, or `ImageData` when it
    /// cannot be addressed.
    pub fn checked_total_len(&self, format: &PixelFormat) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(format.samples_per_pixel as usize))
            .and_then(|n| n.checked_mul(format.bytes_per_sample()))
            .and_then(|n| n.checked_mul(self.depth as usize))
            .filter(|n| isize::try_from(*n).is_ok())
            .ok_or_else(|| {
                TranscodeError::ImageData(format!(
                    "{} with {} samples of {} bits exceeds the addressable size",
                    self, format.samples_per_pixel, format.bits_allocated
                ))
            })
    }

    /// Reject zero extents.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(TranscodeError::ImageData(format!(
                "Invalid image dimensions {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// Color space of a component image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Single intensity channel.
    Gray,
    /// Three channels, R, G, B.
    Srgb,
}

/// Divide `value` by `2^factor`, rounding up.
pub fn ceil_div_pow2(value: u32, factor: u8) -> u32 {
    let divisor = 1u64 << factor.min(31);
    ((value as u64 + divisor - 1) / divisor) as u32
}

/// One plane of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Nominal width of the plane; also the row stride of `data`.
    pub width: u32,
    /// Nominal height of the plane.
    pub height: u32,
    /// Sample precision in bits.
    pub precision: u8,
    /// Whether samples are signed.
    pub signed: bool,
    /// Resolution reduction applied by the decoder (0 at encode time).
    pub factor: u8,
    /// Samples, row-major.
    pub data: Vec<i64>,
}

impl Component {
    /// Create a full-resolution plane.
    pub fn new(width: u32, height: u32, precision: u8, signed: bool, data: Vec<i64>) -> Self {
        Self {
            width,
            height,
            precision,
            signed,
            factor: 0,
            data,
        }
    }

    /// Width after the reduction factor is applied.
    pub fn reduced_width(&self) -> u32 {
        ceil_div_pow2(self.width, self.factor)
    }

    /// Height after the reduction factor is applied.
    pub fn reduced_height(&self) -> u32 {
        ceil_div_pow2(self.height, self.factor)
    }
}

/// Planar image handed to and returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentImage {
    /// Color space of the components.
    pub color_space: ColorSpace,
    /// Component planes; one per sample of a pixel.
    pub components: Vec<Component>,
}

impl ComponentImage {
    /// Create a component image.
    pub fn new(color_space: ColorSpace, components: Vec<Component>) -> Self {
        Self {
            color_space,
            components,
        }
    }

    /// Number of component planes.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_supported_widths() {
        assert_eq!(BitDepth::from_bits(8).unwrap(), BitDepth::Eight);
        assert_eq!(BitDepth::from_bits(16).unwrap(), BitDepth::Sixteen);
        assert_eq!(BitDepth::from_bits(32).unwrap().bytes(), 4);
    }

    #[test]
    fn test_bit_depth_rejects_other_widths() {
        for bits in [1u16, 4, 12, 24, 64] {
            assert!(matches!(
                BitDepth::from_bits(bits),
                Err(TranscodeError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_pixel_format_validation() {
        assert!(PixelFormat::unsigned(16, 1).validate().is_ok());
        assert!(PixelFormat::signed(32, 3).validate().is_ok());
        assert!(PixelFormat::unsigned(8, 2).validate().is_err());
        assert!(PixelFormat::unsigned(12, 1).validate().is_err());
        assert!(PixelFormat::signed(8, 1).is_signed());
    }

    #[test]
    fn test_oversized_dimensions_do_not_overflow() {
        let dims = Dimensions::volume(u32::MAX, u32::MAX, u32::MAX);
        let format = PixelFormat::signed(32, 3);
        assert_eq!(dims.total_len(&format), usize::MAX);
        assert!(matches!(
            dims.checked_total_len(&format),
            Err(TranscodeError::ImageData(_))
        ));
        assert_eq!(
            Dimensions::volume(4, 3, 2).checked_total_len(&format).unwrap(),
            4 * 3 * 2 * 3 * 4
        );
    }

    #[test]
    fn test_dimensions_lengths() {
        let dims = Dimensions::volume(512, 256, 5);
        let format = PixelFormat::unsigned(16, 3);
        assert_eq!(dims.frame_len(&format), 512 * 256 * 3 * 2);
        assert_eq!(dims.total_len(&format), 512 * 256 * 3 * 2 * 5);
        assert!(dims.is_volume());
        assert!(!Dimensions::planar(4, 4).is_volume());
        assert!(Dimensions::new(0, 4, 1).validate().is_err());
    }

    #[test]
    fn test_ceil_div_pow2() {
        assert_eq!(ceil_div_pow2(16, 0), 16);
        assert_eq!(ceil_div_pow2(16, 1), 8);
        assert_eq!(ceil_div_pow2(15, 1), 8);
        assert_eq!(ceil_div_pow2(17, 2), 5);
    }

    #[test]
    fn test_component_reduced_extent() {
        let mut component = Component::new(16, 15, 8, false, vec![0; 240]);
        component.factor = 1;
        assert_eq!(component.reduced_width(), 8);
        assert_eq!(component.reduced_height(), 8);
    }
}

//! Raster-to-component packing.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, TranscodeError};
use crate::pixel::{BitDepth, Component, ComponentImage, PixelFormat};

/// Read one little-endian sample of the given width.
pub(crate) fn read_sample(bytes: &[u8], depth: BitDepth, signed: bool) -> i64 {
    match (depth, signed) {
        (BitDepth::Eight, false) => bytes[0] as i64,
        (BitDepth::Eight, true) => bytes[0] as i8 as i64,
        (BitDepth::Sixteen, false) => LittleEndian::read_u16(bytes) as i64,
        (BitDepth::Sixteen, true) => LittleEndian::read_i16(bytes) as i64,
        (BitDepth::ThirtyTwo, false) => LittleEndian::read_u32(bytes) as i64,
        (BitDepth::ThirtyTwo, true) => LittleEndian::read_i32(bytes) as i64,
    }
}

/// De-interleave one raster frame into one plane per sample.
///
/// `raster` holds `samples_per_pixel` consecutive samples per pixel and must
/// be exactly `width * height * samples_per_pixel * bits_allocated / 8`
/// bytes long.
pub fn pack(raster: &[u8], width: u32, height: u32, format: &PixelFormat) -> Result<ComponentImage> {
    let depth = format.bit_depth()?;
    let color_space = format.color_space()?;
    let num_components = format.samples_per_pixel as usize;
    let bytes = depth.bytes();
    let pixels = width as usize * height as usize;

    let expected = pixels * num_components * bytes;
    if raster.len() != expected {
        return Err(TranscodeError::ImageData(format!(
            "Raster frame size mismatch: expected {} bytes, got {}",
            expected,
            raster.len()
        )));
    }

    let signed = format.is_signed();
    let mut planes: Vec<Vec<i64>> = (0..num_components)
        .map(|_| Vec::with_capacity(pixels))
        .collect();

    for (index, sample) in raster.chunks_exact(bytes).enumerate() {
        planes[index % num_components].push(read_sample(sample, depth, signed));
    }

    let components = planes
        .into_iter()
        .map(|data| Component::new(width, height, depth.bits() as u8, signed, data))
        .collect();

    Ok(ComponentImage::new(color_space, components))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ColorSpace;

    #[test]
    fn test_pack_rgb_deinterleaves() {
        let raster: Vec<u8> = (0..4).flat_map(|_| [10u8, 20, 30]).collect();
        let image = pack(&raster, 2, 2, &PixelFormat::unsigned(8, 3)).unwrap();

        assert_eq!(image.color_space, ColorSpace::Srgb);
        assert_eq!(image.num_components(), 3);
        assert_eq!(image.components[0].data, vec![10; 4]);
        assert_eq!(image.components[1].data, vec![20; 4]);
        assert_eq!(image.components[2].data, vec![30; 4]);
        assert!(image.components.iter().all(|c| c.factor == 0 && c.precision == 8));
    }

    #[test]
    fn test_pack_signed_sixteen_bit() {
        let values: [i16; 4] = [-1024, -1, 0, 3071];
        let raster: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let image = pack(&raster, 2, 2, &PixelFormat::signed(16, 1)).unwrap();

        assert_eq!(image.color_space, ColorSpace::Gray);
        assert_eq!(image.components[0].data, vec![-1024, -1, 0, 3071]);
        assert!(image.components[0].signed);
        assert_eq!(image.components[0].precision, 16);
    }

    #[test]
    fn test_pack_unsigned_thirty_two_bit_keeps_full_range() {
        let raster: Vec<u8> = [u32::MAX, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let image = pack(&raster, 2, 1, &PixelFormat::unsigned(32, 1)).unwrap();
        assert_eq!(image.components[0].data, vec![u32::MAX as i64, 7]);
    }

    #[test]
    fn test_pack_rejects_unsupported_bits() {
        for bits in [1u16, 4, 12, 24, 64] {
            let format = PixelFormat::unsigned(bits, 1);
            let result = pack(&[0u8; 64], 4, 4, &format);
            assert!(matches!(result, Err(TranscodeError::UnsupportedFormat(_))));
        }
    }

    #[test]
    fn test_pack_rejects_unsupported_samples() {
        let result = pack(&[0u8; 8], 2, 2, &PixelFormat::unsigned(8, 2));
        assert!(matches!(result, Err(TranscodeError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_pack_rejects_wrong_length() {
        let result = pack(&[0u8; 15], 4, 4, &PixelFormat::unsigned(8, 1));
        assert!(matches!(result, Err(TranscodeError::ImageData(_))));
    }
}

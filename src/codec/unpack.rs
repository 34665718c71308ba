//! Component-to-raster unpacking.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, TranscodeError};
use crate::pixel::{BitDepth, ComponentImage};

fn write_sample(out: &mut [u8], depth: BitDepth, value: i64) {
    match depth {
        BitDepth::Eight => out[0] = value as u8,
        BitDepth::Sixteen => LittleEndian::write_u16(out, value as u16),
        BitDepth::ThirtyTwo => LittleEndian::write_u32(out, value as u32),
    }
}

/// Re-interleave decoded component planes into one raster frame.
///
/// Each plane is read with its nominal width as row stride, but only its
/// reduced width and height (after the decoder's reduction factor) are
/// copied. The result holds `reduced_width * reduced_height` pixels.
pub fn unpack(image: &ComponentImage, bits_allocated: u16) -> Result<Vec<u8>> {
    let depth = BitDepth::from_bits(bits_allocated)?;
    let first = image
        .components
        .first()
        .ok_or_else(|| TranscodeError::ComponentLayout("image has no components".into()))?;

    let reduced_width = first.reduced_width() as usize;
    let reduced_height = first.reduced_height() as usize;
    let num_components = image.num_components();

    for (index, component) in image.components.iter().enumerate() {
        if component.precision as u16 != bits_allocated {
            return Err(TranscodeError::PrecisionMismatch {
                component: index,
                expected: bits_allocated,
                actual: component.precision,
            });
        }

        if component.reduced_width() as usize != reduced_width
            || component.reduced_height() as usize != reduced_height
        {
            return Err(TranscodeError::ComponentLayout(format!(
                "component {} is {}x{}, component 0 is {}x{}",
                index,
                component.reduced_width(),
                component.reduced_height(),
                reduced_width,
                reduced_height
            )));
        }

        let stride = component.width as usize;
        let needed = if reduced_height == 0 {
            0
        } else {
            (reduced_height - 1) * stride + reduced_width
        };
        if component.data.len() < needed {
            return Err(TranscodeError::ComponentLayout(format!(
                "component {} holds {} samples, stride {} needs {}",
                index,
                component.data.len(),
                stride,
                needed
            )));
        }
    }

    let bytes = depth.bytes();
    let pixels = reduced_width * reduced_height;
    let mut raster = vec![0u8; pixels * num_components * bytes];

    for (compno, component) in image.components.iter().enumerate() {
        let stride = component.width as usize;
        for i in 0..pixels {
            let value = component.data[i / reduced_width * stride + i % reduced_width];
            let offset = (i * num_components + compno) * bytes;
            write_sample(&mut raster[offset..offset + bytes], depth, value);
        }
    }

    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::pack::pack;
    use crate::pixel::{ColorSpace, Component, PixelFormat};

    #[test]
    fn test_rgb_channels_survive_pack_unpack() {
        let raster: Vec<u8> = (0..64).flat_map(|_| [10u8, 20, 30]).collect();
        let image = pack(&raster, 8, 8, &PixelFormat::unsigned(8, 3)).unwrap();
        let restored = unpack(&image, 8).unwrap();

        assert_eq!(restored.len(), 8 * 8 * 3);
        for pixel in restored.chunks_exact(3) {
            assert_eq!(pixel, &[10, 20, 30]);
        }
    }

    #[test]
    fn test_signed_and_wide_samples_survive_pack_unpack() {
        let values: [i32; 6] = [i32::MIN, -70000, -1, 0, 1, i32::MAX];
        let raster: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let image = pack(&raster, 3, 2, &PixelFormat::signed(32, 1)).unwrap();
        assert_eq!(unpack(&image, 32).unwrap(), raster);

        let raster16: Vec<u8> = [0u16, 1, 4095, 65535]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let image16 = pack(&raster16, 2, 2, &PixelFormat::unsigned(16, 1)).unwrap();
        assert_eq!(unpack(&image16, 16).unwrap(), raster16);
    }

    #[test]
    fn test_reduction_factor_reads_with_nominal_stride() {
        // 16x16 nominal plane where each sample encodes its row and column.
        let data: Vec<i64> = (0..256).map(|i| ((i / 16) * 16 + i % 16) as i64).collect();
        let mut component = Component::new(16, 16, 8, false, data);
        component.factor = 1;
        let image = ComponentImage::new(ColorSpace::Gray, vec![component]);

        let raster = unpack(&image, 8).unwrap();
        assert_eq!(raster.len(), 8 * 8);
        for row in 0..8 {
            for col in 0..8 {
                assert_eq!(raster[row * 8 + col] as usize, row * 16 + col);
            }
        }
    }

    #[test]
    fn test_precision_mismatch_is_rejected() {
        let component = Component::new(2, 2, 12, false, vec![0; 4]);
        let image = ComponentImage::new(ColorSpace::Gray, vec![component]);
        assert!(matches!(
            unpack(&image, 16),
            Err(TranscodeError::PrecisionMismatch {
                component: 0,
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn test_unsupported_bits_are_rejected() {
        for bits in [1u16, 4, 12, 24, 64] {
            let component = Component::new(2, 2, bits as u8, false, vec![0; 4]);
            let image = ComponentImage::new(ColorSpace::Gray, vec![component]);
            assert!(matches!(
                unpack(&image, bits),
                Err(TranscodeError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_layout_errors() {
        let empty = ComponentImage::new(ColorSpace::Gray, vec![]);
        assert!(matches!(unpack(&empty, 8), Err(TranscodeError::ComponentLayout(_))));

        let short = ComponentImage::new(
            ColorSpace::Gray,
            vec![Component::new(4, 4, 8, false, vec![0; 10])],
        );
        assert!(matches!(unpack(&short, 8), Err(TranscodeError::ComponentLayout(_))));

        let uneven = ComponentImage::new(
            ColorSpace::Srgb,
            vec![
                Component::new(4, 4, 8, false, vec![0; 16]),
                Component::new(2, 2, 8, false, vec![0; 4]),
                Component::new(4, 4, 8, false, vec![0; 16]),
            ],
        );
        assert!(matches!(unpack(&uneven, 8), Err(TranscodeError::ComponentLayout(_))));
    }
}

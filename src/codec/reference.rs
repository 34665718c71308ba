//! Reference JPEG 2000 engine.
//!
//! A pure Rust stand-in for an external wavelet codec. It writes a real J2K
//! main header (SOC, SIZ, COM, COD, QCD) and a single tile-part, but the tile
//! data is a simple per-component delta coding instead of an EBCOT bitstream.
//! It is enough to exercise the whole transcoding path without native
//! libraries; production deployments plug a real engine behind [`Engine`].

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::config::EncodeParameters;
use crate::error::{Result, TranscodeError};
use crate::pixel::{ColorSpace, Component, ComponentImage};

use super::engine::{DiagnosticSink, Engine, EngineEvent};
use super::format::CodestreamFormat;

const SOC: u16 = 0xFF4F;
const SIZ: u16 = 0xFF51;
const COD: u16 = 0xFF52;
const QCD: u16 = 0xFF5C;
const COM: u16 = 0xFF64;
const SOT: u16 = 0xFF90;
const SOD: u16 = 0xFF93;
const EOC: u16 = 0xFFD9;

/// Latin-1 text comment registration value.
const COMMENT_BINARY: u16 = 0;
const COMMENT_LATIN1: u16 = 1;

/// Header size of a single tile-part: SOT segment plus SOD marker.
const TILE_PART_HEADER_LEN: u32 = 14;

/// Pure Rust reference engine.
#[derive(Debug, Clone)]
pub struct ReferenceEngine {
    /// Decomposition levels advertised in the COD segment.
    pub decomposition_levels: u8,
}

impl ReferenceEngine {
    /// Create a reference engine with five decomposition levels.
    pub fn new() -> Self {
        Self {
            decomposition_levels: 5,
        }
    }
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn fail(sink: &dyn DiagnosticSink, message: String) -> TranscodeError {
    sink.on_event(EngineEvent::Error, &message);
    TranscodeError::Engine(message)
}

/// Right shift applied to samples for a lossy target ratio.
fn quantization_shift(ratio: f32, precision: u8) -> u8 {
    if ratio <= 1.0 {
        return 0;
    }
    ((ratio.log2() * 0.5) as u8).min(precision.saturating_sub(1))
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Big-endian reader over marker segments and tile data.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(TranscodeError::Engine(format!(
                "codestream truncated at byte {} (needed {} more)",
                self.pos, len
            )));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(TranscodeError::Engine("tile data holds an overlong sample".into()))
    }
}

/// Geometry read from the SIZ segment.
struct SizInfo {
    width: u32,
    height: u32,
    components: Vec<(u8, bool)>,
}

/// Locate the contiguous codestream box of a JP2 file.
fn find_codestream_box(data: &[u8]) -> Result<&[u8]> {
    let mut pos = 0usize;
    while data.len() - pos >= 8 {
        let lbox = BigEndian::read_u32(&data[pos..pos + 4]) as u64;
        let tbox = &data[pos + 4..pos + 8];
        let (header, box_len) = match lbox {
            0 => (8u64, (data.len() - pos) as u64),
            1 => {
                if data.len() - pos < 16 {
                    break;
                }
                (16u64, BigEndian::read_u64(&data[pos + 8..pos + 16]))
            }
            n => (8u64, n),
        };
        if box_len < header || box_len > (data.len() - pos) as u64 {
            return Err(TranscodeError::Engine(format!(
                "JP2 box at byte {} has invalid length {}",
                pos, box_len
            )));
        }
        if tbox == b"jp2c" {
            return Ok(&data[pos + header as usize..pos + box_len as usize]);
        }
        pos += box_len as usize;
    }
    Err(TranscodeError::Engine(
        "JP2 file has no contiguous codestream box".into(),
    ))
}

impl ReferenceEngine {
    fn check_image(&self, image: &ComponentImage) -> std::result::Result<(u32, u32), String> {
        let first = image
            .components
            .first()
            .ok_or_else(|| "image has no components".to_string())?;
        let (width, height) = (first.width, first.height);
        if width == 0 || height == 0 {
            return Err(format!("invalid image dimensions {}x{}", width, height));
        }
        if image.components.len() > 16384 {
            return Err(format!("too many components ({})", image.components.len()));
        }
        for (index, component) in image.components.iter().enumerate() {
            if component.width != width || component.height != height {
                return Err(format!("component {} differs in size", index));
            }
            if component.precision == 0 || component.precision > 38 {
                return Err(format!(
                    "component {} has unsupported precision {}",
                    index, component.precision
                ));
            }
            if component.data.len() != width as usize * height as usize {
                return Err(format!(
                    "component {} holds {} samples, expected {}",
                    index,
                    component.data.len(),
                    width as usize * height as usize
                ));
            }
        }
        Ok((width, height))
    }

    fn write_main_header(
        &self,
        out: &mut Vec<u8>,
        image: &ComponentImage,
        width: u32,
        height: u32,
        params: &EncodeParameters,
    ) -> Result<()> {
        out.write_u16::<BigEndian>(SOC)?;

        // SIZ: single tile covering the whole image, no subsampling.
        let components = image.components.len();
        out.write_u16::<BigEndian>(SIZ)?;
        out.write_u16::<BigEndian>((38 + 3 * components) as u16)?;
        out.write_u16::<BigEndian>(0)?;
        out.write_u32::<BigEndian>(width)?;
        out.write_u32::<BigEndian>(height)?;
        out.write_u32::<BigEndian>(0)?;
        out.write_u32::<BigEndian>(0)?;
        out.write_u32::<BigEndian>(width)?;
        out.write_u32::<BigEndian>(height)?;
        out.write_u32::<BigEndian>(0)?;
        out.write_u32::<BigEndian>(0)?;
        out.write_u16::<BigEndian>(components as u16)?;
        for component in &image.components {
            let sign = if component.signed { 0x80 } else { 0x00 };
            out.push(sign | (component.precision - 1));
            out.push(1);
            out.push(1);
        }

        if let Some(ref comment) = params.comment {
            out.write_u16::<BigEndian>(COM)?;
            out.write_u16::<BigEndian>((4 + comment.len()) as u16)?;
            let registration = if comment.is_ascii() {
                COMMENT_LATIN1
            } else {
                COMMENT_BINARY
            };
            out.write_u16::<BigEndian>(registration)?;
            out.extend_from_slice(comment.as_bytes());
        }

        let lossless = params.is_lossless();

        // COD: LRCP, 64x64 code-blocks, 5/3 when reversible.
        out.write_u16::<BigEndian>(COD)?;
        out.write_u16::<BigEndian>(12)?;
        out.push(0x00);
        out.push(0x00);
        out.write_u16::<BigEndian>(params.number_of_layers.min(u16::MAX as u32) as u16)?;
        out.push(0x00);
        out.push(self.decomposition_levels);
        out.push(0x04);
        out.push(0x04);
        out.push(0x00);
        out.push(if lossless { 0x01 } else { 0x00 });

        // QCD: two guard bits.
        out.write_u16::<BigEndian>(QCD)?;
        if lossless {
            out.write_u16::<BigEndian>(4)?;
            out.push(0x40);
            out.push(0x00);
        } else {
            out.write_u16::<BigEndian>(5)?;
            out.push(0x41);
            out.write_u16::<BigEndian>(0x0088)?;
        }

        Ok(())
    }

    fn encode_tile(&self, image: &ComponentImage, shift: u8) -> Vec<u8> {
        let samples: usize = image.components.iter().map(|c| c.data.len()).sum();
        let mut tile = Vec::with_capacity(1 + samples * 2);
        tile.push(shift);
        for component in &image.components {
            let mut previous = 0i64;
            for &value in &component.data {
                let quantized = value >> shift;
                write_varint(&mut tile, zigzag(quantized - previous));
                previous = quantized;
            }
        }
        tile
    }

    fn parse_siz(reader: &mut Reader<'_>) -> Result<SizInfo> {
        let length = reader.read_u16()? as usize;
        let segment = reader.take(length.saturating_sub(2))?;
        let mut siz = Reader::new(segment);
        let _rsiz = siz.read_u16()?;
        let xsiz = siz.read_u32()?;
        let ysiz = siz.read_u32()?;
        let xosiz = siz.read_u32()?;
        let yosiz = siz.read_u32()?;
        let _xtsiz = siz.read_u32()?;
        let _ytsiz = siz.read_u32()?;
        let _xtosiz = siz.read_u32()?;
        let _ytosiz = siz.read_u32()?;
        let csiz = siz.read_u16()? as usize;

        if xsiz <= xosiz || ysiz <= yosiz {
            return Err(TranscodeError::Engine("SIZ describes an empty image".into()));
        }

        let mut components = Vec::with_capacity(csiz);
        for index in 0..csiz {
            let ssiz = siz.read_u8()?;
            let xrsiz = siz.read_u8()?;
            let yrsiz = siz.read_u8()?;
            if xrsiz != 1 || yrsiz != 1 {
                return Err(TranscodeError::Engine(format!(
                    "component {} is subsampled ({}x{}), not supported",
                    index, xrsiz, yrsiz
                )));
            }
            components.push(((ssiz & 0x7F) + 1, ssiz & 0x80 != 0));
        }

        Ok(SizInfo {
            width: xsiz - xosiz,
            height: ysiz - yosiz,
            components,
        })
    }

    fn decode_codestream(&self, data: &[u8], sink: &dyn DiagnosticSink) -> Result<ComponentImage> {
        let mut reader = Reader::new(data);
        if reader.read_u16()? != SOC {
            return Err(TranscodeError::Engine("missing SOC marker".into()));
        }

        let mut siz: Option<SizInfo> = None;
        loop {
            let marker = reader.read_u16()?;
            match marker {
                SIZ => siz = Some(Self::parse_siz(&mut reader)?),
                COM => {
                    let length = reader.read_u16()? as usize;
                    let body = reader.take(length.saturating_sub(2))?;
                    if body.len() > 2 {
                        let text = String::from_utf8_lossy(&body[2..]);
                        sink.on_event(EngineEvent::Info, &format!("comment: {}", text));
                    }
                }
                SOT => break,
                m if m >> 8 == 0xFF => {
                    let length = reader.read_u16()? as usize;
                    reader.take(length.saturating_sub(2))?;
                }
                other => {
                    return Err(TranscodeError::Engine(format!(
                        "unexpected bytes {:#06x} in main header",
                        other
                    )));
                }
            }
        }

        let siz = siz.ok_or_else(|| TranscodeError::Engine("missing SIZ segment".into()))?;

        let _lsot = reader.read_u16()?;
        let tile_index = reader.read_u16()?;
        let psot = reader.read_u32()?;
        let _tpsot = reader.read_u8()?;
        let _tnsot = reader.read_u8()?;
        if tile_index != 0 {
            return Err(TranscodeError::Engine(format!(
                "expected tile 0, found tile {}",
                tile_index
            )));
        }
        if reader.read_u16()? != SOD {
            return Err(TranscodeError::Engine("missing SOD marker".into()));
        }

        let tile_len = if psot == 0 {
            reader.remaining().saturating_sub(2)
        } else {
            psot.checked_sub(TILE_PART_HEADER_LEN)
                .ok_or_else(|| TranscodeError::Engine(format!("invalid tile-part length {}", psot)))?
                as usize
        };
        let tile = reader.take(tile_len)?;

        if reader.remaining() < 2 || reader.read_u16()? != EOC {
            sink.on_event(EngineEvent::Warning, "codestream does not end with EOC");
        }

        let mut tile = Reader::new(tile);
        let shift = tile.read_u8()?;
        if shift >= 38 {
            return Err(TranscodeError::Engine(format!("invalid quantization shift {}", shift)));
        }

        // Every sample takes at least one varint byte.
        let samples = siz.width as usize * siz.height as usize;
        let needed = samples.checked_mul(siz.components.len());
        if needed.map_or(true, |n| n > tile.remaining()) {
            return Err(TranscodeError::Engine(format!(
                "SIZ declares {}x{} with {} components, tile holds {} bytes",
                siz.width,
                siz.height,
                siz.components.len(),
                tile.remaining()
            )));
        }

        let mut components = Vec::with_capacity(siz.components.len());
        for &(precision, signed) in &siz.components {
            let mut data = Vec::with_capacity(samples);
            let mut previous = 0i64;
            for _ in 0..samples {
                previous = previous.wrapping_add(unzigzag(tile.read_varint()?));
                data.push(previous.wrapping_shl(shift as u32));
            }
            components.push(Component::new(siz.width, siz.height, precision, signed, data));
        }

        let color_space = if components.len() == 3 {
            ColorSpace::Srgb
        } else {
            ColorSpace::Gray
        };
        Ok(ComponentImage::new(color_space, components))
    }
}

impl Engine for ReferenceEngine {
    fn compress(
        &self,
        image: &ComponentImage,
        params: &EncodeParameters,
        sink: &dyn DiagnosticSink,
    ) -> Result<Vec<u8>> {
        let (width, height) = self.check_image(image).map_err(|e| fail(sink, e))?;
        params.validate()?;

        let precision = image
            .components
            .iter()
            .map(|c| c.precision)
            .min()
            .unwrap_or(1);
        let shift = if params.is_lossless() {
            0
        } else {
            quantization_shift(params.effective_rate(), precision)
        };

        let mut codestream = Vec::new();
        self.write_main_header(&mut codestream, image, width, height, params)?;

        let tile = self.encode_tile(image, shift);
        let psot = u32::try_from(tile.len())
            .ok()
            .and_then(|len| len.checked_add(TILE_PART_HEADER_LEN))
            .ok_or_else(|| fail(sink, "tile data exceeds tile-part length field".into()))?;

        codestream.write_u16::<BigEndian>(SOT)?;
        codestream.write_u16::<BigEndian>(10)?;
        codestream.write_u16::<BigEndian>(0)?;
        codestream.write_u32::<BigEndian>(psot)?;
        codestream.push(0);
        codestream.push(1);
        codestream.write_u16::<BigEndian>(SOD)?;
        codestream.extend_from_slice(&tile);
        codestream.write_u16::<BigEndian>(EOC)?;

        sink.on_event(
            EngineEvent::Info,
            &format!(
                "encoded {}x{} image with {} components into {} bytes",
                width,
                height,
                image.components.len(),
                codestream.len()
            ),
        );

        Ok(codestream)
    }

    fn decompress(
        &self,
        data: &[u8],
        format: CodestreamFormat,
        sink: &dyn DiagnosticSink,
    ) -> Result<ComponentImage> {
        let codestream = match format {
            CodestreamFormat::RawCodestream => data,
            CodestreamFormat::BoxedContainer => {
                find_codestream_box(data).map_err(|e| fail(sink, e.to_string()))?
            }
        };

        self.decode_codestream(codestream, sink).map_err(|e| match e {
            TranscodeError::Engine(message) => fail(sink, message),
            other => other,
        })
    }

    fn name(&self) -> &'static str {
        "reference"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::codec::engine::RecordingSink;
    use crate::codec::format::{sniff, JP2_SIGNATURE};

    /// Wrap a raw codestream into a minimal JP2 file.
    pub(crate) fn wrap_in_jp2(codestream: &[u8]) -> Vec<u8> {
        let mut file = JP2_SIGNATURE.to_vec();
        file.extend_from_slice(&20u32.to_be_bytes());
        file.extend_from_slice(b"ftypjp2 ");
        file.extend_from_slice(&0u32.to_be_bytes());
        file.extend_from_slice(b"jp2 ");
        file.extend_from_slice(&(8 + codestream.len() as u32).to_be_bytes());
        file.extend_from_slice(b"jp2c");
        file.extend_from_slice(codestream);
        file
    }

    fn gradient(width: u32, height: u32, precision: u8, signed: bool) -> ComponentImage {
        let data = (0..(width * height) as i64)
            .map(|i| if signed { i * 37 - 500 } else { i * 37 })
            .collect();
        ComponentImage::new(
            ColorSpace::Gray,
            vec![Component::new(width, height, precision, signed, data)],
        )
    }

    #[test]
    fn test_codestream_structure() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let codestream = engine
            .compress(&gradient(8, 4, 16, false), &EncodeParameters::default(), &sink)
            .unwrap();

        assert_eq!(&codestream[..4], &[0xFF, 0x4F, 0xFF, 0x51]);
        assert_eq!(&codestream[codestream.len() - 2..], &[0xFF, 0xD9]);
        assert_eq!(sniff(&codestream), CodestreamFormat::RawCodestream);

        let comment = crate::config::DEFAULT_COMMENT.as_bytes();
        assert!(codestream.windows(comment.len()).any(|w| w == comment));
        assert_eq!(sink.count(EngineEvent::Info), 1);
    }

    #[test]
    fn test_lossless_roundtrip() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let image = gradient(13, 7, 16, true);
        let codestream = engine
            .compress(&image, &EncodeParameters::default(), &sink)
            .unwrap();
        let decoded = engine
            .decompress(&codestream, CodestreamFormat::RawCodestream, &sink)
            .unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_comment_is_reported_on_decode() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let params = EncodeParameters::default().with_comment("unit test");
        let codestream = engine.compress(&gradient(2, 2, 8, false), &params, &sink).unwrap();
        engine
            .decompress(&codestream, CodestreamFormat::RawCodestream, &sink)
            .unwrap();
        assert!(sink
            .events()
            .iter()
            .any(|(_, message)| message == "comment: unit test"));
    }

    #[test]
    fn test_boxed_container_decodes() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let image = gradient(5, 5, 8, false);
        let codestream = engine
            .compress(&image, &EncodeParameters::default(), &sink)
            .unwrap();
        let file = wrap_in_jp2(&codestream);

        assert_eq!(sniff(&file), CodestreamFormat::BoxedContainer);
        let decoded = engine
            .decompress(&file, CodestreamFormat::BoxedContainer, &sink)
            .unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_lossy_is_smaller_and_approximate() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let data = (0..1024i64).map(|i| i * 300).collect();
        let image = ComponentImage::new(
            ColorSpace::Gray,
            vec![Component::new(32, 32, 32, false, data)],
        );
        let lossless = engine
            .compress(&image, &EncodeParameters::default(), &sink)
            .unwrap();
        let lossy = engine
            .compress(&image, &EncodeParameters::lossy(256.0), &sink)
            .unwrap();
        assert!(lossy.len() < lossless.len());

        let decoded = engine
            .decompress(&lossy, CodestreamFormat::RawCodestream, &sink)
            .unwrap();
        for (original, restored) in image.components[0].data.iter().zip(&decoded.components[0].data) {
            assert!(original - restored >= 0 && original - restored < 16);
        }
    }

    #[test]
    fn test_malformed_input_fails_and_reports() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();

        let result = engine.decompress(&[0x12, 0x34, 0x56], CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        let codestream = engine
            .compress(&gradient(4, 4, 8, false), &EncodeParameters::default(), &sink)
            .unwrap();
        let truncated = &codestream[..codestream.len() - 6];
        let result = engine.decompress(truncated, CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        let result = engine.decompress(&JP2_SIGNATURE, CodestreamFormat::BoxedContainer, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        assert_eq!(sink.count(EngineEvent::Error), 3);
    }

    #[test]
    fn test_header_inconsistent_with_payload() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let codestream = engine
            .compress(&gradient(4, 4, 8, false), &EncodeParameters::default(), &sink)
            .unwrap();

        // SOC, SIZ marker, Lsiz, Rsiz, then Xsiz and Ysiz.
        let mut huge = codestream.clone();
        huge[8..16].copy_from_slice(&[0xFF; 8]);
        let result = engine.decompress(&huge, CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        let mut wide = codestream.clone();
        wide[8..12].copy_from_slice(&65536u32.to_be_bytes());
        wide[12..16].copy_from_slice(&65536u32.to_be_bytes());
        let result = engine.decompress(&wide, CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        // Csiz follows the eight u32 geometry fields.
        let mut components = codestream.clone();
        components[40..42].copy_from_slice(&u16::MAX.to_be_bytes());
        let result = engine.decompress(&components, CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        let sot = codestream
            .windows(2)
            .position(|w| w == [0xFF, 0x90])
            .unwrap();
        let mut long_tile = codestream.clone();
        long_tile[sot + 6..sot + 10].copy_from_slice(&u32::MAX.to_be_bytes());
        let result = engine.decompress(&long_tile, CodestreamFormat::RawCodestream, &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));

        assert_eq!(sink.count(EngineEvent::Error), 4);
    }

    #[test]
    fn test_non_ascii_comment_is_binary() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let image = gradient(2, 2, 8, false);

        let latin = engine
            .compress(&image, &EncodeParameters::default().with_comment("plain"), &sink)
            .unwrap();
        let utf8 = engine
            .compress(&image, &EncodeParameters::default().with_comment("gr\u{fc}n"), &sink)
            .unwrap();

        let registration = |codestream: &[u8]| {
            let com = codestream
                .windows(2)
                .position(|w| w == [0xFF, 0x64])
                .unwrap();
            u16::from_be_bytes([codestream[com + 4], codestream[com + 5]])
        };
        assert_eq!(registration(&latin), 1);
        assert_eq!(registration(&utf8), 0);
    }

    #[test]
    fn test_compress_rejects_inconsistent_image() {
        let engine = ReferenceEngine::new();
        let sink = RecordingSink::new();
        let image = ComponentImage::new(
            ColorSpace::Gray,
            vec![Component::new(4, 4, 8, false, vec![0; 3])],
        );
        let result = engine.compress(&image, &EncodeParameters::default(), &sink);
        assert!(matches!(result, Err(TranscodeError::Engine(_))));
        assert_eq!(sink.count(EngineEvent::Error), 1);
    }

    #[test]
    fn test_zigzag_extremes() {
        for value in [0i64, 1, -1, i32::MAX as i64, i32::MIN as i64, u32::MAX as i64] {
            assert_eq!(unzigzag(zigzag(value)), value);
        }
    }
}

//! Frame-sequence orchestration.
//!
//! [`Jpeg2000Codec`] turns a raster buffer into one fragment per slice and
//! back. A 2D image (depth 1) is a single pack/compress cycle; a volume is
//! treated as `depth` independent frames, each stored in its own fragment.

mod scheduler;

pub use scheduler::SliceScheduler;

use std::sync::Arc;

use dicom::core::Tag;

use crate::codec::{pack, sniff, unpack, DiagnosticSink, Engine, LogSink, ReferenceEngine};
use crate::config::{transfer_syntax, CodecConfig};
use crate::error::{Result, TranscodeError};
use crate::fragment::{Fragment, FragmentSequence, ITEM_START};
use crate::pixel::{Dimensions, PixelFormat};
use crate::progress::{NullProgress, ProgressHandler, ProgressPhase};

/// JPEG 2000 transcoder between raster buffers and fragment sequences.
pub struct Jpeg2000Codec {
    engine: Arc<dyn Engine>,
    config: CodecConfig,
    item_tag: Tag,
    sink: Arc<dyn DiagnosticSink>,
    progress: Arc<dyn ProgressHandler>,
}

impl Jpeg2000Codec {
    /// Create a codec using the reference engine.
    pub fn new(config: CodecConfig) -> Self {
        PipelineBuilder::new().config(config).build()
    }

    /// Codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Name of the underlying engine.
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Whether the transfer syntax can be decoded.
    pub fn can_decode(&self, ts: &str) -> bool {
        transfer_syntax::can_decode(ts)
    }

    /// Whether the transfer syntax can be produced.
    pub fn can_code(&self, ts: &str) -> bool {
        transfer_syntax::can_code(ts)
    }

    fn scheduler(&self) -> SliceScheduler {
        SliceScheduler::new(self.config.worker_threads())
    }

    /// Decode a fragment sequence into a raster buffer.
    ///
    /// With depth 1 all fragments are concatenated into one codestream. With
    /// depth above 1 every fragment is taken to hold exactly one slice, in
    /// order. Nothing in the pixel data guarantees this; a fragment count
    /// that differs from the depth is only logged unless
    /// `decode.strict_fragment_count` is set.
    pub fn decode(
        &self,
        fragments: &FragmentSequence,
        format: &PixelFormat,
        dims: &Dimensions,
    ) -> Result<Vec<u8>> {
        format.validate()?;
        dims.validate()?;
        dims.checked_total_len(format)?;
        let frame_len = dims.frame_len(format);

        if !dims.is_volume() {
            let codestream = fragments.to_contiguous();
            if codestream.is_empty() {
                return Err(TranscodeError::EmptyFragment { index: 0 });
            }
            let mut frames = self.scheduler().run(1, ProgressPhase::Decoding, self.progress.as_ref(), |index| {
                self.decode_frame(index, &codestream, format, frame_len)
            })?;
            return frames
                .pop()
                .ok_or_else(|| TranscodeError::InvariantViolation("no frame decoded".into()));
        }

        if fragments.len() != dims.depth as usize {
            if self.config.decode.strict_fragment_count {
                return Err(TranscodeError::FragmentCount {
                    fragments: fragments.len(),
                    depth: dims.depth,
                });
            }
            log::warn!(
                "{} fragments for {} slices, decoding one frame per fragment; \
                 output will be {} bytes instead of the {} the geometry describes",
                fragments.len(),
                dims.depth,
                frame_len.saturating_mul(fragments.len()),
                frame_len.saturating_mul(dims.depth as usize)
            );
        }

        if let Some(index) = fragments.iter().position(Fragment::is_empty) {
            return Err(TranscodeError::EmptyFragment { index });
        }

        let items = fragments.fragments();
        let frames = self.scheduler().run(items.len(), ProgressPhase::Decoding, self.progress.as_ref(), |index| {
            self.decode_frame(index, items[index].data(), format, frame_len)
        })?;

        let mut raster = Vec::with_capacity(frame_len * frames.len());
        for frame in frames {
            raster.extend_from_slice(&frame);
        }
        log::debug!("Decoded {} frames into {} bytes", items.len(), raster.len());
        Ok(raster)
    }

    /// Encode a raster buffer into one fragment per slice.
    ///
    /// Either every slice is encoded or an error is returned; no partial
    /// sequence is produced.
    pub fn encode(
        &self,
        raster: &[u8],
        format: &PixelFormat,
        dims: &Dimensions,
    ) -> Result<FragmentSequence> {
        format.validate()?;
        dims.validate()?;
        self.config.encode.validate()?;

        let expected = dims.checked_total_len(format)?;
        if raster.len() != expected {
            return Err(TranscodeError::ImageData(format!(
                "Pixel data size mismatch: expected {} bytes for {} ({} bits, {} samples), got {}",
                expected,
                dims,
                format.bits_allocated,
                format.samples_per_pixel,
                raster.len()
            )));
        }

        let slice_len = dims.frame_len(format);
        let depth = dims.depth as usize;
        let payloads = self.scheduler().run(depth, ProgressPhase::Encoding, self.progress.as_ref(), |index| {
            let slice = &raster[index * slice_len..(index + 1) * slice_len];
            self.encode_frame(index, slice, format, dims)
        })?;

        let sequence = FragmentSequence::from_payloads(self.item_tag, payloads);
        if sequence.len() != depth {
            return Err(TranscodeError::InvariantViolation(format!(
                "encoded {} fragments for {} slices",
                sequence.len(),
                depth
            )));
        }

        log::debug!(
            "Encoded {} slices of {} into {} bytes (ratio: {:.2}:1)",
            depth,
            dims,
            sequence.payload_len(),
            raster.len() as f64 / sequence.payload_len().max(1) as f64
        );
        Ok(sequence)
    }

    fn decode_frame(
        &self,
        index: usize,
        data: &[u8],
        format: &PixelFormat,
        frame_len: usize,
    ) -> Result<Vec<u8>> {
        let flavor = sniff(data);
        let image = self.engine.decompress(data, flavor, self.sink.as_ref())?;
        let raster = unpack(&image, format.bits_allocated)?;

        if raster.len() != frame_len {
            return Err(TranscodeError::FrameSize {
                index,
                expected: frame_len,
                actual: raster.len(),
            });
        }
        Ok(raster)
    }

    fn encode_frame(
        &self,
        index: usize,
        slice: &[u8],
        format: &PixelFormat,
        dims: &Dimensions,
    ) -> Result<Vec<u8>> {
        let image = pack(slice, dims.width, dims.height, format)?;
        let codestream = self
            .engine
            .compress(&image, &self.config.encode, self.sink.as_ref())?;

        if codestream.is_empty() {
            return Err(TranscodeError::Engine(format!(
                "engine {} produced an empty codestream for slice {}",
                self.engine.name(),
                index
            )));
        }
        Ok(codestream)
    }
}

impl Default for Jpeg2000Codec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// Builder for creating codecs with custom collaborators.
pub struct PipelineBuilder {
    engine: Arc<dyn Engine>,
    config: CodecConfig,
    item_tag: Tag,
    sink: Arc<dyn DiagnosticSink>,
    progress: Arc<dyn ProgressHandler>,
}

impl PipelineBuilder {
    /// Reference engine, default configuration, log sink, no progress.
    pub fn new() -> Self {
        Self {
            engine: Arc::new(ReferenceEngine::new()),
            config: CodecConfig::default(),
            item_tag: ITEM_START,
            sink: Arc::new(LogSink),
            progress: Arc::new(NullProgress),
        }
    }

    /// Set the codec configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the compression engine.
    pub fn engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    /// Set the tag given to produced fragments.
    pub fn item_tag(mut self, tag: Tag) -> Self {
        self.item_tag = tag;
        self
    }

    /// Set the receiver of engine diagnostics.
    pub fn sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set the progress handler.
    pub fn progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Build the codec.
    pub fn build(self) -> Jpeg2000Codec {
        Jpeg2000Codec {
            engine: self.engine,
            config: self.config,
            item_tag: self.item_tag,
            sink: self.sink,
            progress: self.progress,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

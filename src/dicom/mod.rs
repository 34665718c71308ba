//! DICOM file reading.
//!
//! Extracts the image geometry, pixel format and pixel data of a DICOM file so
//! that encapsulated JPEG 2000 pixel data can be handed to the codec.

use dicom::core::value::Value;
use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};
use serde::Serialize;

use crate::config::transfer_syntax;
use crate::error::{Result, TranscodeError};
use crate::fragment::{FragmentSequence, ITEM_START};
use crate::pixel::{Dimensions, PixelFormat};

/// Type alias for the DICOM object returned by open_file.
type DicomObject = DefaultDicomObject;

/// DICOM file wrapper with parsed metadata.
pub struct DicomFile {
    object: DicomObject,
    /// Extracted image metadata.
    pub metadata: DicomMetadata,
}

/// Image attributes relevant to pixel data transcoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DicomMetadata {
    /// SOP Instance UID.
    pub sop_instance_uid: Option<String>,
    /// Transfer syntax UID of the data set.
    pub transfer_syntax: String,
    /// Image width (columns).
    pub width: u32,
    /// Image height (rows).
    pub height: u32,
    /// Bits allocated per sample.
    pub bits_allocated: u16,
    /// Bits stored per sample.
    pub bits_stored: u16,
    /// Samples per pixel (1 = grayscale, 3 = RGB).
    pub samples_per_pixel: u16,
    /// Photometric interpretation (e.g., MONOCHROME2, RGB).
    pub photometric_interpretation: String,
    /// Pixel representation (0 = unsigned, 1 = signed).
    pub pixel_representation: u16,
    /// Number of frames.
    pub number_of_frames: u32,
}

impl DicomMetadata {
    /// Pixel format described by the image pixel module.
    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::new(
            self.bits_allocated,
            self.samples_per_pixel,
            self.pixel_representation,
        )
    }

    /// Image geometry, with one slice per frame.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height, self.number_of_frames.max(1))
    }

    /// Whether the pixel data is JPEG 2000 encoded.
    pub fn is_jpeg2000(&self) -> bool {
        transfer_syntax::can_decode(&self.transfer_syntax)
    }
}

impl DicomFile {
    /// Open and parse a DICOM file.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let object = open_file(path)?;
        let metadata = Self::extract_metadata(&object)?;

        log::debug!(
            "Opened DICOM file: {}x{}x{}, transfer syntax {}",
            metadata.width,
            metadata.height,
            metadata.number_of_frames,
            metadata.transfer_syntax
        );

        Ok(Self { object, metadata })
    }

    fn extract_metadata(obj: &DicomObject) -> Result<DicomMetadata> {
        let get_string = |tag: Tag| -> Option<String> {
            obj.element(tag)
                .ok()
                .and_then(|e| e.to_str().ok())
                .map(|s| s.trim().to_string())
        };

        let get_u16 = |tag: Tag| -> Option<u16> {
            obj.element(tag).ok().and_then(|e| e.to_int::<u16>().ok())
        };

        let get_u32 = |tag: Tag| -> Option<u32> {
            obj.element(tag).ok().and_then(|e| e.to_int::<u32>().ok())
        };

        let width = get_u16(tags::COLUMNS)
            .ok_or_else(|| TranscodeError::Dicom("Missing Columns tag".into()))? as u32;

        let height = get_u16(tags::ROWS)
            .ok_or_else(|| TranscodeError::Dicom("Missing Rows tag".into()))? as u32;

        let bits_allocated = get_u16(tags::BITS_ALLOCATED)
            .ok_or_else(|| TranscodeError::Dicom("Missing BitsAllocated tag".into()))?;

        let bits_stored = get_u16(tags::BITS_STORED).unwrap_or(bits_allocated);

        let samples_per_pixel = get_u16(tags::SAMPLES_PER_PIXEL).unwrap_or(1);

        let photometric_interpretation = get_string(tags::PHOTOMETRIC_INTERPRETATION)
            .unwrap_or_else(|| "MONOCHROME2".into());

        let pixel_representation = get_u16(tags::PIXEL_REPRESENTATION).unwrap_or(0);

        // IS-valued; some writers store it as binary.
        let number_of_frames = get_string(tags::NUMBER_OF_FRAMES)
            .and_then(|s| s.parse::<u32>().ok())
            .or_else(|| get_u32(tags::NUMBER_OF_FRAMES))
            .unwrap_or(1);

        let transfer_syntax = obj
            .meta()
            .transfer_syntax()
            .trim_end_matches('\0')
            .to_string();

        Ok(DicomMetadata {
            sop_instance_uid: get_string(tags::SOP_INSTANCE_UID),
            transfer_syntax,
            width,
            height,
            bits_allocated,
            bits_stored,
            samples_per_pixel,
            photometric_interpretation,
            pixel_representation,
            number_of_frames,
        })
    }

    /// Pixel format of the image.
    pub fn pixel_format(&self) -> PixelFormat {
        self.metadata.pixel_format()
    }

    /// Geometry of the image.
    pub fn dimensions(&self) -> Dimensions {
        self.metadata.dimensions()
    }

    /// Encapsulated pixel data fragments, offset table excluded.
    pub fn fragments(&self) -> Result<FragmentSequence> {
        let element = self
            .object
            .element(tags::PIXEL_DATA)
            .map_err(|_| TranscodeError::Dicom("Missing PixelData element".into()))?;

        match element.value() {
            Value::PixelSequence(sequence) => Ok(FragmentSequence::from_payloads(
                ITEM_START,
                sequence.fragments().iter().cloned(),
            )),
            _ => Err(TranscodeError::Dicom(format!(
                "PixelData is not encapsulated (transfer syntax {})",
                self.metadata.transfer_syntax
            ))),
        }
    }

    /// Native (unencapsulated) pixel data bytes.
    pub fn native_pixel_data(&self) -> Result<Vec<u8>> {
        let element = self
            .object
            .element(tags::PIXEL_DATA)
            .map_err(|_| TranscodeError::Dicom("Missing PixelData element".into()))?;

        if let Value::PixelSequence(_) = element.value() {
            return Err(TranscodeError::Dicom(
                "PixelData is encapsulated, decode it first".into(),
            ));
        }

        let bytes = element
            .to_bytes()
            .map_err(|e| TranscodeError::Dicom(format!("Failed to extract pixel data: {}", e)))?;

        Ok(bytes.to_vec())
    }

    /// Get the underlying DICOM object.
    pub fn inner(&self) -> &DicomObject {
        &self.object
    }
}

/// Utility functions for DICOM operations.
pub mod utils {
    use super::*;

    /// Expected native pixel data size from metadata.
    pub fn calculate_pixel_data_size(metadata: &DicomMetadata) -> usize {
        metadata.dimensions().total_len(&metadata.pixel_format())
    }

    /// Get human-readable name for transfer syntax.
    pub fn transfer_syntax_name(ts: &str) -> &'static str {
        match ts.trim_end_matches('\0') {
            "1.2.840.10008.1.2" => "Implicit VR Little Endian",
            "1.2.840.10008.1.2.1" => "Explicit VR Little Endian",
            "1.2.840.10008.1.2.2" => "Explicit VR Big Endian",
            transfer_syntax::JPEG_2000_LOSSLESS => "JPEG 2000 Lossless",
            transfer_syntax::JPEG_2000_LOSSY => "JPEG 2000",
            _ => "Unknown",
        }
    }
}

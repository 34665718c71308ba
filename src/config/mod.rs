//! Configuration types for encoding policy, decoding options and the codec.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranscodeError};

/// Comment embedded in every produced codestream unless overridden.
pub const DEFAULT_COMMENT: &str = concat!("Created by medimg_j2k version ", env!("CARGO_PKG_VERSION"));

/// Parameters handed to the compression engine for each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeParameters {
    /// Only produce reversible (lossless) codestreams.
    pub lossless_only: bool,
    /// Number of quality layers.
    pub number_of_layers: u32,
    /// Text comment written to the codestream.
    pub comment: Option<String>,
    /// Target compression ratio; ignored while `lossless_only` is set.
    pub target_ratio: Option<f32>,
}

impl Default for EncodeParameters {
    fn default() -> Self {
        Self {
            lossless_only: true,
            number_of_layers: 1,
            comment: Some(DEFAULT_COMMENT.to_string()),
            target_ratio: None,
        }
    }
}

impl EncodeParameters {
    /// Lossless, single layer, default comment.
    pub fn lossless() -> Self {
        Self::default()
    }

    /// Lossy with the given target ratio.
    pub fn lossy(ratio: f32) -> Self {
        Self {
            lossless_only: false,
            target_ratio: Some(ratio),
            ..Default::default()
        }
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the number of quality layers.
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.number_of_layers = layers;
        self
    }

    /// Rate of the first layer; 0 means lossless.
    pub fn effective_rate(&self) -> f32 {
        if self.lossless_only {
            return 0.0;
        }
        self.target_ratio.unwrap_or(0.0)
    }

    /// Whether the engine must produce a lossless codestream.
    pub fn is_lossless(&self) -> bool {
        self.effective_rate() <= 1.0
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.number_of_layers == 0 {
            return Err(TranscodeError::Config(
                "number_of_layers must be at least 1".into(),
            ));
        }
        if let Some(ratio) = self.target_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                return Err(TranscodeError::Config(format!(
                    "target_ratio must be positive, got {}",
                    ratio
                )));
            }
        }
        if let Some(ref comment) = self.comment {
            if comment.len() > u16::MAX as usize - 4 {
                return Err(TranscodeError::Config("comment is too long".into()));
            }
        }
        Ok(())
    }
}

/// Options controlling the multi-frame decode path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Reject sequences whose fragment count differs from the depth.
    ///
    /// One fragment per slice is a convention nothing in the pixel data
    /// verifies; by default a mismatch is only logged.
    pub strict_fragment_count: bool,
}

/// Full codec configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Encode policy.
    pub encode: EncodeParameters,
    /// Decode options.
    pub decode: DecodeOptions,
    /// Worker threads for per-slice work (0 = one per CPU).
    pub threads: usize,
}

impl CodecConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CodecConfig = toml::from_str(text)?;
        config.encode.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Number of worker threads actually used.
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Transfer syntax UIDs for DICOM.
pub mod transfer_syntax {
    /// JPEG 2000 Lossless
    pub const JPEG_2000_LOSSLESS: &str = "1.2.840.10008.1.2.4.90";
    /// JPEG 2000 Lossy
    pub const JPEG_2000_LOSSY: &str = "1.2.840.10008.1.2.4.91";

    fn normalize(ts: &str) -> &str {
        ts.trim_end_matches('\0').trim()
    }

    /// Whether this codec decodes the transfer syntax.
    pub fn can_decode(ts: &str) -> bool {
        matches!(normalize(ts), JPEG_2000_LOSSLESS | JPEG_2000_LOSSY)
    }

    /// Whether this codec encodes to the transfer syntax.
    pub fn can_code(ts: &str) -> bool {
        matches!(normalize(ts), JPEG_2000_LOSSLESS | JPEG_2000_LOSSY)
    }
}

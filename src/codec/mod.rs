//! JPEG 2000 codec building blocks.
//!
//! This module provides:
//! - Codestream flavor detection ([`sniff`])
//! - Raster/component conversion ([`pack`], [`unpack`])
//! - The [`Engine`] boundary to the wavelet codec, and a pure Rust
//!   [`ReferenceEngine`] implementing it

mod engine;
mod format;
mod pack;
mod reference;
mod unpack;

pub use engine::{DiagnosticSink, Engine, EngineEvent, LogSink, RecordingSink};
pub use format::{sniff, CodestreamFormat, JP2_SIGNATURE};
pub use pack::pack;
pub use reference::ReferenceEngine;
pub use unpack::unpack;

#[cfg(test)]
pub(crate) use reference::tests::wrap_in_jp2;

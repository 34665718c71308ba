//! Compression engine boundary and diagnostic forwarding.

use std::sync::Mutex;

use crate::config::EncodeParameters;
use crate::error::Result;
use crate::pixel::ComponentImage;

use super::format::CodestreamFormat;

/// Severity of an event reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine failed.
    Error,
    /// Recoverable anomaly.
    Warning,
    /// Informational message.
    Info,
}

/// Receives engine events for the duration of one engine call.
pub trait DiagnosticSink: Send + Sync {
    /// Called for each event the engine reports.
    fn on_event(&self, event: EngineEvent, message: &str);
}

/// Forwards engine events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn on_event(&self, event: EngineEvent, message: &str) {
        match event {
            EngineEvent::Error => log::error!("Error in JPEG 2000 engine: {}", message),
            EngineEvent::Warning => log::warn!("Warning in JPEG 2000 engine: {}", message),
            EngineEvent::Info => log::debug!("Info in JPEG 2000 engine: {}", message),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(EngineEvent, String)>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<(EngineEvent, String)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of events with the given severity.
    pub fn count(&self, event: EngineEvent) -> usize {
        self.events().iter().filter(|(e, _)| *e == event).count()
    }
}

impl DiagnosticSink for RecordingSink {
    fn on_event(&self, event: EngineEvent, message: &str) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push((event, message.to_string()));
    }
}

/// An external JPEG 2000 compression engine.
///
/// Implementations only turn one component image into one codestream and
/// back; geometry, bit depth and frame handling stay in the caller.
pub trait Engine: Send + Sync {
    /// Compress one frame into a raw J2K codestream.
    fn compress(
        &self,
        image: &ComponentImage,
        params: &EncodeParameters,
        sink: &dyn DiagnosticSink,
    ) -> Result<Vec<u8>>;

    /// Decompress one codestream of the given flavor.
    fn decompress(
        &self,
        data: &[u8],
        format: CodestreamFormat,
        sink: &dyn DiagnosticSink,
    ) -> Result<ComponentImage>;

    /// Human-readable engine name.
    fn name(&self) -> &'static str;
}

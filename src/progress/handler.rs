//! Progress handler trait and related types.

use crate::error::TranscodeError;

/// Phase of a codec operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Decompressing fragments into raster slices.
    Decoding,
    /// Compressing raster slices into fragments.
    Encoding,
    /// Operation completed successfully.
    Complete,
    /// Operation failed.
    Failed,
}

impl ProgressPhase {
    /// Get a human-readable description of the phase.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Decoding => "Decoding",
            Self::Encoding => "Encoding",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Check if this is a terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for ProgressPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Progress event emitted as slices are processed.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Current phase of operation.
    pub phase: ProgressPhase,

    /// Slice the event refers to, if any.
    pub frame: Option<usize>,

    /// Number of slices in the operation.
    pub total_frames: usize,

    /// Number of slices completed so far.
    pub completed_frames: usize,

    /// Overall progress (0.0 to 1.0).
    pub overall_progress: f64,

    /// Bytes produced so far.
    pub bytes_processed: u64,

    /// Status message.
    pub message: String,
}

impl Default for ProgressEvent {
    fn default() -> Self {
        Self {
            phase: ProgressPhase::Encoding,
            frame: None,
            total_frames: 0,
            completed_frames: 0,
            overall_progress: 0.0,
            bytes_processed: 0,
            message: String::new(),
        }
    }
}

impl ProgressEvent {
    /// Create a new progress event for a specific phase.
    pub fn new(phase: ProgressPhase) -> Self {
        Self {
            phase,
            message: phase.description().into(),
            ..Default::default()
        }
    }

    /// A slice finished.
    pub fn frame_done(phase: ProgressPhase, frame: usize, bytes: u64) -> Self {
        Self {
            phase,
            frame: Some(frame),
            bytes_processed: bytes,
            message: format!("{} frame {}", phase.description(), frame),
            ..Default::default()
        }
    }

    /// Create a completion event.
    pub fn complete(total_frames: usize, total_bytes: u64) -> Self {
        Self {
            phase: ProgressPhase::Complete,
            total_frames,
            completed_frames: total_frames,
            overall_progress: 1.0,
            bytes_processed: total_bytes,
            message: format!("Completed {} frames", total_frames),
            ..Default::default()
        }
    }

    /// Create a failure event.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            phase: ProgressPhase::Failed,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set frame counters.
    pub fn with_frame_progress(mut self, completed: usize, total: usize) -> Self {
        self.completed_frames = completed;
        self.total_frames = total;
        if total > 0 {
            self.overall_progress = completed as f64 / total as f64;
        }
        self
    }
}

impl std::fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.total_frames > 0 {
            write!(
                f,
                "[{}/{}] {}: {}",
                self.completed_frames, self.total_frames, self.phase, self.message
            )
        } else {
            write!(f, "{}: {}", self.phase, self.message)
        }
    }
}

/// Trait for handling progress updates during encode and decode.
///
/// Handlers are shared between worker threads, so events for different
/// slices may arrive out of order.
pub trait ProgressHandler: Send + Sync {
    /// Called when progress is updated.
    fn on_progress(&self, event: &ProgressEvent);

    /// Called when a slice fails.
    fn on_error(&self, error: &TranscodeError, frame: Option<usize>) {
        let _ = (error, frame);
    }

    /// Check if operation should be cancelled.
    ///
    /// Checked before each slice starts; slices already running finish.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A no-op progress handler that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressHandler for NullProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_phase_display() {
        assert_eq!(ProgressPhase::Encoding.to_string(), "Encoding");
        assert_eq!(ProgressPhase::Complete.to_string(), "Complete");
    }

    #[test]
    fn test_progress_phase_is_terminal() {
        assert!(ProgressPhase::Complete.is_terminal());
        assert!(ProgressPhase::Failed.is_terminal());
        assert!(!ProgressPhase::Decoding.is_terminal());
    }

    #[test]
    fn test_frame_done_event() {
        let event = ProgressEvent::frame_done(ProgressPhase::Decoding, 3, 512)
            .with_frame_progress(4, 8);

        assert_eq!(event.frame, Some(3));
        assert_eq!(event.bytes_processed, 512);
        assert!((event.overall_progress - 0.5).abs() < 0.001);
        assert!(event.to_string().contains("[4/8]"));
    }

    #[test]
    fn test_null_progress_never_cancels() {
        let progress = NullProgress;
        progress.on_progress(&ProgressEvent::complete(2, 100));
        progress.on_error(&TranscodeError::Cancelled, Some(1));
        assert!(!progress.is_cancelled());
    }
}

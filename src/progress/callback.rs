//! Callback-based progress reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::TranscodeError;

use super::handler::{ProgressEvent, ProgressHandler};

/// A progress handler that invokes a callback function.
///
/// ```rust,ignore
/// use medimg_j2k::progress::CallbackProgress;
///
/// let progress = CallbackProgress::new(|event| println!("{}", event));
/// progress.cancel(); // remaining slices are not started
/// ```
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
    error_callback: Option<Arc<dyn Fn(&TranscodeError, Option<usize>) + Send + Sync>>,
    cancelled: AtomicBool,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    /// Create a new callback progress handler.
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            error_callback: None,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Set an error callback.
    pub fn on_error<E>(mut self, callback: E) -> Self
    where
        E: Fn(&TranscodeError, Option<usize>) + Send + Sync + 'static,
    {
        self.error_callback = Some(Arc::new(callback));
        self
    }

    /// Request cancellation of the current operation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Reset the cancellation flag.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

impl<F> ProgressHandler for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        (self.callback)(event.clone());
    }

    fn on_error(&self, error: &TranscodeError, frame: Option<usize>) {
        if let Some(ref callback) = self.error_callback {
            callback(error, frame);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_callback_progress_new() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();

        let progress = CallbackProgress::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        progress.on_progress(&ProgressEvent::default());
        progress.on_progress(&ProgressEvent::default());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_callback_progress_with_error_handler() {
        let error_count = Arc::new(AtomicUsize::new(0));
        let error_count_clone = error_count.clone();

        let progress = CallbackProgress::new(|_| {}).on_error(move |_, frame| {
            assert_eq!(frame, Some(2));
            error_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        ProgressHandler::on_error(&progress, &TranscodeError::EmptyFragment { index: 2 }, Some(2));
        assert_eq!(error_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_progress_cancellation() {
        let progress = CallbackProgress::new(|_| {});

        assert!(!progress.is_cancelled());
        progress.cancel();
        assert!(progress.is_cancelled());
        progress.reset();
        assert!(!progress.is_cancelled());
    }
}

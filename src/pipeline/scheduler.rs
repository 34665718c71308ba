//! Per-slice work scheduling using Rayon.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{Result, TranscodeError};
use crate::progress::{ProgressEvent, ProgressHandler, ProgressPhase};

/// Runs independent per-slice jobs on a bounded thread pool.
///
/// Results are returned in slice order regardless of completion order. The
/// first failing slice fails the whole run; no partial result is returned.
#[derive(Debug, Clone)]
pub struct SliceScheduler {
    num_threads: usize,
}

impl SliceScheduler {
    /// Create a new scheduler with the specified number of threads.
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
        }
    }

    /// Get the number of threads.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Run `work` for every slice index in `0..count`.
    pub fn run<F>(
        &self,
        count: usize,
        phase: ProgressPhase,
        progress: &dyn ProgressHandler,
        work: F,
    ) -> Result<Vec<Vec<u8>>>
    where
        F: Fn(usize) -> Result<Vec<u8>> + Send + Sync,
    {
        let completed = AtomicUsize::new(0);

        let job = |index: usize| -> Result<Vec<u8>> {
            if progress.is_cancelled() {
                return Err(TranscodeError::Cancelled);
            }

            match work(index) {
                Ok(bytes) => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.on_progress(
                        &ProgressEvent::frame_done(phase, index, bytes.len() as u64)
                            .with_frame_progress(done, count),
                    );
                    Ok(bytes)
                }
                Err(e) => {
                    progress.on_error(&e, Some(index));
                    Err(e)
                }
            }
        };

        let result = if self.num_threads == 1 || count <= 1 {
            (0..count).map(job).collect::<Result<Vec<_>>>()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.num_threads.min(count))
                .build()
                .map_err(|e| TranscodeError::Config(format!("failed to create thread pool: {}", e)))?;

            pool.install(|| (0..count).into_par_iter().map(&job).collect::<Result<Vec<_>>>())
        };

        match result {
            Ok(outputs) => {
                let total_bytes = outputs.iter().map(|o| o.len() as u64).sum();
                progress.on_progress(&ProgressEvent::complete(count, total_bytes));
                Ok(outputs)
            }
            Err(e) => {
                progress.on_progress(&ProgressEvent::failed(e.to_string()));
                Err(e)
            }
        }
    }
}

impl Default for SliceScheduler {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

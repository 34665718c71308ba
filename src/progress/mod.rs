//! Progress reporting and cancellation for multi-frame operations.
//!
//! Handlers receive one event per finished slice and are asked before each
//! slice whether the operation should stop.

mod callback;
mod handler;

pub use callback::CallbackProgress;
pub use handler::{NullProgress, ProgressEvent, ProgressHandler, ProgressPhase};

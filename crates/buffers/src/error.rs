//! Buffer error types
//!
//! Background loops never propagate errors to producers; the only
//! producer-visible failure signal is the boolean result of `add`. These
//! variants classify failures for logging and internal control flow.

use std::io;
use thiserror::Error;

/// Failures inside an operation buffer
#[derive(Debug, Error)]
pub enum BufferError {
    /// File buffer I/O failed; isolated to the current tick and retried
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Working queue is full and no file buffer is configured
    #[error("working queue full and no file buffer configured")]
    CapacityExceeded,

    /// The downstream sink reported unavailable
    #[error("sink unavailable")]
    Unavailable,

    /// The injected process operation rejected the batch
    #[error("process rejected batch of {count} items")]
    ProcessFailed {
        /// Number of items in the rejected batch
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_wraps_source() {
        let err = BufferError::from(io::Error::new(io::ErrorKind::Other, "disk gone"));
        assert!(err.to_string().contains("disk gone"));
    }

    #[test]
    fn test_process_failed_names_count() {
        let err = BufferError::ProcessFailed { count: 42 };
        assert!(err.to_string().contains("42"));
    }
}

//! Basin - Operation Buffers
//!
//! Write-path buffering for a slow, unavailable, or overloaded downstream
//! sink: a bounded in-memory working queue backed by a paged on-disk
//! overflow store (store-and-forward), with backpressure, retry, and
//! shutdown recovery.
//!
//! # Architecture
//!
//! ```text
//! [producers] --add()--> [ItemQueue] --process loop--> [sink]
//!                  |          ^
//!                  | (full)   | read loop
//!                  v          |
//!              [FileBuffer pages on disk]
//! ```
//!
//! - `ItemQueue` - fixed-capacity in-memory FIFO; the fast path
//! - `FileBuffer` - paged on-disk overflow store with delimited records
//! - `OperationBuffer` - orchestrator running the process and read loops
//! - `BufferProvider` - registry of running buffers for lookup, metrics
//!   aggregation, and shutdown
//!
//! # Guarantees
//!
//! - `add` never blocks; backpressure is structural (excess load goes to
//!   bounded disk pages), not blocking
//! - FIFO delivery per buffer; overflowed items replay in write order
//! - at-least-once delivery; a failed batch retries unchanged until the
//!   sink consumes it
//! - on shutdown, resident queue items are flushed to a recovery page band
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use basin_buffers::{buffer_id, OperationBuffer, OperationKind};
//! use basin_config::BufferConfig;
//!
//! let config = BufferConfig::default().with_file_buffer();
//! let buffer = OperationBuffer::new(
//!     buffer_id("driver-a", OperationKind::Publish),
//!     config,
//!     Arc::new(handler),
//! );
//! buffer.start();
//!
//! buffer.add(operation);
//!
//! // on shutdown
//! buffer.stop().await;
//! ```

mod error;
mod file_buffer;
mod handler;
mod item_queue;
mod operation_buffer;
mod provider;

pub use error::BufferError;
pub use file_buffer::{
    page_filename, FileBuffer, PageRead, FIRST_PAGE_SEQUENCE, FIRST_RECOVERY_PAGE_SEQUENCE,
    PAGE_DELIMITER,
};
pub use handler::{ItemCodec, OperationHandler};
pub use item_queue::ItemQueue;
pub use operation_buffer::{FileBufferStatus, OperationBuffer};
pub use provider::{buffer_id, BufferProvider, ManagedBuffer, OperationKind};

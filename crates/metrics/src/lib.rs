//! Basin - Metrics
//!
//! Live metrics and snapshots for operation buffers.
//!
//! # Overview
//!
//! This crate provides:
//! - Atomic metric structs mutated by the owning buffer and its sampler
//! - Immutable snapshot structs for external observers
//! - A fixed-window moving average used for rate sampling
//!
//! # Design Principles
//!
//! - **Lock-free**: All metrics use atomic operations
//! - **Low overhead**: No allocations during metric updates
//! - **Snapshot-based**: Observers read a point-in-time copy, never the
//!   live struct
//!
//! # Example
//!
//! ```
//! use basin_metrics::BufferMetrics;
//!
//! let metrics = BufferMetrics::new("driver-a:publish", 25000);
//! metrics.queue.record_added(10);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.queue.item_count, 10);
//! assert_eq!(snapshot.queue.item_limit, 25000);
//! ```

mod buffer;
mod moving;

pub use buffer::{
    now_millis, BufferMetrics, BufferMetricsSnapshot, FileBufferMetrics,
    FileBufferMetricsSnapshot, QueueMetrics, QueueMetricsSnapshot,
};
pub use moving::MovingAverage;

//! Live operation buffer metrics
//!
//! One `BufferMetrics` instance per buffer, mutated only by the owning buffer
//! and its rate sampler. All counters use relaxed atomics; external observers
//! read an immutable `BufferMetricsSnapshot` and never touch the live struct.
//!
//! Rates are fractional (items/sec averaged over the sampler window) and are
//! stored as `f64` bit patterns in `AtomicU64`.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Current epoch milliseconds
#[inline]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Metrics for a single operation buffer
///
/// Composed of a working-queue section and a file-buffer section, matching
/// the two data paths of the buffer.
#[derive(Debug)]
pub struct BufferMetrics {
    /// Buffer identifier (set once at construction)
    buffer_id: String,

    /// When the buffer was started (epoch ms, 0 = never)
    start_time: AtomicU64,

    /// When the buffer was stopped (epoch ms, 0 = running or never started)
    stop_time: AtomicU64,

    /// Working queue metrics
    pub queue: QueueMetrics,

    /// File buffer metrics
    pub file_buffer: FileBufferMetrics,
}

impl BufferMetrics {
    /// Create metrics for a buffer with the given queue limit
    pub fn new(buffer_id: impl Into<String>, item_limit: u64) -> Self {
        let metrics = Self {
            buffer_id: buffer_id.into(),
            start_time: AtomicU64::new(0),
            stop_time: AtomicU64::new(0),
            queue: QueueMetrics::new(),
            file_buffer: FileBufferMetrics::new(),
        };
        metrics.queue.item_limit.store(item_limit, Ordering::Relaxed);
        metrics
    }

    /// Get the buffer identifier
    pub fn buffer_id(&self) -> &str {
        &self.buffer_id
    }

    /// Record buffer start
    pub fn mark_started(&self) {
        let now = now_millis();
        self.start_time.store(now, Ordering::Relaxed);
        self.stop_time.store(0, Ordering::Relaxed);
        self.queue.last_updated.store(now, Ordering::Relaxed);
        self.file_buffer.last_updated.store(now, Ordering::Relaxed);
    }

    /// Record buffer stop
    pub fn mark_stopped(&self) {
        let now = now_millis();
        self.stop_time.store(now, Ordering::Relaxed);
        self.queue.last_updated.store(now, Ordering::Relaxed);
        self.file_buffer.last_updated.store(now, Ordering::Relaxed);
    }

    /// Get a point-in-time snapshot of all metrics
    pub fn snapshot(&self) -> BufferMetricsSnapshot {
        BufferMetricsSnapshot {
            buffer_id: self.buffer_id.clone(),
            start_time: self.start_time.load(Ordering::Relaxed),
            stop_time: self.stop_time.load(Ordering::Relaxed),
            queue: self.queue.snapshot(),
            file_buffer: self.file_buffer.snapshot(),
        }
    }
}

/// Working-queue section of the buffer metrics
#[derive(Debug, Default)]
pub struct QueueMetrics {
    /// Items currently resident in the queue
    item_count: AtomicI64,

    /// Configured queue capacity
    item_limit: AtomicU64,

    /// Total items ever accepted into the queue (monotonic)
    total_item_count: AtomicU64,

    /// Sampled item rate (f64 bits, items/sec)
    item_rate: AtomicU64,

    /// Whether the process loop is actively draining
    is_active: AtomicBool,

    /// Last mutation time (epoch ms)
    last_updated: AtomicU64,
}

impl QueueMetrics {
    /// Create new metrics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record items accepted into the queue
    #[inline]
    pub fn record_added(&self, count: u64) {
        self.item_count.fetch_add(count as i64, Ordering::Relaxed);
        self.total_item_count.fetch_add(count, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Record items removed after successful processing
    #[inline]
    pub fn record_removed(&self, count: u64) {
        self.item_count.fetch_sub(count as i64, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Set the drain-active flag
    #[inline]
    pub fn set_active(&self, active: bool) {
        self.is_active.store(active, Ordering::Relaxed);
    }

    /// Publish a sampled item rate
    #[inline]
    pub fn set_item_rate(&self, rate: f64) {
        self.item_rate.store(rate.to_bits(), Ordering::Relaxed);
    }

    /// Total items ever accepted (monotonic; sampled by the rate loop)
    #[inline]
    pub fn total_item_count(&self) -> u64 {
        self.total_item_count.load(Ordering::Relaxed)
    }

    /// Take a snapshot of current values
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            item_count: self.item_count.load(Ordering::Relaxed).max(0),
            item_limit: self.item_limit.load(Ordering::Relaxed),
            total_item_count: self.total_item_count.load(Ordering::Relaxed),
            item_rate: f64::from_bits(self.item_rate.load(Ordering::Relaxed)),
            is_active: self.is_active.load(Ordering::Relaxed),
            last_updated: self.last_updated.load(Ordering::Relaxed),
        }
    }
}

/// File-buffer section of the buffer metrics
#[derive(Debug, Default)]
pub struct FileBufferMetrics {
    /// Whether file buffering is configured for this buffer
    is_enabled: AtomicBool,

    /// Configured page size limit in bytes
    page_size: AtomicU64,

    /// Whether the read loop currently has a page open
    is_read_active: AtomicBool,

    /// Whether a write stream is currently open
    is_write_active: AtomicBool,

    /// Page sequence currently being read (0 = none)
    read_page_sequence: AtomicU64,

    /// Page sequence currently being written (0 = none)
    write_page_sequence: AtomicU64,

    /// Total items read back from pages (monotonic)
    total_read_count: AtomicU64,

    /// Total bytes read back from pages (monotonic)
    total_bytes_read: AtomicU64,

    /// Sampled item read rate (f64 bits)
    item_read_rate: AtomicU64,

    /// Sampled byte read rate (f64 bits)
    byte_read_rate: AtomicU64,

    /// Total items written to pages (monotonic)
    total_write_count: AtomicU64,

    /// Total bytes written to pages (monotonic)
    total_bytes_written: AtomicU64,

    /// Sampled item write rate (f64 bits)
    item_write_rate: AtomicU64,

    /// Sampled byte write rate (f64 bits)
    byte_write_rate: AtomicU64,

    /// Sampled on-disk size of the buffer directory in bytes
    remaining_size: AtomicU64,

    /// Last mutation time (epoch ms)
    last_updated: AtomicU64,
}

impl FileBufferMetrics {
    /// Create new metrics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark file buffering enabled with its configured page size
    pub fn enable(&self, page_size: u64) {
        self.is_enabled.store(true, Ordering::Relaxed);
        self.page_size.store(page_size, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Record items replayed from a page into the queue
    #[inline]
    pub fn record_read(&self, items: u64, bytes: u64) {
        self.total_read_count.fetch_add(items, Ordering::Relaxed);
        self.total_bytes_read.fetch_add(bytes, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Record items appended to a page
    #[inline]
    pub fn record_written(&self, items: u64, bytes: u64) {
        self.total_write_count.fetch_add(items, Ordering::Relaxed);
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Set the read-active flag and current read page sequence
    #[inline]
    pub fn set_read_state(&self, active: bool, page_sequence: u64) {
        self.is_read_active.store(active, Ordering::Relaxed);
        self.read_page_sequence
            .store(page_sequence, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Set the write-active flag and current write page sequence
    #[inline]
    pub fn set_write_state(&self, active: bool, page_sequence: u64) {
        self.is_write_active.store(active, Ordering::Relaxed);
        self.write_page_sequence
            .store(page_sequence, Ordering::Relaxed);
        self.last_updated.store(now_millis(), Ordering::Relaxed);
    }

    /// Publish the sampled directory size
    #[inline]
    pub fn set_remaining_size(&self, bytes: u64) {
        self.remaining_size.store(bytes, Ordering::Relaxed);
    }

    /// Publish sampled read rates
    #[inline]
    pub fn set_read_rates(&self, item_rate: f64, byte_rate: f64) {
        self.item_read_rate.store(item_rate.to_bits(), Ordering::Relaxed);
        self.byte_read_rate.store(byte_rate.to_bits(), Ordering::Relaxed);
    }

    /// Publish sampled write rates
    #[inline]
    pub fn set_write_rates(&self, item_rate: f64, byte_rate: f64) {
        self.item_write_rate.store(item_rate.to_bits(), Ordering::Relaxed);
        self.byte_write_rate.store(byte_rate.to_bits(), Ordering::Relaxed);
    }

    /// Total items read (monotonic; sampled by the rate loop)
    #[inline]
    pub fn total_read_count(&self) -> u64 {
        self.total_read_count.load(Ordering::Relaxed)
    }

    /// Total bytes read (monotonic; sampled by the rate loop)
    #[inline]
    pub fn total_bytes_read(&self) -> u64 {
        self.total_bytes_read.load(Ordering::Relaxed)
    }

    /// Total items written (monotonic; sampled by the rate loop)
    #[inline]
    pub fn total_write_count(&self) -> u64 {
        self.total_write_count.load(Ordering::Relaxed)
    }

    /// Total bytes written (monotonic; sampled by the rate loop)
    #[inline]
    pub fn total_bytes_written(&self) -> u64 {
        self.total_bytes_written.load(Ordering::Relaxed)
    }

    /// Take a snapshot of current values
    pub fn snapshot(&self) -> FileBufferMetricsSnapshot {
        FileBufferMetricsSnapshot {
            is_enabled: self.is_enabled.load(Ordering::Relaxed),
            page_size: self.page_size.load(Ordering::Relaxed),
            is_read_active: self.is_read_active.load(Ordering::Relaxed),
            is_write_active: self.is_write_active.load(Ordering::Relaxed),
            read_page_sequence: self.read_page_sequence.load(Ordering::Relaxed),
            write_page_sequence: self.write_page_sequence.load(Ordering::Relaxed),
            total_read_count: self.total_read_count.load(Ordering::Relaxed),
            total_bytes_read: self.total_bytes_read.load(Ordering::Relaxed),
            item_read_rate: f64::from_bits(self.item_read_rate.load(Ordering::Relaxed)),
            byte_read_rate: f64::from_bits(self.byte_read_rate.load(Ordering::Relaxed)),
            total_write_count: self.total_write_count.load(Ordering::Relaxed),
            total_bytes_written: self.total_bytes_written.load(Ordering::Relaxed),
            item_write_rate: f64::from_bits(self.item_write_rate.load(Ordering::Relaxed)),
            byte_write_rate: f64::from_bits(self.byte_write_rate.load(Ordering::Relaxed)),
            remaining_size: self.remaining_size.load(Ordering::Relaxed),
            last_updated: self.last_updated.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of a buffer's metrics
#[derive(Debug, Clone, Serialize)]
pub struct BufferMetricsSnapshot {
    /// Buffer identifier
    pub buffer_id: String,
    /// Start time (epoch ms, 0 = never started)
    pub start_time: u64,
    /// Stop time (epoch ms, 0 = running)
    pub stop_time: u64,
    /// Working queue snapshot
    pub queue: QueueMetricsSnapshot,
    /// File buffer snapshot
    pub file_buffer: FileBufferMetricsSnapshot,
}

/// Point-in-time snapshot of working-queue metrics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct QueueMetricsSnapshot {
    pub item_count: i64,
    pub item_limit: u64,
    pub total_item_count: u64,
    pub item_rate: f64,
    pub is_active: bool,
    pub last_updated: u64,
}

/// Point-in-time snapshot of file-buffer metrics
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FileBufferMetricsSnapshot {
    pub is_enabled: bool,
    pub page_size: u64,
    pub is_read_active: bool,
    pub is_write_active: bool,
    pub read_page_sequence: u64,
    pub write_page_sequence: u64,
    pub total_read_count: u64,
    pub total_bytes_read: u64,
    pub item_read_rate: f64,
    pub byte_read_rate: f64,
    pub total_write_count: u64,
    pub total_bytes_written: u64,
    pub item_write_rate: f64,
    pub byte_write_rate: f64,
    pub remaining_size: u64,
    pub last_updated: u64,
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;

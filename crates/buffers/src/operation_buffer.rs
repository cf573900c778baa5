//! Operation buffer orchestration
//!
//! `OperationBuffer` ties one working queue and one optional file buffer
//! together with the injected sink operations. Producers call `add` and
//! never block: excess load is redirected to bounded disk pages instead of
//! waiting. Two background loops move data toward the sink:
//!
//! ```text
//! [add()] --> [ItemQueue] --process loop--> [sink]
//!    |  (full)    ^
//!    v            | read loop (sink healthy, spare capacity)
//! [FileBuffer pages on disk]
//! ```
//!
//! The process loop drains the queue into the sink and retries a failed
//! batch unchanged at the retry interval. The read loop replays pages
//! oldest-sequence-first once the sink is healthy and the queue has room.
//! Delivery is at-least-once; a shutdown flush writes resident queue items
//! to a dedicated recovery page band so they survive a restart.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use basin_config::BufferConfig;
use basin_metrics::{BufferMetrics, BufferMetricsSnapshot, MovingAverage};

use crate::error::BufferError;
use crate::file_buffer::{FileBuffer, FIRST_PAGE_SEQUENCE, FIRST_RECOVERY_PAGE_SEQUENCE};
use crate::handler::OperationHandler;
use crate::item_queue::ItemQueue;

/// Cadence of the rate sampler
const METRICS_INTERVAL: Duration = Duration::from_secs(1);

/// Samples in the moving-average window (~10s at the sampler cadence)
const METRICS_WINDOW: usize = 10;

/// Secondary state of the file buffer, independent of started/stopped
///
/// `Idle` means adds prefer the working queue; `Active` means the file
/// buffer is currently absorbing writes (queue saturated or sink down).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBufferStatus {
    /// File buffer dormant; adds go to the working queue
    Idle,
    /// File buffer absorbing writes
    Active,
}

/// Page sequence bookkeeping shared by the add path and both loops
struct SequenceState {
    status: FileBufferStatus,
    read_sequence: u64,
    write_sequence: u64,
}

/// An open write stream for the current page
struct PageWriter {
    file: File,
    page_size: u64,
    last_write: Instant,
}

/// A page currently being replayed
struct OpenPage {
    reader: BufReader<File>,
    sequence: u64,
}

/// Orchestrator owning one working queue and one optional file buffer
///
/// Constructed once per (sink, operation-kind) pair, started explicitly,
/// and stopped on shutdown. `stop` (or `Drop`, as a fallback) flushes any
/// resident queue items to recovery pages before releasing file handles.
pub struct OperationBuffer<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    inner: Arc<Inner<T, H>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
}

struct Inner<T, H> {
    id: String,
    config: BufferConfig,
    handler: Arc<H>,
    queue: ItemQueue<T>,
    file_buffer: Option<FileBuffer<T, H>>,
    metrics: Arc<BufferMetrics>,

    /// Sequence/status bookkeeping; held only for in-memory updates
    state: Mutex<SequenceState>,

    /// Open write stream; held only across the serialize-append call
    writer: Mutex<Option<PageWriter>>,

    cancel: CancellationToken,
}

impl<T, H> OperationBuffer<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    /// Create a buffer with the given id, configuration, and sink handler
    ///
    /// The file buffer is constructed only when enabled in the config; its
    /// page directory is derived from the buffer id under `config.path`.
    pub fn new(id: impl Into<String>, config: BufferConfig, handler: Arc<H>) -> Self {
        let id = id.into();
        let metrics = Arc::new(BufferMetrics::new(
            id.as_str(),
            config.queued_item_limit as u64,
        ));
        let queue = ItemQueue::new(config.queued_item_limit);

        let file_buffer = if config.file_buffer_enabled {
            Some(FileBuffer::new(
                &config.path,
                id.as_str(),
                Arc::clone(&handler),
                config.file_buffer_page_size,
            ))
        } else {
            None
        };

        Self {
            inner: Arc::new(Inner {
                id,
                config,
                handler,
                queue,
                file_buffer,
                metrics,
                state: Mutex::new(SequenceState {
                    status: FileBufferStatus::Idle,
                    read_sequence: 0,
                    write_sequence: FIRST_PAGE_SEQUENCE,
                }),
                writer: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
            tasks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Unique identifier of this buffer
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Resolved configuration
    pub fn config(&self) -> &BufferConfig {
        &self.inner.config
    }

    /// Live metrics for this buffer
    pub fn metrics(&self) -> &BufferMetrics {
        &self.inner.metrics
    }

    /// Point-in-time metrics snapshot
    pub fn snapshot(&self) -> BufferMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Number of items currently resident in the working queue
    pub fn queued_item_count(&self) -> usize {
        self.inner.queue.len()
    }

    /// Current file buffer status
    pub fn file_buffer_status(&self) -> FileBufferStatus {
        self.inner.state.lock().status
    }

    /// Whether the buffer has been started and not yet stopped
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Start the background loops
    ///
    /// Spawns the process loop and, when file buffering is configured, the
    /// read loop and the idle-close watchdog, plus the rate sampler. A
    /// stopped buffer cannot be restarted.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!(buffer = %self.inner.id, "buffer starting");
        self.inner.metrics.mark_started();
        self.inner.state.lock().status = FileBufferStatus::Idle;

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(process_loop(Arc::clone(&self.inner))));

        if let Some(file_buffer) = &self.inner.file_buffer {
            self.inner
                .metrics
                .file_buffer
                .enable(file_buffer.page_limit());
            tasks.push(tokio::spawn(read_loop(Arc::clone(&self.inner))));
            tasks.push(tokio::spawn(idle_close_loop(Arc::clone(&self.inner))));
        }

        tasks.push(tokio::spawn(metrics_loop(Arc::clone(&self.inner))));
        tracing::debug!(buffer = %self.inner.id, "buffer started");
    }

    /// Stop the background loops and flush resident items
    ///
    /// Signals cancellation, waits for the loops to finish their current
    /// tick, closes any open write stream, and drains the working queue to
    /// the recovery page band.
    pub async fn stop(&self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            return;
        }

        tracing::debug!(buffer = %self.inner.id, "buffer stopping");
        self.inner.cancel.cancel();

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            let _ = task.await;
        }

        self.inner.close_write_stream();
        self.inner.flush_to_recovery();
        self.inner.metrics.mark_stopped();
        tracing::debug!(buffer = %self.inner.id, "buffer stopped");
    }

    /// Add one item
    ///
    /// Never blocks. Prefers the working queue while the file buffer is
    /// idle and not force-enabled; a full queue diverts the item to the
    /// current write page. Returns `false` only when the item was dropped:
    /// queue full with no file buffer configured, or a page write failed.
    pub fn add(&self, item: T) -> bool {
        let inner = &self.inner;
        let status = inner.state.lock().status;

        if status == FileBufferStatus::Idle && !inner.config.file_buffer_force_enabled {
            match inner.queue.add(item) {
                Ok(()) => {
                    inner.metrics.queue.record_added(1);
                    true
                }
                Err(item) => {
                    if inner.file_buffer.is_some() {
                        inner.state.lock().status = FileBufferStatus::Active;
                        inner.buffer_write(std::slice::from_ref(&item))
                    } else {
                        tracing::warn!(
                            buffer = %inner.id,
                            error = %BufferError::CapacityExceeded,
                            "dropping item"
                        );
                        false
                    }
                }
            }
        } else {
            inner.buffer_write(std::slice::from_ref(&item))
        }
    }

    /// Add a batch of items
    ///
    /// The queue insert is all-or-nothing; a batch that does not fit is
    /// diverted whole to the file buffer so no partial insert occurs.
    /// Returns `false` for an empty batch.
    pub fn add_all(&self, items: Vec<T>) -> bool {
        if items.is_empty() {
            return false;
        }

        let inner = &self.inner;
        let count = items.len() as u64;
        let status = inner.state.lock().status;

        if status == FileBufferStatus::Idle && !inner.config.file_buffer_force_enabled {
            match inner.queue.add_all(items) {
                Ok(()) => {
                    inner.metrics.queue.record_added(count);
                    true
                }
                Err(items) => {
                    if inner.file_buffer.is_some() {
                        inner.state.lock().status = FileBufferStatus::Active;
                        inner.buffer_write(&items)
                    } else {
                        tracing::warn!(
                            buffer = %inner.id,
                            error = %BufferError::CapacityExceeded,
                            count = items.len(),
                            "dropping batch"
                        );
                        false
                    }
                }
            }
        } else {
            inner.buffer_write(&items)
        }
    }
}

impl<T, H> Drop for OperationBuffer<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    fn drop(&mut self) {
        // best-effort flush when the owner never called stop(); the loops
        // are cancelled but not awaited (no runtime available in drop)
        if self.started.swap(false, Ordering::SeqCst) {
            self.inner.cancel.cancel();
            self.inner.close_write_stream();
            self.inner.flush_to_recovery();
            self.inner.metrics.mark_stopped();
        }
    }
}

impl<T, H> Inner<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    /// Write items to the current page, rotating as pages fill
    ///
    /// Returns `true` once every item has been appended. Items that follow
    /// a rotation within the same call continue on the next page.
    fn buffer_write(&self, items: &[T]) -> bool {
        let Some(file_buffer) = self.file_buffer.as_ref() else {
            return false;
        };
        if items.is_empty() {
            return false;
        }

        match self.write_pages(file_buffer, items) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(buffer = %self.id, error = %e, "file buffer write failed");
                false
            }
        }
    }

    fn write_pages(&self, file_buffer: &FileBuffer<T, H>, items: &[T]) -> Result<(), BufferError> {
        let page_limit = file_buffer.page_limit();
        let mut writer_guard = self.writer.lock();
        let mut offset = 0;

        while offset < items.len() {
            if writer_guard.is_none() {
                let sequence = self.next_write_sequence(file_buffer);
                file_buffer.ensure_directory()?;
                let file = File::options()
                    .create(true)
                    .append(true)
                    .open(file_buffer.page_path(sequence))?;
                let page_size = file.metadata()?.len();

                tracing::trace!(buffer = %self.id, sequence, "file buffer writing to page");
                self.metrics.file_buffer.set_write_state(true, sequence);
                *writer_guard = Some(PageWriter {
                    file,
                    page_size,
                    last_write: Instant::now(),
                });
            }

            let mut rotate = false;
            if let Some(writer) = writer_guard.as_mut() {
                let size_before = writer.page_size;
                let count = file_buffer.write(
                    &mut writer.file,
                    &mut writer.page_size,
                    page_limit,
                    &items[offset..],
                )?;
                writer.last_write = Instant::now();
                offset += count;

                self.metrics
                    .file_buffer
                    .record_written(count as u64, writer.page_size - size_before);
                rotate = writer.page_size > page_limit;
            }

            if rotate {
                if let Some(mut writer) = writer_guard.take() {
                    writer.file.flush()?;
                }
                let next = file_buffer.last_page_sequence(FIRST_PAGE_SEQUENCE) + 1;
                self.state.lock().write_sequence = next;
                self.metrics.file_buffer.set_write_state(false, next);
            }
        }

        Ok(())
    }

    /// Resolve the page sequence the next write should target
    ///
    /// Re-derives from the directory when the marker is unset or has been
    /// overtaken by the read sequence, bumping past the page currently
    /// being read. The directory scan happens outside the state lock.
    fn next_write_sequence(&self, file_buffer: &FileBuffer<T, H>) -> u64 {
        let (read_sequence, write_sequence) = {
            let state = self.state.lock();
            (state.read_sequence, state.write_sequence)
        };

        if write_sequence != 0 && write_sequence > read_sequence {
            return write_sequence;
        }

        let mut derived = file_buffer.last_page_sequence(FIRST_PAGE_SEQUENCE);
        if derived <= read_sequence {
            derived = read_sequence + 1;
        }
        self.state.lock().write_sequence = derived;
        derived
    }

    /// Close the open write stream and mark the file buffer idle
    fn close_write_stream(&self) {
        {
            let mut state = self.state.lock();
            state.write_sequence = 0;
            state.status = FileBufferStatus::Idle;
        }

        let writer = self.writer.lock().take();
        if let Some(mut writer) = writer {
            if let Err(e) = writer.file.flush() {
                tracing::warn!(buffer = %self.id, error = %e, "error flushing write stream on close");
            }
        }

        self.metrics.file_buffer.set_write_state(false, 0);
    }

    /// One read-loop tick: open the earliest page if needed, then drain it
    /// into the working queue while spare capacity allows
    fn read_tick(
        &self,
        file_buffer: &FileBuffer<T, H>,
        open_page: &mut Option<OpenPage>,
    ) -> Result<(), BufferError> {
        if open_page.is_none() {
            let (mut read_sequence, mut write_sequence) = {
                let state = self.state.lock();
                (state.read_sequence, state.write_sequence)
            };

            if read_sequence < 1 {
                read_sequence = file_buffer.first_page_sequence(0);
                self.state.lock().read_sequence = read_sequence;
            }

            if read_sequence >= write_sequence {
                // the reader caught up with the writer; close the write
                // stream so this page can be consumed without racing an
                // in-progress write
                self.close_write_stream();
                write_sequence = 0;
            }

            if read_sequence > 0 && (write_sequence == 0 || read_sequence < write_sequence) {
                match File::open(file_buffer.page_path(read_sequence)) {
                    Ok(file) => {
                        tracing::trace!(buffer = %self.id, sequence = read_sequence, "file buffer reading page");
                        *open_page = Some(OpenPage {
                            reader: BufReader::new(file),
                            sequence: read_sequence,
                        });
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        // no pages left; the file buffer goes dormant
                        let mut state = self.state.lock();
                        state.status = FileBufferStatus::Idle;
                        state.read_sequence = 0;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let batch_budget = self.read_batch_budget();
        loop {
            let Some(page) = open_page.as_mut() else {
                break;
            };
            if self.queue.spare_capacity() < batch_budget {
                break;
            }

            self.metrics.file_buffer.set_read_state(true, page.sequence);
            let read = file_buffer.read(&mut page.reader, batch_budget)?;
            let count = read.items.len();
            self.metrics
                .file_buffer
                .record_read(count as u64, read.bytes_read);

            if count == 0 {
                // page exhausted: delete it and forget the sequence so the
                // next tick rediscovers the earliest remaining page
                if let Some(page) = open_page.take() {
                    drop(page.reader);
                    file_buffer.delete_page(page.sequence)?;
                }
                self.state.lock().read_sequence = 0;
                self.metrics.file_buffer.set_read_state(false, 0);
                break;
            }

            tracing::trace!(buffer = %self.id, count, "items replayed from file buffer");
            let mut accepted = 0u64;
            for item in read.items {
                if self.queue.add(item).is_ok() {
                    accepted += 1;
                }
            }
            self.metrics.queue.record_added(accepted);
        }

        Ok(())
    }

    /// One item-buffer's worth of queue capacity for the read loop
    ///
    /// Clamped to the queue limit so small queues can still replay.
    fn read_batch_budget(&self) -> usize {
        self.config
            .max_items_per_interval
            .min(self.queue.limit())
            .max(1)
    }

    /// Drain the working queue to the recovery page band
    fn flush_to_recovery(&self) {
        let Some(file_buffer) = self.file_buffer.as_ref() else {
            return;
        };

        let items = self.queue.take(self.queue.limit());
        if items.is_empty() {
            return;
        }

        tracing::debug!(
            buffer = %self.id,
            count = items.len(),
            "flushing resident items to recovery pages"
        );
        if let Err(e) = self.write_recovery_pages(file_buffer, &items) {
            tracing::error!(buffer = %self.id, error = %e, "recovery flush failed");
        }
    }

    fn write_recovery_pages(
        &self,
        file_buffer: &FileBuffer<T, H>,
        items: &[T],
    ) -> Result<(), BufferError> {
        let page_limit = file_buffer.page_limit();
        file_buffer.ensure_directory()?;

        let mut sequence = FIRST_RECOVERY_PAGE_SEQUENCE;
        let mut offset = 0;
        let mut writer: Option<(File, u64)> = None;

        while offset < items.len() {
            if writer.is_none() {
                tracing::trace!(buffer = %self.id, sequence, "writing recovery page");
                let file = File::options()
                    .create(true)
                    .append(true)
                    .open(file_buffer.page_path(sequence))?;
                let page_size = file.metadata()?.len();
                writer = Some((file, page_size));
            }

            let mut rotate = false;
            if let Some((file, page_size)) = writer.as_mut() {
                let count = file_buffer.write(file, page_size, page_limit, &items[offset..])?;
                offset += count;
                rotate = *page_size > page_limit;
            }

            if rotate {
                if let Some((mut file, _)) = writer.take() {
                    file.flush()?;
                }
                sequence += 1;
            }
        }

        if let Some((mut file, _)) = writer.take() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Drain the working queue into the sink until cancellation
///
/// A failed batch is retained and re-offered unchanged at the retry
/// interval; new items are only peeked once the held batch succeeds.
/// Iteration time is subtracted from the sleep so the cadence self-corrects.
async fn process_loop<T, H>(inner: Arc<Inner<T, H>>)
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    let cancel = inner.cancel.clone();
    let mut held: Vec<T> = Vec::new();

    loop {
        let started = Instant::now();
        let mut interval = inner.config.process_interval;

        if inner.handler.is_available() {
            if held.is_empty() {
                held = inner.queue.get(inner.config.max_items_per_interval);
                if !held.is_empty() {
                    tracing::trace!(
                        buffer = %inner.id,
                        count = held.len(),
                        total = inner.queue.len(),
                        "items read from queue"
                    );
                }
            }

            if held.is_empty() {
                inner.metrics.queue.set_active(false);
            } else {
                inner.metrics.queue.set_active(true);

                let process_started = Instant::now();
                let consumed = inner.handler.process(&held).await;
                let elapsed_ms = process_started.elapsed().as_millis() as u64;

                if consumed {
                    let removed = inner.queue.remove(held.len());
                    inner.metrics.queue.record_removed(removed as u64);
                    tracing::trace!(
                        buffer = %inner.id,
                        count = held.len(),
                        elapsed_ms,
                        "batch processed"
                    );
                    held.clear();
                } else {
                    tracing::debug!(
                        buffer = %inner.id,
                        error = %BufferError::ProcessFailed { count: held.len() },
                        elapsed_ms,
                        "retrying same batch"
                    );
                    interval = inner.config.retry_interval;
                }
            }
        } else {
            inner.metrics.queue.set_active(false);
            if inner.file_buffer.is_some() {
                tracing::trace!(
                    buffer = %inner.id,
                    reason = %BufferError::Unavailable,
                    "diverting writes to file buffer"
                );
                inner.state.lock().status = FileBufferStatus::Active;
            }
        }

        let wait = interval.saturating_sub(started.elapsed());
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(wait) => {}
        }
    }

    tracing::trace!(buffer = %inner.id, "process loop stopped");
}

/// Replay file buffer pages into the working queue until cancellation
///
/// Offset by half the read interval from the process loop to reduce lock
/// contention. Only reads while the sink is available. I/O errors abort the
/// current page context and are retried on the next tick.
async fn read_loop<T, H>(inner: Arc<Inner<T, H>>)
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    let Some(file_buffer) = inner.file_buffer.as_ref() else {
        return;
    };
    let cancel = inner.cancel.clone();
    let interval = inner
        .config
        .file_buffer_read_interval
        .max(Duration::from_millis(1));

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = tokio::time::sleep(interval / 2) => {}
    }

    let mut open_page: Option<OpenPage> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        inner
            .metrics
            .file_buffer
            .set_remaining_size(file_buffer.sampled_directory_size());

        if !inner.handler.is_available() {
            inner.state.lock().status = FileBufferStatus::Active;
            continue;
        }

        if let Err(e) = inner.read_tick(file_buffer, &mut open_page) {
            tracing::warn!(
                buffer = %inner.id,
                error = %e,
                "file buffer read failed; resetting page context"
            );
            open_page = None;
            inner.state.lock().read_sequence = 0;
            inner.metrics.file_buffer.set_read_state(false, 0);
        }
    }

    tracing::trace!(buffer = %inner.id, "read loop stopped");
}

/// Close the write stream after a quiet period so file handles are not
/// held indefinitely between bursts
async fn idle_close_loop<T, H>(inner: Arc<Inner<T, H>>)
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    let cancel = inner.cancel.clone();
    let tick = inner
        .config
        .file_buffer_write_interval
        .max(Duration::from_millis(1));
    let quiet_period = inner.config.file_buffer_idle_close;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(tick) => {}
        }

        let close_due = inner
            .writer
            .lock()
            .as_ref()
            .map_or(false, |writer| writer.last_write.elapsed() >= quiet_period);

        if close_due {
            tracing::trace!(buffer = %inner.id, "closing idle write stream");
            inner.close_write_stream();
        }
    }
}

/// Publish moving-average rates from the monotonic counters
///
/// Samples successive differences once per second into a ~10s window.
/// Differences are saturating, so a counter reset shows up as a zero
/// sample rather than a negative rate.
async fn metrics_loop<T, H>(inner: Arc<Inner<T, H>>)
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    let cancel = inner.cancel.clone();
    let mut ticker = tokio::time::interval(METRICS_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ticker.tick().await; // the first tick fires immediately

    let mut queue_items = MovingAverage::new(METRICS_WINDOW);
    let mut read_items = MovingAverage::new(METRICS_WINDOW);
    let mut read_bytes = MovingAverage::new(METRICS_WINDOW);
    let mut write_items = MovingAverage::new(METRICS_WINDOW);
    let mut write_bytes = MovingAverage::new(METRICS_WINDOW);

    let metrics = &inner.metrics;
    let mut last_queue_items = metrics.queue.total_item_count();
    let mut last_read_items = metrics.file_buffer.total_read_count();
    let mut last_read_bytes = metrics.file_buffer.total_bytes_read();
    let mut last_write_items = metrics.file_buffer.total_write_count();
    let mut last_write_bytes = metrics.file_buffer.total_bytes_written();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        sample(&mut queue_items, &mut last_queue_items, metrics.queue.total_item_count());
        sample(&mut read_items, &mut last_read_items, metrics.file_buffer.total_read_count());
        sample(&mut read_bytes, &mut last_read_bytes, metrics.file_buffer.total_bytes_read());
        sample(&mut write_items, &mut last_write_items, metrics.file_buffer.total_write_count());
        sample(&mut write_bytes, &mut last_write_bytes, metrics.file_buffer.total_bytes_written());

        metrics.queue.set_item_rate(round_rate(queue_items.mean()));
        metrics
            .file_buffer
            .set_read_rates(round_rate(read_items.mean()), round_rate(read_bytes.mean()));
        metrics
            .file_buffer
            .set_write_rates(round_rate(write_items.mean()), round_rate(write_bytes.mean()));
    }
}

/// Push the delta since the last sample into the window
fn sample(window: &mut MovingAverage, last: &mut u64, current: u64) {
    let diff = current.saturating_sub(*last);
    *last = current;
    window.push(diff as f64);
}

/// Clamp to non-negative and round to 4 decimal places
fn round_rate(rate: f64) -> f64 {
    (rate.max(0.0) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
#[path = "operation_buffer_test.rs"]
mod operation_buffer_test;

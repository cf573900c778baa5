//! Buffer registry
//!
//! A process hosts one buffer per (sink, operation-kind) pair. The provider
//! maps buffer ids to running buffers so producers can look them up before
//! calling `add`, and so a supervisor can observe all metrics and shut every
//! buffer down on exit as a scoped release.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use basin_metrics::BufferMetricsSnapshot;

use crate::handler::OperationHandler;
use crate::operation_buffer::OperationBuffer;

/// The write-path operations a buffer can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Publish new or updated entities
    Publish,
    /// Delete entities
    Delete,
    /// Update index entries
    Index,
    /// Empty (truncate) an entity collection
    Empty,
}

impl OperationKind {
    /// All operation kinds
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Publish,
        OperationKind::Delete,
        OperationKind::Index,
        OperationKind::Empty,
    ];

    /// Stable lower-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Publish => "publish",
            OperationKind::Delete => "delete",
            OperationKind::Index => "index",
            OperationKind::Empty => "empty",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compose the buffer id for a (driver, operation) pair
pub fn buffer_id(driver_id: &str, kind: OperationKind) -> String {
    format!("{driver_id}:{kind}")
}

/// Object-safe view of a running buffer
///
/// Erases the item and handler types so heterogeneous buffers can live in
/// one registry. `shutdown` performs the same flush as `stop`.
#[async_trait]
pub trait ManagedBuffer: Send + Sync {
    /// Unique identifier of this buffer
    fn id(&self) -> &str;

    /// Point-in-time metrics snapshot
    fn snapshot(&self) -> BufferMetricsSnapshot;

    /// Stop the buffer and flush resident items
    async fn shutdown(&self);
}

#[async_trait]
impl<T, H> ManagedBuffer for OperationBuffer<T, H>
where
    T: Clone + Send + Sync + 'static,
    H: OperationHandler<T>,
{
    fn id(&self) -> &str {
        self.id()
    }

    fn snapshot(&self) -> BufferMetricsSnapshot {
        self.snapshot()
    }

    async fn shutdown(&self) {
        self.stop().await;
    }
}

/// Registry of running buffers keyed by buffer id
///
/// Buffer instances are fully independent; the registry adds no cross-buffer
/// locking, only lookup and aggregate observation.
#[derive(Default)]
pub struct BufferProvider {
    buffers: DashMap<String, Arc<dyn ManagedBuffer>>,
}

impl BufferProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer under its id
    ///
    /// Returns `false` if a buffer with the same id is already registered;
    /// the existing buffer is left in place.
    pub fn register(&self, buffer: Arc<dyn ManagedBuffer>) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.buffers.entry(buffer.id().to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                tracing::debug!(buffer = %buffer.id(), "buffer registered");
                slot.insert(buffer);
                true
            }
        }
    }

    /// Look up a buffer by id
    pub fn get(&self, buffer_id: &str) -> Option<Arc<dyn ManagedBuffer>> {
        self.buffers.get(buffer_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a buffer is registered
    pub fn contains(&self, buffer_id: &str) -> bool {
        self.buffers.contains_key(buffer_id)
    }

    /// Remove a buffer from the registry
    ///
    /// The buffer itself is not stopped; callers own its lifecycle.
    pub fn remove(&self, buffer_id: &str) -> Option<Arc<dyn ManagedBuffer>> {
        self.buffers.remove(buffer_id).map(|(_, buffer)| buffer)
    }

    /// Number of registered buffers
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Check if no buffers are registered
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Ids of all registered buffers
    pub fn ids(&self) -> Vec<String> {
        self.buffers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Metrics snapshot for one buffer
    pub fn metrics(&self, buffer_id: &str) -> Option<BufferMetricsSnapshot> {
        self.buffers.get(buffer_id).map(|entry| entry.snapshot())
    }

    /// Metrics snapshots for every registered buffer
    pub fn all_metrics(&self) -> Vec<BufferMetricsSnapshot> {
        self.buffers.iter().map(|entry| entry.snapshot()).collect()
    }

    /// Stop and flush every registered buffer, clearing the registry
    ///
    /// The supervisor calls this on process shutdown so resident items are
    /// flushed to recovery pages on every exit path.
    pub async fn shutdown_all(&self) {
        let buffers: Vec<_> = self
            .buffers
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        self.buffers.clear();

        for buffer in buffers {
            tracing::debug!(buffer = %buffer.id(), "shutting down buffer");
            buffer.shutdown().await;
        }
    }
}

impl fmt::Debug for BufferProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferProvider")
            .field("buffers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

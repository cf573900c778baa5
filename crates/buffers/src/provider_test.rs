use super::*;

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use basin_config::BufferConfig;
use tempfile::TempDir;

use crate::handler::ItemCodec;

struct NullHandler {
    available: AtomicBool,
}

impl NullHandler {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            available: AtomicBool::new(true),
        })
    }
}

impl ItemCodec<String> for NullHandler {
    fn serialize(&self, item: &String, out: &mut dyn io::Write) -> io::Result<usize> {
        out.write_all(item.as_bytes())?;
        Ok(item.len())
    }

    fn deserialize(&self, bytes: &[u8]) -> Option<String> {
        std::str::from_utf8(bytes).ok().map(str::to_string)
    }
}

#[async_trait]
impl OperationHandler<String> for NullHandler {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn process(&self, _batch: &[String]) -> bool {
        true
    }
}

fn test_buffer(dir: &TempDir, id: &str) -> Arc<OperationBuffer<String, NullHandler>> {
    let config = BufferConfig::default().with_path(dir.path());
    Arc::new(OperationBuffer::new(id, config, NullHandler::new()))
}

// =============================================================================
// OperationKind tests
// =============================================================================

#[test]
fn test_operation_kind_names() {
    assert_eq!(OperationKind::Publish.as_str(), "publish");
    assert_eq!(OperationKind::Delete.as_str(), "delete");
    assert_eq!(OperationKind::Index.as_str(), "index");
    assert_eq!(OperationKind::Empty.as_str(), "empty");
}

#[test]
fn test_operation_kind_all_is_exhaustive() {
    assert_eq!(OperationKind::ALL.len(), 4);
}

#[test]
fn test_buffer_id_composition() {
    assert_eq!(
        buffer_id("driver-a", OperationKind::Publish),
        "driver-a:publish"
    );
    assert_eq!(buffer_id("driver-a", OperationKind::Empty), "driver-a:empty");
}

// =============================================================================
// Registry tests
// =============================================================================

#[test]
fn test_register_and_get() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();
    let buffer = test_buffer(&dir, "driver-a:publish");

    assert!(provider.register(buffer));
    assert!(provider.contains("driver-a:publish"));
    assert_eq!(provider.len(), 1);

    let found = provider.get("driver-a:publish").unwrap();
    assert_eq!(found.id(), "driver-a:publish");
    assert!(provider.get("driver-a:delete").is_none());
}

#[test]
fn test_register_duplicate_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();

    assert!(provider.register(test_buffer(&dir, "driver-a:publish")));
    assert!(!provider.register(test_buffer(&dir, "driver-a:publish")));
    assert_eq!(provider.len(), 1);
}

#[test]
fn test_remove() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();
    provider.register(test_buffer(&dir, "driver-a:publish"));

    let removed = provider.remove("driver-a:publish").unwrap();
    assert_eq!(removed.id(), "driver-a:publish");
    assert!(provider.is_empty());
    assert!(provider.remove("driver-a:publish").is_none());
}

#[test]
fn test_ids() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();
    for kind in OperationKind::ALL {
        provider.register(test_buffer(&dir, &buffer_id("driver-a", kind)));
    }

    let mut ids = provider.ids();
    ids.sort();
    assert_eq!(
        ids,
        vec![
            "driver-a:delete".to_string(),
            "driver-a:empty".to_string(),
            "driver-a:index".to_string(),
            "driver-a:publish".to_string(),
        ]
    );
}

#[test]
fn test_metrics_lookup() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();
    let buffer = test_buffer(&dir, "driver-a:publish");
    buffer.add("x".to_string());
    provider.register(buffer);

    let snapshot = provider.metrics("driver-a:publish").unwrap();
    assert_eq!(snapshot.buffer_id, "driver-a:publish");
    assert_eq!(snapshot.queue.item_count, 1);

    assert!(provider.metrics("missing").is_none());
    assert_eq!(provider.all_metrics().len(), 1);
}

#[tokio::test]
async fn test_shutdown_all_stops_and_clears() {
    let dir = TempDir::new().unwrap();
    let provider = BufferProvider::new();

    let publish = test_buffer(&dir, "driver-a:publish");
    let delete = test_buffer(&dir, "driver-a:delete");
    publish.start();
    delete.start();
    provider.register(Arc::clone(&publish) as Arc<dyn ManagedBuffer>);
    provider.register(Arc::clone(&delete) as Arc<dyn ManagedBuffer>);

    provider.shutdown_all().await;

    assert!(provider.is_empty());
    assert!(!publish.is_started());
    assert!(!delete.is_started());
}

//! Injected operations consumed by a buffer
//!
//! The buffer core is generic over its collaborator: the owning driver
//! supplies serialization for the on-disk page format, an availability
//! check, and the async batch-process call that delivers items to the sink.
//! The traits are supplied at construction; the core never inspects item
//! types at runtime.

use std::io;

use async_trait::async_trait;

/// Item serialization for the on-disk page format
///
/// `serialize` writes one record (without the trailing delimiter) and returns
/// the number of bytes written. `deserialize` parses one record back;
/// returning `None` marks the record invalid, and the page reader skips it.
pub trait ItemCodec<T>: Send + Sync {
    /// Serialize one item into the writer, returning the bytes written
    fn serialize(&self, item: &T, out: &mut dyn io::Write) -> io::Result<usize>;

    /// Deserialize one record; `None` if the bytes are not a valid item
    fn deserialize(&self, bytes: &[u8]) -> Option<T>;
}

/// Full operation seam between a buffer and its downstream sink
///
/// `process` returning `true` means the batch was fully consumed and may be
/// removed from the working queue; `false` keeps the same batch for retry.
#[async_trait]
pub trait OperationHandler<T>: ItemCodec<T> + 'static {
    /// Whether the sink can currently accept work
    fn is_available(&self) -> bool;

    /// Deliver a batch to the sink; `true` = fully consumed
    async fn process(&self, batch: &[T]) -> bool;
}

use crate::error::StoreResult;

/// Durable home for the ledger's serialized block sequence.
///
/// All implementations must satisfy these invariants:
/// - `write` replaces the stored snapshot as a unit. A reader never observes
///   a partially written snapshot, even after a crash mid-write.
/// - `read` returns exactly the bytes of the last successful `write`.
/// - The store never interprets snapshot contents.
pub trait ChainStore: Send + Sync {
    /// Read the current snapshot.
    ///
    /// Returns `Ok(None)` if nothing has been stored yet.
    fn read(&self) -> StoreResult<Option<Vec<u8>>>;

    /// Replace the snapshot with `bytes`.
    fn write(&self, bytes: &[u8]) -> StoreResult<()>;

    /// Move the current snapshot out of the way so it is kept for inspection
    /// but no longer read. Returns a description of where it went, or `None`
    /// if there was nothing to move.
    fn quarantine(&self) -> StoreResult<Option<String>>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

impl<T: ChainStore + ?Sized> ChainStore for std::sync::Arc<T> {
    fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        (**self).read()
    }

    fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        (**self).write(bytes)
    }

    fn quarantine(&self) -> StoreResult<Option<String>> {
        (**self).quarantine()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

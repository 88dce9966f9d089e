use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::ChainStore;

/// In-memory snapshot store.
///
/// Intended for tests and embedding. `set_read_only(true)` makes every
/// subsequent write fail, which lets callers exercise persistence-failure
/// handling without touching a filesystem.
#[derive(Default)]
pub struct InMemoryChainStore {
    snapshot: RwLock<Option<Vec<u8>>>,
    quarantined: RwLock<Vec<Vec<u8>>>,
    read_only: AtomicBool,
}

impl InMemoryChainStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `bytes`.
    pub fn with_snapshot(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            snapshot: RwLock::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Snapshots moved aside by [`ChainStore::quarantine`], oldest first.
    pub fn quarantined(&self) -> Vec<Vec<u8>> {
        self.quarantined.read().map(|q| q.clone()).unwrap_or_default()
    }
}

impl ChainStore for InMemoryChainStore {
    fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        let snapshot = self.snapshot.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(snapshot.clone())
    }

    fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::LockPoisoned)?;
        *snapshot = Some(bytes.to_vec());
        Ok(())
    }

    fn quarantine(&self) -> StoreResult<Option<String>> {
        let mut snapshot = self.snapshot.write().map_err(|_| StoreError::LockPoisoned)?;
        let Some(bytes) = snapshot.take() else {
            return Ok(None);
        };
        let mut quarantined = self
            .quarantined
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        quarantined.push(bytes);
        Ok(Some(format!("memory quarantine #{}", quarantined.len())))
    }

    fn describe(&self) -> String {
        "in-memory".into()
    }
}

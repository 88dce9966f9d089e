use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::ChainStore;

/// Single-file snapshot store.
///
/// Writes are atomic: data is written to a temporary file in the same
/// directory, synced, then renamed over the snapshot. A crash leaves either
/// the previous snapshot or the new one, never a truncated file.
pub struct FileChainStore {
    path: PathBuf,
    dir: PathBuf,
}

impl FileChainStore {
    /// Create a store for the snapshot at `path`.
    ///
    /// The parent directory is created if it does not exist.
    pub fn new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        Ok(Self { path, dir })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn quarantine_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "chain".into());
        self.dir.join(format!("{name}.corrupt-{millis}"))
    }
}

impl ChainStore for FileChainStore {
    fn read(&self) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                debug!(path = %self.path.display(), len = bytes.len(), "read chain snapshot");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn write(&self, bytes: &[u8]) -> StoreResult<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        debug!(path = %self.path.display(), len = bytes.len(), "wrote chain snapshot");
        Ok(())
    }

    fn quarantine(&self) -> StoreResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let target = self.quarantine_path();
        fs::rename(&self.path, &target)?;
        warn!(
            from = %self.path.display(),
            to = %target.display(),
            "moved unreadable chain snapshot aside"
        );
        Ok(Some(target.display().to_string()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

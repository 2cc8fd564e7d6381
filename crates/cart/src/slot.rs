//! Storage slots backing the cart store.
//!
//! The persisted cart lives in one keyed slot. [`StorageSlot`] is the
//! capability seam: a context constructs the implementation matching its
//! environment up front instead of inspecting the platform at call time.
//! Slot errors never escape the store's public operations; the store logs
//! them and degrades to an empty read or a dropped write.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Error raised by slot implementations.
#[derive(Debug, Error)]
pub enum SlotError {
    /// Underlying file I/O failed.
    #[error("slot i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// A keyed slot holding the serialized cart payload.
pub trait StorageSlot: Send + Sync {
    /// Read the raw payload, or `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, SlotError>;

    /// Replace the payload wholesale.
    fn store(&self, payload: &str) -> Result<(), SlotError>;
}

/// Durable slot persisted as a file under a state directory.
///
/// Survives process restarts. Writes go through a sibling temp file and a
/// rename, so a crash mid-write never leaves a torn payload behind.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Open the slot for `key` inside `dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path, key: &str) -> Result<Self, SlotError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{key}.json")),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageSlot for FileSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, payload: &str) -> Result<(), SlotError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Shared in-memory slot.
///
/// Clones share one cell, which makes this both the unit-test fake and the
/// slot for several same-process contexts.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the raw payload directly, bypassing serialization.
    ///
    /// Exists so tests can seed the slot with arbitrary (including corrupt)
    /// data, the way foreign code could scribble over a shared slot.
    pub fn set_raw(&self, payload: impl Into<String>) {
        *self.lock() = Some(payload.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageSlot for MemorySlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        Ok(self.lock().clone())
    }

    fn store(&self, payload: &str) -> Result<(), SlotError> {
        *self.lock() = Some(payload.to_owned());
        Ok(())
    }
}

/// Slot for environments without storage access.
///
/// Reads are always empty and writes are dropped; the store still fires
/// same-context notifications, so purely in-memory UI behaves correctly
/// without durability.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedSlot;

impl StorageSlot for DetachedSlot {
    fn load(&self) -> Result<Option<String>, SlotError> {
        Ok(None)
    }

    fn store(&self, _payload: &str) -> Result<(), SlotError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_slot_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path(), "kbmv-cart").unwrap();
        assert!(slot.load().unwrap().is_none());
    }

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path(), "kbmv-cart").unwrap();
        slot.store("[1,2,3]").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("[1,2,3]"));

        // A second open over the same directory sees the same payload.
        let reopened = FileSlot::open(dir.path(), "kbmv-cart").unwrap();
        assert_eq!(reopened.load().unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_file_slot_write_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path(), "kbmv-cart").unwrap();
        slot.store("first").unwrap();
        slot.store("second").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_memory_slot_clones_share_the_cell() {
        let slot = MemorySlot::new();
        let sibling = slot.clone();
        slot.store("payload").unwrap();
        assert_eq!(sibling.load().unwrap().as_deref(), Some("payload"));
    }

    #[test]
    fn test_detached_slot_drops_writes() {
        let slot = DetachedSlot;
        slot.store("payload").unwrap();
        assert!(slot.load().unwrap().is_none());
    }
}

// src/backend.rs
//! Keyed persistent containers.
//!
//! A backend holds whole records as strings under fixed keys, the way the
//! browser's local storage does. Stores on top of it read a record, change it,
//! and write it back in one piece.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log;

use crate::error::{StoreError, StoreResult};

const RECORD_EXTENSION: &str = "json";

pub trait Backend {
    /// Returns `Ok(None)` when nothing has been stored under `key` yet.
    fn read(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the record under `key`. Fails instead of writing a partial record.
    fn write(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing record is not an error.
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

fn check_quota(key: &str, used_by_others: u64, value_len: u64, quota: Option<u64>) -> StoreResult<()> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let needed = used_by_others + value_len;
    if needed > quota {
        log::warn!(
            "Refusing to write '{}': {} bytes needed, quota is {} bytes",
            key,
            needed,
            quota
        );
        return Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

/// One `<key>.json` file per record inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    quota_bytes: Option<u64>,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota_bytes: None,
        }
    }

    /// Caps the combined size of all records. `0` means no cap.
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = (quota_bytes > 0).then_some(quota_bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, RECORD_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.{}.tmp", key, RECORD_EXTENSION))
    }

    fn bytes_used_except(&self, key: &str) -> io::Result<u64> {
        let skip = self.record_path(key);
        let mut total = 0;
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path == skip || path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.record_path(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No record at {:?} yet", path);
                Ok(None)
            }
            Err(e) => {
                log::warn!("Failed to read record {:?}: {}", path, e);
                Err(StoreError::Io(e))
            }
        }
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            log::error!("Failed to create data directory {:?}: {}", self.dir, e);
            StoreError::Io(e)
        })?;

        if self.quota_bytes.is_some() {
            let used = self.bytes_used_except(key)?;
            check_quota(key, used, value.len() as u64, self.quota_bytes)?;
        }

        let temp_path = self.temp_path(key);
        let destination = self.record_path(key);
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| {
                log::error!("Failed to open {:?} for writing: {}", temp_path, e);
                StoreError::Io(e)
            })?;
        file.write_all(value.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| {
                log::error!("Failed to write record to {:?}: {}", temp_path, e);
                let _ = fs::remove_file(&temp_path);
                StoreError::Io(e)
            })?;
        drop(file);

        rename_with_fallback(&temp_path, &destination)?;
        log::debug!("Wrote {} bytes to {:?}", value.len(), destination);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                log::error!("Failed to remove record {:?}: {}", path, e);
                Err(StoreError::Io(e))
            }
        }
    }
}

/// Swaps a fully written temp file into place. Some platforms refuse to rename
/// over an existing file, so the destination is removed and the rename retried.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// In-memory backend for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    records: HashMap<String, String>,
    quota_bytes: Option<u64>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = (quota_bytes > 0).then_some(quota_bytes);
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.records.get(key).map(String::as_str)
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let used: u64 = self
            .records
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len() as u64)
            .sum();
        check_quota(key, used, value.len() as u64, self.quota_bytes)?;
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.records.remove(key);
        Ok(())
    }
}

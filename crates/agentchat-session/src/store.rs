// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Durable key-value storage for session values.
//!
//! The file store keeps a single JSON document:
//!
//! ```json
//! { "updated_at": "2026-01-01T10:00:00Z", "values": { "conversationId": "abc" } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Scoped string get/set/remove.
pub trait KvStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

// ── File store ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// JSON-file backed store; every mutation is written through.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: StoreFile,
}

impl FileStore {
    /// Opens `path`, treating a missing file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => StoreFile::default(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), keys = data.values.len(), "opened session store");
        Ok(Self { path, data })
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io { path: self.path.clone(), source };
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        self.data.updated_at = Some(Utc::now());
        let text = serde_json::to_string_pretty(&self.data).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.data.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ── Memory store ─────────────────────────────────────────────────────────────

/// In-memory store.  Clones share the same map, so a test can keep one
/// handle and inspect what the session wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let store = Self::default();
        {
            let mut v = store.values();
            for (k, val) in pairs {
                v.insert((*k).to_string(), (*val).to_string());
            }
        }
        store
    }

    /// Every write is a single map operation, so a poisoned map is still whole.
    fn values(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state.json")).unwrap();
        assert!(store.get("conversationId").is_none());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("conversationId", "abc-123").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("conversationId").as_deref(), Some("abc-123"));
    }

    #[test]
    fn remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("conversationId", "abc").unwrap();
        store.set("lastDataConvId", "data-1").unwrap();
        store.remove("conversationId").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert!(reopened.get("conversationId").is_none());
        assert_eq!(reopened.get("lastDataConvId").as_deref(), Some("data-1"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn memory_store_clones_share_values() {
        let handle = MemoryStore::new();
        let mut writer = handle.clone();
        writer.set("k", "v").unwrap();
        assert_eq!(handle.get("k").as_deref(), Some("v"));
        writer.remove("k").unwrap();
        assert!(handle.get("k").is_none());
    }

    #[test]
    fn memory_store_keeps_working_after_a_panicking_holder() {
        let store = MemoryStore::with(&[("conversationId", "c-1")]);
        let values = Arc::clone(&store.values);
        let _ = std::thread::spawn(move || {
            let _guard = values.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(store.values.is_poisoned());

        let mut writer = store.clone();
        writer.set("lastDataConvId", "d-1").unwrap();
        assert_eq!(store.get("lastDataConvId").as_deref(), Some("d-1"));
        assert_eq!(store.get("conversationId").as_deref(), Some("c-1"));
        writer.remove("conversationId").unwrap();
        assert!(store.get("conversationId").is_none());
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use exam_core::model::{ExamId, ProgressSnapshot};

/// Errors surfaced by progress store adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Key under which an exam's progress snapshot is stored.
///
/// The format matches the keys earlier clients wrote into browser storage,
/// so existing saved progress keeps resolving.
#[must_use]
pub fn progress_key(exam_id: ExamId) -> String {
    format!("exam_progress_{exam_id}")
}

/// Capability contract for the persistent key-value store holding progress
/// snapshots.
///
/// The session layer treats `load` failures as "no prior snapshot" and `save`
/// failures as non-fatal; adapters only report what happened.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Fetch the snapshot for an exam, if one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if a stored value cannot be
    /// decoded, or `StorageError::Connection` for adapter failures. Absence
    /// is `Ok(None)`, not an error.
    async fn load(&self, exam_id: ExamId) -> Result<Option<ProgressSnapshot>, StorageError>;

    /// Persist the snapshot for an exam, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(&self, exam_id: ExamId, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    /// Remove the stored snapshot for an exam. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for adapter failures.
    async fn clear(&self, exam_id: ExamId) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY STORE ───────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
///
/// Holds the JSON strings exactly as a browser key-value store would, so
/// decode failures on corrupt values behave like the real adapters. Writes
/// can be made to fail for exercising degradation paths.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save`/`clear` calls fail with a connection error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Plant a raw string value under an exam's key, bypassing serialization.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn put_raw(&self, exam_id: ExamId, value: impl Into<String>) {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(progress_key(exam_id), value.into());
    }

    /// Raw stored value for an exam, if any.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    #[must_use]
    pub fn raw(&self, exam_id: ExamId) -> Option<String> {
        let entries = self.entries.lock().expect("store lock poisoned");
        entries.get(&progress_key(exam_id)).cloned()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn load(&self, exam_id: ExamId) -> Result<Option<ProgressSnapshot>, StorageError> {
        let value = {
            let entries = self
                .entries
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            entries.get(&progress_key(exam_id)).cloned()
        };

        match value {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
        }
    }

    async fn save(&self, exam_id: ExamId, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("writes disabled".into()));
        }

        let json = serde_json::to_string(snapshot)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        entries.insert(progress_key(exam_id), json);
        Ok(())
    }

    async fn clear(&self, exam_id: ExamId) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("writes disabled".into()));
        }

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        entries.remove(&progress_key(exam_id));
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

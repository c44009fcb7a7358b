//! Stack lock records: which engine currently holds mutation rights over a
//! stack.
//!
//! `create` and `steal` are the compare-and-swap primitives the stack lock is
//! built on; both must be atomic with respect to every other engine sharing the
//! store.

use crate::layout::StoreLayout;
use crate::{validate_key, write_atomic, FileGuard, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackforge_schema::{EngineId, StackId};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockRecord {
    pub stack_id: StackId,
    pub engine_id: EngineId,
    pub created_at: DateTime<Utc>,
}

impl LockRecord {
    pub fn new(stack_id: &StackId, engine_id: &EngineId) -> Self {
        Self {
            stack_id: stack_id.clone(),
            engine_id: engine_id.clone(),
            created_at: Utc::now(),
        }
    }
}

pub trait LockStore: Send + Sync {
    /// Bind `stack_id` to `engine_id` if no record exists. Returns `None` on
    /// success, or the engine that already holds the stack.
    fn create(
        &self,
        stack_id: &StackId,
        engine_id: &EngineId,
    ) -> Result<Option<EngineId>, StoreError>;

    /// Move the record from `old` to `new`, only if `old` still holds it.
    fn steal(&self, stack_id: &StackId, old: &EngineId, new: &EngineId)
        -> Result<bool, StoreError>;

    /// Delete the record if `engine_id` holds it. Returns whether a record was
    /// deleted; releasing an unheld stack is not an error.
    fn release(&self, stack_id: &StackId, engine_id: &EngineId) -> Result<bool, StoreError>;

    fn holder(&self, stack_id: &StackId) -> Result<Option<EngineId>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryLockStore {
    records: Mutex<HashMap<StackId, EngineId>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<StackId, EngineId>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LockStore for MemoryLockStore {
    fn create(
        &self,
        stack_id: &StackId,
        engine_id: &EngineId,
    ) -> Result<Option<EngineId>, StoreError> {
        let mut records = self.records();
        if let Some(holder) = records.get(stack_id) {
            return Ok(Some(holder.clone()));
        }
        records.insert(stack_id.clone(), engine_id.clone());
        Ok(None)
    }

    fn steal(
        &self,
        stack_id: &StackId,
        old: &EngineId,
        new: &EngineId,
    ) -> Result<bool, StoreError> {
        let mut records = self.records();
        match records.get_mut(stack_id) {
            Some(holder) if holder == old => {
                *holder = new.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn release(&self, stack_id: &StackId, engine_id: &EngineId) -> Result<bool, StoreError> {
        let mut records = self.records();
        if records.get(stack_id) == Some(engine_id) {
            records.remove(stack_id);
            return Ok(true);
        }
        Ok(false)
    }

    fn holder(&self, stack_id: &StackId) -> Result<Option<EngineId>, StoreError> {
        Ok(self.records().get(stack_id).cloned())
    }
}

/// Lock records as one JSON file per stack under `locks/`.
///
/// Every read-modify-write runs under the store's exclusive file lock, so the
/// compare-and-swap holds across processes sharing the root.
pub struct FileLockStore {
    layout: StoreLayout,
}

impl FileLockStore {
    pub fn new(layout: StoreLayout) -> Self {
        Self { layout }
    }

    fn record_path(&self, stack_id: &StackId) -> Result<PathBuf, StoreError> {
        validate_key(stack_id)?;
        Ok(self.layout.locks_dir().join(stack_id.as_str()))
    }

    fn read(&self, stack_id: &StackId) -> Result<Option<LockRecord>, StoreError> {
        match fs::read_to_string(self.record_path(stack_id)?) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, record: &LockRecord) -> Result<(), StoreError> {
        let dir = self.layout.locks_dir();
        fs::create_dir_all(&dir)?;
        let content = serde_json::to_string_pretty(record)?;
        write_atomic(&dir, &self.record_path(&record.stack_id)?, content.as_bytes())
    }

    fn exclusive<T>(&self, f: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let _guard = FileGuard::acquire(&self.layout.lock_file())?;
        f()
    }
}

impl LockStore for FileLockStore {
    fn create(
        &self,
        stack_id: &StackId,
        engine_id: &EngineId,
    ) -> Result<Option<EngineId>, StoreError> {
        self.exclusive(|| {
            if let Some(existing) = self.read(stack_id)? {
                return Ok(Some(existing.engine_id));
            }
            self.write(&LockRecord::new(stack_id, engine_id))?;
            debug!(stack = %stack_id, engine = %engine_id, "lock record created");
            Ok(None)
        })
    }

    fn steal(
        &self,
        stack_id: &StackId,
        old: &EngineId,
        new: &EngineId,
    ) -> Result<bool, StoreError> {
        self.exclusive(|| match self.read(stack_id)? {
            Some(record) if record.engine_id == *old => {
                self.write(&LockRecord::new(stack_id, new))?;
                debug!(stack = %stack_id, from = %old, to = %new, "lock record stolen");
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    fn release(&self, stack_id: &StackId, engine_id: &EngineId) -> Result<bool, StoreError> {
        self.exclusive(|| match self.read(stack_id)? {
            Some(record) if record.engine_id == *engine_id => {
                fs::remove_file(self.record_path(stack_id)?)?;
                crate::fsync_dir(&self.layout.locks_dir())?;
                Ok(true)
            }
            _ => Ok(false),
        })
    }

    fn holder(&self, stack_id: &StackId) -> Result<Option<EngineId>, StoreError> {
        Ok(self.read(stack_id)?.map(|record| record.engine_id))
    }
}

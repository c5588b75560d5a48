//! State management for component instances
//!
//! The [`StateStore`] trait persists one lifecycle record per instance key.
//! [`FileStateStore`] keeps every instance of a project in
//! `.rgkit/state.json`; [`MemoryStateStore`] keeps them in process.

use crate::error::{ComponentError, Result};
use crate::record::Record;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".rgkit";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const STATE_TMP: &str = "state.json.tmp";
const LOCK_FILE: &str = "lock.json";

/// Persistence of one lifecycle record per instance key
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the record of an instance; empty when nothing is persisted
    async fn load(&self, key: &str) -> Result<Record>;

    /// Overwrite the record of an instance
    async fn save(&self, key: &str, record: &Record) -> Result<()>;

    /// Remove the record of an instance. Clearing an absent key is a no-op.
    async fn clear(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self, key: &str) -> Result<Record> {
        (**self).load(key).await
    }

    async fn save(&self, key: &str, record: &Record) -> Result<()> {
        (**self).save(key, record).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        (**self).clear(key).await
    }
}

/// Contents of the state file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Instances indexed by instance key
    pub instances: BTreeMap<String, InstanceState>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            instances: BTreeMap::new(),
        }
    }
}

impl StateFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update an instance
    pub fn set_instance(&mut self, key: impl Into<String>, record: Record) {
        self.instances.insert(key.into(), InstanceState::new(record));
        self.updated_at = Utc::now();
    }

    /// Remove an instance
    pub fn remove_instance(&mut self, key: &str) -> Option<InstanceState> {
        let result = self.instances.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    pub fn get_instance(&self, key: &str) -> Option<&InstanceState> {
        self.instances.get(key)
    }
}

/// Persisted state of a single instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceState {
    /// Last merged lifecycle record
    pub record: Record,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl InstanceState {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            updated_at: Utc::now(),
        }
    }
}

/// JSON file backed state store
pub struct FileStateStore {
    /// Project root directory
    project_root: PathBuf,
}

impl FileStateStore {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    /// Path of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Read the whole state file
    pub async fn read(&self) -> Result<StateFile> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(StateFile::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: StateFile = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ComponentError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} instances", state.instances.len());
        Ok(state)
    }

    /// Write the whole state file, keeping the previous one as backup.
    ///
    /// The new content goes to a temporary file first and is renamed over
    /// `state.json`, so a failed write leaves the previous state in place.
    pub async fn write(&self, state: &StateFile) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let tmp = self.state_dir().join(STATE_TMP);

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&tmp, content).await?;

        if path.exists() {
            fs::copy(&path, self.backup_path()).await?;
            tracing::debug!("Created state backup");
        }
        fs::rename(&tmp, &path).await?;

        tracing::debug!("Saved state with {} instances", state.instances.len());
        Ok(())
    }

    /// Keys of all persisted instances
    pub async fn list(&self) -> Result<Vec<String>> {
        Ok(self.read().await?.instances.into_keys().collect())
    }

    /// Acquire a lock for exclusive access
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            // Locks older than an hour are considered abandoned
            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(ComponentError::LockError(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!("Removing stale lock from {}", lock_info.holder);
        }

        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, key: &str) -> Result<Record> {
        let state = self.read().await?;
        Ok(state
            .get_instance(key)
            .map(|instance| instance.record.clone())
            .unwrap_or_default())
    }

    async fn save(&self, key: &str, record: &Record) -> Result<()> {
        let mut state = self.read().await?;
        state.set_instance(key, record.clone());
        self.write(&state).await
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let mut state = self.read().await?;
        if state.remove_instance(key).is_some() {
            self.write(&state).await?;
        }
        Ok(())
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

/// In-process state store
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record is persisted for `key`
    pub async fn contains(&self, key: &str) -> bool {
        self.records.read().await.contains_key(key)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &str) -> Result<Record> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, key: &str, record: &Record) -> Result<()> {
        self.records
            .write()
            .await
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.records.write().await.remove(key);
        Ok(())
    }
}

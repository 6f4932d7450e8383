// Cache store for reading and writing cached data.
// Defines the key/value store seam, its file and memory backends, and TTL-gated entries.

#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};

use super::paths::sanitize_name;

/// Default TTL for aggregated statistics: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// String key/value storage with replace-on-write semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn clear(&self, key: &str) -> Result<()>;
}

/// Store that keeps each key in its own file under a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_name(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        // Write atomically via temp file
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Other("memory store lock poisoned".to_string()))
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Wrapper for cached data with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the data was cached, in unix epoch milliseconds.
    pub timestamp: i64,
}

impl<T> CacheEntry<T> {
    /// Create an entry stamped with `now`.
    pub fn new(data: T, now: DateTime<Utc>) -> Self {
        Self {
            data,
            timestamp: now.timestamp_millis(),
        }
    }

    /// Age of the entry at `now`. Entries stamped in the future have zero age.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        let millis = now.timestamp_millis().saturating_sub(self.timestamp);
        Duration::from_millis(millis.max(0) as u64)
    }

    /// An entry is valid while its age is strictly below the TTL.
    pub fn is_valid(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        !self.is_valid(ttl, now)
    }
}

/// Read and decode the entry under `key`.
pub fn read_entry<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<CacheEntry<T>>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Read the entry under `key`, returning its data only while it is fresh.
///
/// Expired or undecodable entries are removed from the store.
pub fn read_if_valid<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<Option<T>> {
    let entry = match read_entry::<T>(store, key) {
        Ok(entry) => entry,
        Err(AppError::Json(e)) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            store.clear(key)?;
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    match entry {
        Some(entry) if entry.is_valid(ttl, now) => Ok(Some(entry.data)),
        Some(entry) => {
            tracing::debug!(key, age_secs = entry.age(now).as_secs(), "Cache entry expired");
            store.clear(key)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Encode `data` as a fresh entry stamped with `now`, replacing any previous one.
pub fn write_entry<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    data: &T,
    now: DateTime<Utc>,
) -> Result<()> {
    let json = serde_json::to_string(&CacheEntry::new(data, now))?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_file_store_set_get_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("nested"));

        assert_eq!(store.get("key").unwrap(), None);

        store.set("key", "one").unwrap();
        store.set("key", "two").unwrap();
        assert_eq!(store.get("key").unwrap(), Some("two".to_string()));
        assert!(!store.root().join("key.tmp").exists());

        store.clear("key").unwrap();
        assert_eq!(store.get("key").unwrap(), None);

        // Clearing again is fine
        store.clear("key").unwrap();
    }

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));
        assert_eq!(store.len(), 1);
        store.clear("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_entry_wire_format() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let entry = CacheEntry::new(1u32, now);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "data": 1, "timestamp": 1_700_000_000_123i64 }));
    }

    #[test]
    fn test_write_and_read_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        let now = Utc::now();

        write_entry(&store, "test", &sample(), now).unwrap();

        let entry: CacheEntry<TestData> = read_entry(&store, "test").unwrap().unwrap();
        assert_eq!(entry.data, sample());
        assert_eq!(entry.timestamp, now.timestamp_millis());
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let now = Utc::now();
        let entry = CacheEntry::new("test", now - chrono::Duration::minutes(30));

        assert!(entry.is_expired(DEFAULT_TTL, now));
        assert!(entry.is_valid(DEFAULT_TTL, now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_read_if_valid_removes_expired() {
        let store = MemoryStore::new();
        let now = Utc::now();
        write_entry(&store, "k", &sample(), now - chrono::Duration::minutes(31)).unwrap();

        let read: Option<TestData> = read_if_valid(&store, "k", DEFAULT_TTL, now).unwrap();
        assert!(read.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_read_if_valid_returns_fresh() {
        let store = MemoryStore::new();
        let now = Utc::now();
        write_entry(&store, "k", &sample(), now - chrono::Duration::minutes(5)).unwrap();

        let read: Option<TestData> = read_if_valid(&store, "k", DEFAULT_TTL, now).unwrap();
        assert_eq!(read, Some(sample()));
    }

    #[test]
    fn test_read_if_valid_discards_garbage() {
        let store = MemoryStore::new();
        store.set("k", "{not json").unwrap();

        let read: Option<TestData> = read_if_valid(&store, "k", DEFAULT_TTL, Utc::now()).unwrap();
        assert!(read.is_none());
        assert!(store.get("k").unwrap().is_none());
    }
}

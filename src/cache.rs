//! Weather snapshot cache keyed by rounded coordinates
//!
//! Coordinates are rounded to 2 decimal places (~1.1 km) before keying, so
//! GPS jitter around the same spot lands on one cache record instead of
//! fanning out into duplicate upstream calls. Entries expire 15 minutes
//! after they were fetched and are removed lazily on the next read.
//!
//! The store backend and the time source are both seams: production runs
//! on a fjall keyspace and the wall clock, tests on an in-memory map and a
//! manual clock.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::config::CacheConfig;
use crate::models::WeatherSnapshot;

/// Fixed prefix for snapshot record keys
const CACHE_KEY_PREFIX: &str = "weather:";

/// Default entry time-to-live (15 minutes)
pub const CACHE_TTL: Duration = Duration::from_millis(900_000);

/// Storage backend for serialized cache records
pub trait SnapshotStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Time source, injectable so expiry is testable without real timers
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;
}

/// Wall-clock time
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

/// Persistent store backed by a fjall keyspace
pub struct FjallStore {
    store: fjall::Keyspace,
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let store = db.keyspace("weather", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store })
    }
}

impl SnapshotStore for FjallStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get(key.as_bytes())?.map(|value| value.to_vec()))
    }

    fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.store.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key.as_bytes())?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// Serialized cache record: the snapshot plus when it was fetched
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    snapshot: WeatherSnapshot,
    fetched_at: u64, // Unix timestamp (milliseconds)
}

/// Location-keyed snapshot cache with TTL-based invalidation
///
/// The cache exclusively owns its entries; writes overwrite whole records
/// and a failed write is swallowed, never surfaced to the fetch path.
pub struct WeatherCache {
    store: Box<dyn SnapshotStore>,
    clock: Box<dyn Clock>,
    ttl: Duration,
}

impl WeatherCache {
    /// Cache over the given store with the default TTL and wall clock
    #[must_use]
    pub fn new(store: Box<dyn SnapshotStore>) -> Self {
        Self {
            store,
            clock: Box::new(SystemClock),
            ttl: CACHE_TTL,
        }
    }

    /// Cache with an explicit clock and TTL
    #[must_use]
    pub fn with_clock(store: Box<dyn SnapshotStore>, clock: Box<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Persistent cache at the configured location
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let store = FjallStore::open(&config.location)?;
        Ok(Self {
            store: Box::new(store),
            clock: Box::new(SystemClock),
            ttl: Duration::from_millis(config.ttl_ms),
        })
    }

    /// Record key for a coordinate pair, rounded to ~1.1 km
    #[must_use]
    pub fn cache_key(lat: f64, lon: f64) -> String {
        format!("{CACHE_KEY_PREFIX}{lat:.2}:{lon:.2}")
    }

    /// Retrieve a fresh snapshot, if one exists
    ///
    /// Returns `None` on a miss, on an expired or malformed entry (both
    /// removed as a side effect), and on store failure.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub fn get(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot> {
        let key = Self::cache_key(lat, lon);

        let bytes = match self.store.read(&key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!("Key not found");
                return None;
            }
            Err(error) => {
                tracing::warn!("Cache read failed: {error:#}");
                return None;
            }
        };

        let entry: StoredEntry = match postcard::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!("Discarding malformed cache entry: {error}");
                self.discard(&key);
                return None;
            }
        };

        let age = self.clock.now_millis().saturating_sub(entry.fetched_at);
        if age > self.ttl.as_millis() as u64 {
            tracing::debug!("Key found but expired ({age} ms old)");
            self.discard(&key);
            return None;
        }

        tracing::debug!("Key found and still fresh ({age} ms old)");
        Some(entry.snapshot)
    }

    /// Store a snapshot under the rounded coordinate key
    ///
    /// Best-effort: a full or unavailable store must never block a fetch,
    /// so failures are logged and dropped.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, snapshot))]
    pub fn put(&self, lat: f64, lon: f64, snapshot: &WeatherSnapshot) {
        let key = Self::cache_key(lat, lon);
        let entry = StoredEntry {
            snapshot: snapshot.clone(),
            fetched_at: self.clock.now_millis(),
        };

        let bytes = match postcard::to_stdvec(&entry) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!("Failed to serialize cache entry: {error}");
                return;
            }
        };

        if let Err(error) = self.store.write(&key, bytes) {
            tracing::warn!("Cache write failed: {error:#}");
        }
    }

    fn discard(&self, key: &str) {
        if let Err(error) = self.store.remove(key) {
            tracing::warn!("Failed to remove cache entry: {error:#}");
        }
    }
}

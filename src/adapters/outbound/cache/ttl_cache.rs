use crate::ports::outbound::{self, DependencyCache};
use crate::shared::Result;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::future::Future;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

/// Snapshot file name inside the cache directory
pub const CACHE_FILE_NAME: &str = "cache.json";

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Settings for [`TtlCache::open`]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub default_ttl: Duration,
    /// Zero disables the background sweep
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// `<platform cache dir>/action-deps`
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("action-deps")
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    value: Value,
    expires_at: DateTime<Utc>,
    size: usize,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration) -> Self {
        let size = serde_json::to_vec(&value).map(|bytes| bytes.len()).unwrap_or(0);
        Self {
            value,
            expires_at: Utc::now() + to_time_delta(ttl),
            size,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// TTLs beyond a century are clamped so the expiry stays representable
fn to_time_delta(ttl: Duration) -> chrono::Duration {
    let max = chrono::Duration::days(36_500);
    chrono::Duration::from_std(ttl)
        .map(|delta| delta.min(max))
        .unwrap_or(max)
}

/// Point-in-time numbers reported by [`TtlCache::stats`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Entries past their expiry that the sweep has not removed yet
    pub expired_entries: usize,
    pub total_size: usize,
    pub cache_dir: PathBuf,
}

struct Shared {
    entries: RwLock<HashMap<String, CacheEntry>>,
    file_path: PathBuf,
    pending: Mutex<JoinSet<()>>,
}

impl Shared {
    fn save(&self) -> Result<()> {
        let snapshot = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        write_snapshot(&self.file_path, &snapshot)
    }

    /// Saves on the blocking pool when a runtime is available, inline otherwise
    fn persist_async(self: &Arc<Self>) {
        let Ok(handle) = Handle::try_current() else {
            if let Err(e) = self.save() {
                warn!(error = %e, "Failed to persist cache");
            }
            return;
        };

        let shared = Arc::clone(self);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while pending.try_join_next().is_some() {}
        pending.spawn_blocking_on(
            move || {
                if let Err(e) = shared.save() {
                    warn!(error = %e, "Failed to persist cache");
                }
            },
            &handle,
        );
    }

    /// Removes expired entries, returning how many were dropped
    fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// TtlCache adapter: in-memory TTL map with a JSON snapshot on disk
///
/// Reads never touch the disk. Every mutation schedules a save of the whole
/// map; [`TtlCache::close`] waits for those saves and writes once more so the
/// last mutation is never lost.
pub struct TtlCache {
    shared: Arc<Shared>,
    cache_dir: PathBuf,
    default_ttl: Duration,
    shutdown: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl TtlCache {
    /// Opens the cache, loading `cache.json` from `config.dir` if present
    ///
    /// The sweep task only starts when called inside a tokio runtime.
    pub fn open(config: CacheConfig) -> Result<Self> {
        fs::create_dir_all(&config.dir).with_context(|| {
            format!("Failed to create cache directory {}", config.dir.display())
        })?;

        let file_path = config.dir.join(CACHE_FILE_NAME);
        let entries = load_snapshot(&file_path);
        debug!(path = %file_path.display(), entries = entries.len(), "Opened cache");

        let shared = Arc::new(Shared {
            entries: RwLock::new(entries),
            file_path,
            pending: Mutex::new(JoinSet::new()),
        });

        let (shutdown, shutdown_rx) = watch::channel(false);
        let sweeper = spawn_sweeper(Arc::clone(&shared), config.sweep_interval, shutdown_rx);

        Ok(Self {
            shared,
            cache_dir: config.dir,
            default_ttl: config.default_ttl,
            shutdown,
            sweeper: Mutex::new(sweeper),
        })
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self
            .shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(Utc::now()))
            .map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: &str, value: Value) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        self.shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.shared.persist_async();
    }

    pub fn delete(&self, key: &str) {
        let removed = self
            .shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        if removed {
            self.shared.persist_async();
        }
    }

    pub fn clear(&self) {
        self.shared
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.shared.persist_async();
    }

    pub fn stats(&self) -> CacheStats {
        let now = Utc::now();
        let entries = self
            .shared
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        CacheStats {
            total_entries: entries.len(),
            expired_entries: entries.values().filter(|e| e.is_expired(now)).count(),
            total_size: entries.values().map(|e| e.size).sum(),
            cache_dir: self.cache_dir.clone(),
        }
    }

    /// Path of the snapshot file
    pub fn file_path(&self) -> &Path {
        &self.shared.file_path
    }

    /// Cached value, or the producer's value stored under the default TTL
    pub async fn get_or_set<F, Fut>(&self, key: &str, producer: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        outbound::get_or_set(self, key, None, producer).await
    }

    /// Stops the sweep, drains in-flight saves, then saves once more
    pub async fn close(&self) -> Result<()> {
        let _ = self.shutdown.send(true);

        let sweeper = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sweeper) = sweeper {
            if let Err(e) = sweeper.await {
                debug!(error = %e, "Cache sweep task ended abnormally");
            }
        }

        let mut pending = std::mem::take(
            &mut *self
                .shared
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Cache save task failed");
            }
        }

        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || shared.save())
            .await
            .context("Final cache save did not complete")?
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

impl DependencyCache for TtlCache {
    fn get(&self, key: &str) -> Option<Value> {
        TtlCache::get(self, key)
    }

    fn set(&self, key: &str, value: Value) {
        TtlCache::set(self, key, value)
    }

    fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        TtlCache::set_with_ttl(self, key, value, ttl)
    }
}

fn spawn_sweeper(
    shared: Arc<Shared>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }
    let handle = Handle::try_current().ok()?;

    Some(handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = shared.sweep();
                    if removed > 0 {
                        debug!(removed, "Swept expired cache entries");
                        shared.persist_async();
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }))
}

/// Missing or unreadable snapshots start an empty cache
fn load_snapshot(path: &Path) -> HashMap<String, CacheEntry> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cache snapshot");
            return HashMap::new();
        }
    };

    match serde_json::from_str::<HashMap<String, CacheEntry>>(&content) {
        Ok(mut entries) => {
            let now = Utc::now();
            entries.retain(|_, entry| !entry.is_expired(now));
            entries
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt cache snapshot");
            HashMap::new()
        }
    }
}

/// Whole-file overwrite through a temporary file in the same directory
fn write_snapshot(path: &Path, entries: &HashMap<String, CacheEntry>) -> Result<()> {
    let ordered: BTreeMap<&String, &CacheEntry> = entries.iter().collect();
    let json = serde_json::to_vec(&ordered)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(&json)?;
    file.persist(path)
        .with_context(|| format!("Failed to write cache snapshot {}", path.display()))?;
    Ok(())
}

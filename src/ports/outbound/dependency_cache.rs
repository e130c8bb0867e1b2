use crate::shared::Result;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// DependencyCache port: the capability the analyzer needs from a cache
///
/// Values are JSON documents so that any implementation can persist them.
/// Implementations must tolerate concurrent callers.
pub trait DependencyCache: Send + Sync {
    /// Returns the value if present and not expired
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores the value with the cache's default TTL
    fn set(&self, key: &str, value: Value);

    /// Stores the value with an explicit TTL
    fn set_with_ttl(&self, key: &str, value: Value, ttl: Duration);
}

/// Cache key for the latest release of `owner/repo`
pub fn latest_version_key(owner: &str, repo: &str) -> String {
    format!("latest:{}/{}", owner, repo)
}

/// Cache key for the repository metadata of `owner/repo`
pub fn repository_key(owner: &str, repo: &str) -> String {
    format!("repo:{}/{}", owner, repo)
}

/// Returns the cached value, or runs `producer` and caches what it returns
///
/// A failing producer leaves the key untouched. `ttl` of `None` uses the
/// cache default.
pub async fn get_or_set<C, F, Fut>(
    cache: &C,
    key: &str,
    ttl: Option<Duration>,
    producer: F,
) -> Result<Value>
where
    C: DependencyCache + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    if let Some(value) = cache.get(key) {
        return Ok(value);
    }

    let value = producer().await?;
    match ttl {
        Some(ttl) => cache.set_with_ttl(key, value.clone(), ttl),
        None => cache.set(key, value.clone()),
    }
    Ok(value)
}

/// Cache adapters implementing the DependencyCache port
mod null_cache;
mod ttl_cache;

pub use null_cache::NullCache;
pub use ttl_cache::{CacheConfig, CacheStats, TtlCache, CACHE_FILE_NAME};

use crate::ports::outbound::DependencyCache;
use serde_json::Value;
use std::time::Duration;

/// NullCache adapter used when caching is disabled
///
/// Every lookup misses and every write is dropped, so each analysis run
/// goes to the remote API.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

impl DependencyCache for NullCache {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    fn set(&self, _key: &str, _value: Value) {}

    fn set_with_ttl(&self, _key: &str, _value: Value, _ttl: Duration) {}
}

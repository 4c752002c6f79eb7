use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Key-value cache whose entries expire after a fixed TTL. A change of the
/// active filter drops every entry.
#[derive(Debug)]
pub struct TtlCache<K, V, F = ()> {
    ttl: Duration,
    filter: Option<F>,
    entries: HashMap<K, (Instant, V)>,
}

impl<K, V, F> TtlCache<K, V, F>
where
    K: Eq + Hash,
    F: PartialEq,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            filter: None,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|(stored_at, _)| now.saturating_duration_since(*stored_at) < self.ttl)
            .map(|(_, value)| value)
    }

    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, (now, value));
    }

    /// Returns true when the filter changed and the cache was cleared.
    pub fn set_filter(&mut self, filter: F) -> bool {
        if self.filter.as_ref() == Some(&filter) {
            return false;
        }

        let changed = self.filter.is_some();
        self.filter = Some(filter);
        if changed {
            self.invalidate_all();
        }
        changed
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

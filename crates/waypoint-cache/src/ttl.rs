use crate::clock::{Clock, SystemClock};
use jiff::{SignedDuration, Timestamp};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tracing::{debug, trace};
use waypoint_core::constants::DEFAULT_CACHE_TTL;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Timestamp,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// A key-value cache where every entry carries an absolute expiry time.
///
/// Expiry is checked lazily: [`get`](Self::get) and [`has`](Self::has) evict
/// an expired entry when they see it, and [`prune`](Self::prune) sweeps the
/// whole map. There is no background task, so [`size`](Self::size) may count
/// entries that have expired but were not touched since.
///
/// All operations take one lock per cache instance.
#[derive(Debug)]
pub struct TtlCache<K, V, C = SystemClock> {
    entries: Mutex<HashMap<K, Entry<V>>>,
    default_ttl: Duration,
    clock: C,
}

impl<K, V> TtlCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache with a default TTL of five minutes.
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_CACHE_TTL)
    }

    /// Creates an empty cache whose [`set_default`](Self::set_default) uses `ttl`.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<K, V> Default for TtlCache<K, V, SystemClock>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash,
    V: Clone,
    C: Clock,
{
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Stores `value` under `key` until `ttl` from now, replacing any previous entry.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now();
        let expires_at = SignedDuration::try_from(ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl).ok())
            .unwrap_or(Timestamp::MAX);

        self.entries.lock().insert(key, Entry { value, expires_at });
        trace!(expires_at = %expires_at, "cached entry");
    }

    /// Stores `value` under `key` with the default TTL.
    pub fn set_default(&self, key: K, value: V) {
        self.set(key, value, self.default_ttl);
    }

    /// Returns the value for `key`, or `None` if it is missing or expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let entry = entries.get(key)?;
        if entry.is_expired(now) {
            entries.remove(key);
            trace!("evicted expired entry on read");
            return None;
        }

        Some(entry.value.clone())
    }

    /// Returns true if `key` holds a value that has not expired.
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                trace!("evicted expired entry on lookup");
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Removes `key`. Returns true if an entry (expired or not) was present.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn size(&self) -> usize {
        self.entries.lock().len()
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.lock();

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!(removed, remaining = entries.len(), "pruned expired entries");
        }
        removed
    }
}

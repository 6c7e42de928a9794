//! City-pair distance memoization
//!
//! Process-lifetime map from a normalized, order-sensitive city pair to an
//! integer kilometer distance. Entries are valid for a configurable TTL
//! (30 days by default); stale entries are not proactively evicted, they
//! are superseded by the next write after an expiry check fails. Nothing
//! is persisted: the cache resets on restart.
//!
//! The map sits behind a `std::sync::Mutex` that is never held across an
//! await. Concurrent resolutions of the same uncached pair may therefore
//! both miss and both call upstream; the second write simply supersedes
//! the first.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Time source for expiry checks, injectable so tests can move time
/// deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    distance_km: u32,
    cached_at: DateTime<Utc>,
}

/// In-memory TTL cache keyed on normalized city pairs.
pub struct CityPairCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl CityPairCache {
    pub fn new(ttl_days: i64) -> Self {
        Self::with_clock(ttl_days, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl_days: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: Duration::days(ttl_days),
            clock,
        }
    }

    /// Build the cache key for a city pair.
    ///
    /// Each side is trimmed, lowercased and stripped of diacritics, then
    /// the two are joined with `|`. The key is order-sensitive:
    /// `key("Casablanca", "Rabat")` and `key("Rabat", "Casablanca")` are
    /// distinct entries.
    pub fn key(from_city: &str, to_city: &str) -> String {
        format!("{}|{}", normalize_city(from_city), normalize_city(to_city))
    }

    /// Look up a distance, returning `None` for absent or expired entries.
    /// Expired entries are left in place; a subsequent insert overwrites
    /// them.
    pub fn get(&self, key: &str) -> Option<u32> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        if self.clock.now() - entry.cached_at < self.ttl {
            Some(entry.distance_km)
        } else {
            None
        }
    }

    /// Record a freshly computed distance, superseding any prior entry.
    pub fn insert(&self, key: String, distance_km: u32) {
        let entry = CacheEntry {
            distance_km,
            cached_at: self.clock.now(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, entry);
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Normalize a city name for cache keying: trim, lowercase, fold
/// diacritics to ASCII. City names in this market are French/Latin
/// spellings (Tétouan, Kénitra, Salé), so a table-driven fold covers the
/// alphabet actually seen in production data.
pub fn normalize_city(city: &str) -> String {
    let mut out = String::with_capacity(city.len());
    for c in city.trim().to_lowercase().chars() {
        match c {
            'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => out.push('a'),
            'ç' => out.push('c'),
            'è' | 'é' | 'ê' | 'ë' => out.push('e'),
            'ì' | 'í' | 'î' | 'ï' => out.push('i'),
            'ñ' => out.push('n'),
            'ò' | 'ó' | 'ô' | 'õ' | 'ö' => out.push('o'),
            'ù' | 'ú' | 'û' | 'ü' => out.push('u'),
            'ý' | 'ÿ' => out.push('y'),
            'æ' => out.push_str("ae"),
            'œ' => out.push_str("oe"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    /// Clock that only moves when told to.
    struct ManualClock {
        now: StdMutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: StdMutex::new(start),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    #[test]
    fn key_folds_case_whitespace_and_diacritics() {
        assert_eq!(
            CityPairCache::key("Tétouan", "Kénitra"),
            CityPairCache::key(" tetouan ", "KENITRA"),
        );
        assert_eq!(CityPairCache::key("Salé", "Béni Mellal"), "sale|beni mellal");
    }

    #[test]
    fn key_is_order_sensitive() {
        assert_ne!(
            CityPairCache::key("Casablanca", "Rabat"),
            CityPairCache::key("Rabat", "Casablanca"),
        );
    }

    #[test]
    fn fresh_entry_is_returned_verbatim() {
        let cache = CityPairCache::new(30);
        let key = CityPairCache::key("Casablanca", "Rabat");
        cache.insert(key.clone(), 87);
        assert_eq!(cache.get(&key), Some(87));
    }

    #[test]
    fn missing_entry_returns_none() {
        let cache = CityPairCache::new(30);
        assert_eq!(cache.get("casablanca|rabat"), None);
    }

    #[test]
    fn entry_expires_at_ttl_boundary() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = CityPairCache::with_clock(30, clock.clone());
        let key = CityPairCache::key("Casablanca", "Agadir");
        cache.insert(key.clone(), 460);

        clock.advance(Duration::days(29));
        assert_eq!(cache.get(&key), Some(460), "29 days old is still fresh");

        clock.advance(Duration::days(1));
        assert_eq!(cache.get(&key), None, "30 days old is expired");
        // Expired entries stay resident until superseded.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_supersedes_expired_entry() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = CityPairCache::with_clock(30, clock.clone());
        let key = CityPairCache::key("Fès", "Oujda");
        cache.insert(key.clone(), 340);

        clock.advance(Duration::days(31));
        assert_eq!(cache.get(&key), None);

        cache.insert(key.clone(), 345);
        assert_eq!(cache.get(&key), Some(345));
        assert_eq!(cache.len(), 1);
    }
}

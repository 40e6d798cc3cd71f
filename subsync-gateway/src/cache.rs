//! Time-bounded response cache for expensive read operations.
//!
//! One JSON record per key at `<dir>/<key>.json`, shaped
//! `{fetched_at, payload}`. A record older than the freshness window is a
//! miss; so is a corrupt or unreadable record — the cache never surfaces an
//! error to readers. Writes persist immediately so a later run observes
//! them before expiry.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// On-disk cache record.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    fetched_at: DateTime<Utc>,
    payload: serde_json::Value,
}

/// File-backed key/value cache with a freshness window.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    freshness: Duration,
}

impl ResponseCache {
    /// Cache rooted at `dir` with the default 1-hour freshness window.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_freshness(dir, Duration::hours(1))
    }

    pub fn with_freshness(dir: impl Into<PathBuf>, freshness: Duration) -> Self {
        Self {
            dir: dir.into(),
            freshness,
        }
    }

    /// `<dir>/<key>.json` — pure, no I/O.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Fetch a fresh cached payload, or `None` on miss.
    ///
    /// Absent, expired, corrupt, and unreadable records are all misses;
    /// stale data is never returned silently.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.record_path(key);
        let contents = std::fs::read_to_string(&path).ok()?;
        let record: CacheRecord = serde_json::from_str(&contents).ok()?;
        if Utc::now() - record.fetched_at > self.freshness {
            tracing::debug!("cache expired: {key}");
            return None;
        }
        serde_json::from_value(record.payload).ok()
    }

    /// Store `payload` under `key` with the current timestamp, overwriting
    /// any prior record.
    ///
    /// A failed cache write is logged and swallowed — losing a cache entry
    /// must never fail the operation that produced it.
    pub fn put<T: Serialize>(&self, key: &str, payload: &T) {
        if let Err(err) = self.try_put(key, payload) {
            tracing::warn!("could not write cache record '{key}': {err}");
        }
    }

    fn try_put<T: Serialize>(&self, key: &str, payload: &T) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let record = CacheRecord {
            fetched_at: Utc::now(),
            payload: serde_json::to_value(payload)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let path = self.record_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Drop the record for `key`, if any. Used after a write operation
    /// changes the state a read key would report.
    pub fn invalidate(&self, key: &str) {
        let path = self.record_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!("cache invalidated: {key}"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("could not invalidate cache record '{key}': {err}"),
        }
    }
}

/// Write a record with an explicit `fetched_at`, bypassing the clock.
/// Test-only seam for expiry coverage.
#[cfg(test)]
pub(crate) fn write_record_at<T: Serialize>(
    cache: &ResponseCache,
    key: &str,
    payload: &T,
    fetched_at: DateTime<Utc>,
) {
    std::fs::create_dir_all(&cache.dir).unwrap();
    let record = CacheRecord {
        fetched_at,
        payload: serde_json::to_value(payload).unwrap(),
    };
    std::fs::write(
        cache.record_path(key),
        serde_json::to_string(&record).unwrap(),
    )
    .unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn get_after_put_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        cache.put("videos_UCx", &vec!["a".to_string(), "b".to_string()]);
        let got: Option<Vec<String>> = cache.get("videos_UCx");
        assert_eq!(got, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn missing_record_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        assert_eq!(cache.get::<Vec<String>>("nothing"), None);
    }

    #[test]
    fn expired_record_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        write_record_at(
            &cache,
            "old",
            &vec![1, 2, 3],
            Utc::now() - Duration::hours(2),
        );
        assert_eq!(cache.get::<Vec<i32>>("old"), None);
    }

    #[test]
    fn record_within_window_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        write_record_at(
            &cache,
            "recent",
            &vec![1, 2, 3],
            Utc::now() - Duration::minutes(30),
        );
        assert_eq!(cache.get::<Vec<i32>>("recent"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn corrupt_record_is_a_miss_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        std::fs::create_dir_all(tmp.path()).unwrap();
        std::fs::write(cache.record_path("bad"), "{not json at all").unwrap();
        assert_eq!(cache.get::<Vec<i32>>("bad"), None);
    }

    #[test]
    fn payload_type_mismatch_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        cache.put("shape", &"just a string");
        assert_eq!(cache.get::<Vec<i32>>("shape"), None);
    }

    #[test]
    fn invalidate_removes_the_record() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        cache.put("gone", &42);
        cache.invalidate("gone");
        assert_eq!(cache.get::<i32>("gone"), None);
        // A second invalidate of an absent key is a no-op.
        cache.invalidate("gone");
    }

    #[test]
    fn put_overwrites_prior_record() {
        let tmp = TempDir::new().unwrap();
        let cache = ResponseCache::new(tmp.path());
        cache.put("k", &1);
        cache.put("k", &2);
        assert_eq!(cache.get::<i32>("k"), Some(2));
    }
}

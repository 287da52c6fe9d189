use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

const CACHE_VERSION: u32 = 1;
const CACHE_FILE: &str = "http_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct HttpCacheFile {
    version: u32,
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub body: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetched_at: u64,
}

/// Conditional-GET response cache, one JSON file per data directory. Owned by
/// the fetcher rather than shared as process-global state.
#[derive(Debug)]
pub struct HttpCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl HttpCache {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(CACHE_FILE);
        let entries = load_cache_file(&path)
            .map(|cache| cache.entries)
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    /// Insert-or-replace and persist. A cache write failure only costs a
    /// future revalidation, so it is logged and swallowed.
    pub fn put(&mut self, url: &str, entry: CacheEntry) {
        self.entries.insert(url.to_string(), entry);
        if let Err(err) = self.save() {
            debug!("http cache not persisted: {err}");
        }
    }

    fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let cache = HttpCacheFile {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&cache).map_err(std::io::Error::other)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

fn load_cache_file(path: &Path) -> Option<HttpCacheFile> {
    let raw = fs::read_to_string(path).ok()?;
    let cache = serde_json::from_str::<HttpCacheFile>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = HttpCache::open(dir.path());
        assert!(cache.get("https://example.org").is_none());
    }

    #[test]
    fn put_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = HttpCache::open(dir.path());
        cache.put(
            "https://example.org/page",
            CacheEntry {
                body: "<html></html>".to_string(),
                etag: Some("\"abc\"".to_string()),
                last_modified: None,
                fetched_at: now_secs(),
            },
        );

        let reopened = HttpCache::open(dir.path());
        let entry = reopened.get("https://example.org/page").unwrap();
        assert_eq!(entry.body, "<html></html>");
        assert_eq!(entry.etag.as_deref(), Some("\"abc\""));
    }
}

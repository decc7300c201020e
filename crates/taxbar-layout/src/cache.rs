//! Persisted label metrics, keyed by the identity of a whole request set.

use crate::metrics::{LabelMeasurer, MeasureRequest, MeasureResponse};
use crate::{Error, Result};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Mutex;

const CACHE_FORMAT_VERSION: u32 = 1;

/// Stable fingerprint of a request set; independent of request order.
pub fn request_set_key(requests: &[MeasureRequest]) -> String {
    let mut sorted = requests.iter().collect::<Vec<_>>();
    sorted.sort();
    let mut hasher = FxHasher::default();
    sorted.len().hash(&mut hasher);
    for r in sorted {
        r.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsCache {
    version: u32,
    entries: IndexMap<String, Vec<MeasureResponse>>,
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCache {
    pub fn new() -> Self {
        Self {
            version: CACHE_FORMAT_VERSION,
            entries: IndexMap::new(),
        }
    }

    /// Loads a cache file; a missing file or an older format yields an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(err.into()),
        };
        let cache: Self = serde_json::from_str(&text)?;
        if cache.version != CACHE_FORMAT_VERSION {
            tracing::info!(
                path = %path.display(),
                found = cache.version,
                expected = CACHE_FORMAT_VERSION,
                "discarding metrics cache with a different format version"
            );
            return Ok(Self::new());
        }
        Ok(cache)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&[MeasureResponse]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn insert(&mut self, key: String, responses: Vec<MeasureResponse>) {
        self.entries.insert(key, responses);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serves measurements from a [`MetricsCache`] and falls back to `inner` on a miss.
///
/// With `refresh` set, lookups are skipped but fresh results still replace the cached ones.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: Mutex<MetricsCache>,
    refresh: bool,
}

impl<M: LabelMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M, cache: MetricsCache) -> Self {
        Self {
            inner,
            cache: Mutex::new(cache),
            refresh: false,
        }
    }

    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn into_cache(self) -> MetricsCache {
        self.cache
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.lock()?.save(path)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MetricsCache>> {
        self.cache.lock().map_err(|_| Error::MetricsBackend {
            message: "metrics cache lock poisoned".to_string(),
        })
    }
}

impl<M: LabelMeasurer> LabelMeasurer for CachedMeasurer<M> {
    fn measure(&self, requests: &[MeasureRequest]) -> Result<Vec<MeasureResponse>> {
        let key = request_set_key(requests);
        if !self.refresh {
            if let Some(hit) = self.lock()?.get(&key) {
                tracing::info!(key = %key, requests = requests.len(), "label metrics cache hit");
                return Ok(hit.to_vec());
            }
        }
        tracing::info!(
            key = %key,
            requests = requests.len(),
            refresh = self.refresh,
            "measuring labels"
        );
        let fresh = self.inner.measure(requests)?;
        self.lock()?.insert(key, fresh.clone());
        Ok(fresh)
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use url::Url;

use crate::error::{CacheStoreError, OgpError};
use crate::models::OgpData;

use super::fetcher::OgpFetcher;

/// Key-value store with per-entry expiry. Eviction and persistence belong to
/// the implementation.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError>;
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError>;
}

type Entries = HashMap<String, (String, Instant, Duration)>;

/// In-process store. Expired entries are removed when read.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>, CacheStoreError> {
        self.entries
            .lock()
            .map_err(|_| CacheStoreError("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some((value, stored_at, ttl)) if stored_at.elapsed() < *ttl => Ok(Some(value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        self.lock()?
            .insert(key.to_string(), (value, Instant::now(), ttl));
        Ok(())
    }
}

/// Get-or-compute-and-store in front of [`OgpFetcher`].
///
/// Keys are the caller's URL string as given; equivalent spellings of the
/// same URL are cached separately. Concurrent misses each fetch.
#[derive(Clone)]
pub struct CacheFront {
    fetcher: OgpFetcher,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheFront {
    pub fn new(fetcher: OgpFetcher, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        CacheFront {
            fetcher,
            store,
            ttl,
        }
    }

    pub async fn get_cached_ogp(&self, url: &str) -> Result<OgpData, OgpError> {
        if let Some(cached) = self.lookup(url).await {
            tracing::debug!(url, "OGP cache hit");
            return Ok(cached);
        }

        let parsed = parse_target(url)?;
        let data = self.fetcher.fetch_ogp(&parsed).await?;

        match serde_json::to_string(&data) {
            Ok(payload) => {
                if let Err(e) = self.store.put(url, payload, self.ttl).await {
                    tracing::warn!(error = %e, url, "Failed to store OGP data");
                }
            }
            Err(e) => tracing::warn!(error = %e, url, "Failed to serialize OGP data"),
        }

        Ok(data)
    }

    async fn lookup(&self, url: &str) -> Option<OgpData> {
        let payload = match self.store.get(url).await {
            Ok(payload) => payload?,
            Err(e) => {
                tracing::warn!(error = %e, url, "Cache lookup failed");
                return None;
            }
        };
        serde_json::from_str(&payload)
            .map_err(|e| tracing::warn!(error = %e, url, "Discarding undecodable cache entry"))
            .ok()
    }
}

/// Only absolute http(s) URLs are fetched.
fn parse_target(url: &str) -> Result<Url, OgpError> {
    let invalid = || OgpError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(invalid()),
    }
}

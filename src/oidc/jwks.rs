//! Signing key set retrieval with a short-lived cache
//!
//! Keys are fetched from the identity provider's `jwks.json` endpoint. A fetched
//! set is reused for `cache_ttl`; with a zero TTL every lookup goes to the
//! network. Lookups that arrive while a fetch is in flight wait for that fetch
//! instead of queueing their own, so a slow identity provider costs a request at
//! most one round-trip. A failed fetch never falls back to an expired set.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::{watch, Mutex, RwLock};

use super::types::SigningKeySet;
use crate::auth::AuthError;
use crate::error::Result;

type FetchOutcome = std::result::Result<KeySetSnapshot, AuthError>;

/// A key set together with where it came from
#[derive(Debug, Clone)]
pub struct KeySetSnapshot {
    pub keys: Arc<SigningKeySet>,
    pub fetched_at: Instant,
    /// True when served from cache rather than fetched for this lookup
    pub from_cache: bool,
}

#[derive(Debug)]
struct CachedKeySet {
    keys: Arc<SigningKeySet>,
    fetched_at: Instant,
}

impl CachedKeySet {
    fn snapshot(&self) -> KeySetSnapshot {
        KeySetSnapshot {
            keys: self.keys.clone(),
            fetched_at: self.fetched_at,
            from_cache: true,
        }
    }
}

/// Fetches and caches the identity provider's signing keys
#[derive(Debug, Clone)]
pub struct KeySetFetcher {
    http_client: Client,
    jwks_url: String,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    cache: Arc<RwLock<Option<CachedKeySet>>>,
    in_flight: Arc<Mutex<Option<watch::Receiver<Option<FetchOutcome>>>>>,
}

impl KeySetFetcher {
    /// Create a fetcher for `jwks_url`
    pub fn new(jwks_url: &str, cache_ttl: Duration, http_timeout: Duration) -> Result<Self> {
        if !jwks_url.starts_with("https://") {
            tracing::warn!("JWKS URL should use HTTPS: {}", jwks_url);
        }

        let http_client = Client::builder().timeout(http_timeout).build()?;

        Ok(Self {
            http_client,
            jwks_url: jwks_url.to_string(),
            cache_ttl,
            min_refresh_interval: Duration::ZERO,
            cache: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(Mutex::new(None)),
        })
    }

    /// Minimum age of a key set before an unknown key id may trigger a refetch
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Fetch the key set from the network, bypassing the cache
    pub async fn fetch(&self) -> std::result::Result<SigningKeySet, AuthError> {
        tracing::debug!("Fetching JWKS from: {}", self.jwks_url);

        let response = self
            .http_client
            .get(&self.jwks_url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch JWKS: {}", e);
                AuthError::KeySetUnavailable(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::error!("JWKS endpoint returned status: {}", response.status());
            return Err(AuthError::KeySetUnavailable(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(|e| {
            AuthError::KeySetUnavailable(format!("failed to read response: {}", e))
        })?;

        let keys: SigningKeySet = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse JWKS response: {}", e);
            AuthError::KeySetUnavailable(format!("unexpected response shape: {}", e))
        })?;

        tracing::debug!("Fetched {} signing keys", keys.keys.len());
        Ok(keys)
    }

    /// Current key set, from cache while it is fresh
    pub async fn key_set(&self) -> FetchOutcome {
        if let Some(snapshot) = self.cached().await {
            return Ok(snapshot);
        }
        self.fetch_shared().await
    }

    /// Re-fetch after a lookup in the snapshot fetched at `seen` came up empty
    ///
    /// Returns the newer set when another request already replaced that
    /// snapshot, and `None` when the snapshot is younger than the minimum
    /// refresh interval.
    pub async fn refresh(
        &self,
        seen: Instant,
    ) -> std::result::Result<Option<KeySetSnapshot>, AuthError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at > seen {
                return Ok(Some(cached.snapshot()));
            }
        }

        if seen.elapsed() < self.min_refresh_interval {
            tracing::debug!(
                "JWKS fetched {:?} ago, not refreshing before {:?}",
                seen.elapsed(),
                self.min_refresh_interval
            );
            return Ok(None);
        }

        self.fetch_shared().await.map(Some)
    }

    /// Join the fetch in flight, or start one
    ///
    /// The fetch runs in its own task so a caller that goes away cannot
    /// abandon it halfway for everyone else waiting on it.
    async fn fetch_shared(&self) -> FetchOutcome {
        let mut rx = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.as_ref() {
                Some(rx) => rx.clone(),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *in_flight = Some(rx.clone());

                    let fetcher = self.clone();
                    tokio::spawn(async move {
                        let outcome = fetcher.fetch_and_store().await;
                        fetcher.in_flight.lock().await.take();
                        tx.send_replace(Some(outcome));
                    });
                    rx
                }
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .ok()
            .and_then(|outcome| outcome.clone());

        outcome.unwrap_or_else(|| {
            Err(AuthError::KeySetUnavailable(
                "key set fetch ended without a result".to_string(),
            ))
        })
    }

    async fn fetch_and_store(&self) -> FetchOutcome {
        let keys = Arc::new(self.fetch().await?);
        let fetched_at = Instant::now();

        *self.cache.write().await = Some(CachedKeySet {
            keys: keys.clone(),
            fetched_at,
        });
        tracing::info!("JWKS cache updated with {} keys", keys.keys.len());

        Ok(KeySetSnapshot {
            keys,
            fetched_at,
            from_cache: false,
        })
    }

    async fn cached(&self) -> Option<KeySetSnapshot> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(CachedKeySet::snapshot)
    }
}

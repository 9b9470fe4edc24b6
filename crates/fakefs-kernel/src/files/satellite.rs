//! `sat.jpg`: a remote image behind a short-lived cache.
//!
//! Reads inside the freshness window are served from memory. A stale read
//! refetches through the [`FetchClient`]; the new payload replaces the old
//! one only after the whole body has arrived, so a failed refresh leaves the
//! previous entry intact. The entry lock is held across the refresh, so
//! concurrent stale reads trigger one fetch, not several.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;

use crate::audit::AuditLog;
use crate::clock::Clock;
use crate::fetch::{FetchClient, FetchError};
use crate::vfs::{CallContext, ReadHandler, VfsError, VfsResult};

/// Image fetched by default.
pub const DEFAULT_URL: &str = "https://cdn.star.nesdis.noaa.gov/GOES18/ABI/SECTOR/pnw/13/600x600.jpg";

/// Largest payload kept: 300 KiB.
pub const DEFAULT_CAPACITY: usize = 300 * 1024;

/// How long a fetched payload is served without refetching.
pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

/// Upper bound on one fetch session.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Message returned when the fetch client is not reachable.
pub const UNAVAILABLE: &str = "run webfs first";

/// Cache tuning.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub url: String,
    pub ttl: Duration,
    pub capacity: usize,
    pub fetch_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    payload: Vec<u8>,
    fetched_at: Option<SystemTime>,
}

impl CacheEntry {
    fn is_fresh(&self, now: SystemTime, ttl: Duration) -> bool {
        match self.fetched_at {
            None => false,
            // A clock that stepped backwards makes the entry stale.
            Some(at) => now.duration_since(at).map(|age| age < ttl).unwrap_or(false),
        }
    }
}

/// Time-bounded cache of one remote payload.
pub struct FetchCache {
    policy: CachePolicy,
    client: Arc<dyn FetchClient>,
    clock: Arc<dyn Clock>,
    audit: Arc<AuditLog>,
    entry: Mutex<CacheEntry>,
}

impl std::fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCache")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FetchCache {
    pub fn new(
        policy: CachePolicy,
        client: Arc<dyn FetchClient>,
        clock: Arc<dyn Clock>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            policy,
            client,
            clock,
            audit,
            entry: Mutex::new(CacheEntry::default()),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// When the current payload was fetched, if ever.
    pub async fn fetched_at(&self) -> Option<SystemTime> {
        self.entry.lock().await.fetched_at
    }

    /// A copy of the cached payload, whatever its age.
    pub async fn cached(&self) -> Vec<u8> {
        self.entry.lock().await.payload.clone()
    }

    /// Return the payload, refreshing it first if stale.
    #[tracing::instrument(skip(self), name = "fakefs.sat", fields(url = %self.policy.url))]
    pub async fn get(&self) -> VfsResult<Vec<u8>> {
        let mut entry = self.entry.lock().await;

        if entry.is_fresh(self.clock.now(), self.policy.ttl) {
            self.audit
                .record(&format!("sat served cached {} bytes", entry.payload.len()));
            return Ok(entry.payload.clone());
        }

        if !self.client.is_available().await {
            return Err(VfsError::unavailable(UNAVAILABLE));
        }

        let payload = match self.fetch().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(error = %e, "sat refresh failed, keeping previous entry");
                return Err(e.into());
            }
        };

        entry.fetched_at = Some(self.clock.now());
        entry.payload = payload;

        self.audit
            .record(&format!("sat read done with {} bytes", entry.payload.len()));
        tracing::info!(bytes = entry.payload.len(), "sat refreshed");
        Ok(entry.payload.clone())
    }

    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        let session = self.client.fetch(&self.policy.url, self.policy.capacity);
        let mut payload = tokio::time::timeout(self.policy.fetch_timeout, session)
            .await
            .map_err(|_| FetchError::TimedOut(self.policy.fetch_timeout))??;
        payload.truncate(self.policy.capacity);
        Ok(payload)
    }
}

#[async_trait]
impl ReadHandler for FetchCache {
    async fn read(&self, _ctx: CallContext<'_>) -> VfsResult<Vec<u8>> {
        self.get().await
    }
}

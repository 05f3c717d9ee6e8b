//! Time-to-live cache for the fetched roster
//!
//! The cache holds a single roster snapshot. A snapshot younger than the time-to-live is
//! served as is; an older one is replaced by a fresh fetch from the source. The slot lock
//! is held across the refresh, so concurrent callers wait for one fetch instead of
//! starting their own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::Roster;
use crate::reader::RosterSource;

#[derive(Debug, Clone)]
struct CachedRoster {
    roster: Arc<Roster>,
    fetched_at: Instant,
    fetched_at_utc: DateTime<Utc>,
}

impl CachedRoster {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Single-slot roster cache in front of a source
pub struct RosterCache<S> {
    source: S,
    ttl: Duration,
    slot: Mutex<Option<CachedRoster>>,
}

impl<S: RosterSource> RosterCache<S> {
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `source` - Source fetched on a miss
    /// * `ttl` - How long a fetched roster is served before it is fetched again
    #[must_use]
    pub const fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Create an empty cache with the configured time-to-live
    #[must_use]
    pub const fn from_config(source: S, config: &DashboardConfig) -> Self {
        Self::new(source, config.cache_ttl())
    }

    /// Return the cached roster, fetching it when absent or expired
    ///
    /// # Errors
    /// Returns the source's error on a failed fetch; the previous snapshot is kept
    pub fn get(&self) -> Result<Arc<Roster>> {
        self.get_at(Instant::now())
    }

    /// Return the roster as seen at `now`
    ///
    /// # Errors
    /// Returns the source's error on a failed fetch; the previous snapshot is kept
    pub fn get_at(&self, now: Instant) -> Result<Arc<Roster>> {
        let mut slot = self.lock();

        if let Some(cached) = slot.as_ref().filter(|c| c.is_fresh(now, self.ttl)) {
            log::debug!(
                "Serving cached roster from {} ({} rows)",
                self.source.describe(),
                cached.roster.num_rows()
            );
            return Ok(Arc::clone(&cached.roster));
        }

        log::info!("Fetching roster from {}", self.source.describe());
        let roster = Arc::new(self.source.read_roster()?);

        *slot = Some(CachedRoster {
            roster: Arc::clone(&roster),
            fetched_at: now,
            fetched_at_utc: Utc::now(),
        });

        Ok(roster)
    }

    /// Discard the cached snapshot so the next lookup fetches
    pub fn invalidate(&self) {
        if self.lock().take().is_some() {
            log::debug!("Invalidated cached roster from {}", self.source.describe());
        }
    }

    /// Age of the cached snapshot, if any
    #[must_use]
    pub fn snapshot_age(&self) -> Option<Duration> {
        self.lock().as_ref().map(|c| c.fetched_at.elapsed())
    }

    /// Wall-clock time of the last successful fetch
    #[must_use]
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.lock().as_ref().map(|c| c.fetched_at_utc)
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedRoster>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: RosterSource + 'static> RosterCache<S> {
    /// Look up the roster on tokio's blocking pool
    ///
    /// # Errors
    /// Returns the source's error on a failed fetch, or an IO error if the blocking task
    /// panics
    pub async fn get_async(self: &Arc<Self>) -> Result<Arc<Roster>> {
        let cache = Arc::clone(self);
        tokio::task::spawn_blocking(move || cache.get())
            .await
            .map_err(std::io::Error::from)?
    }
}

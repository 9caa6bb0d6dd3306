use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::codegen::{generate_short_code, validate_requested_code, validate_url};
use super::{Storage, StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::models::{NewLink, ShortLink, Visitor};

/// Random codes tried at one length before moving to the next
const MAX_ATTEMPTS_PER_LENGTH: usize = 8;

/// Upper bound on a TTL, roughly 100 years
const MAX_TTL_MINUTES: f64 = 100.0 * 365.25 * 24.0 * 60.0;

struct StoredLink {
    /// Insertion order, breaks `created_at` ties in `list()`
    seq: u64,
    link: ShortLink,
}

/// In-memory mapping store.
///
/// Entries live in a `DashMap`, so every check-then-insert and every
/// read-then-append runs under the lock of the shard owning the code, while
/// operations on codes in other shards proceed in parallel.
pub struct MemoryStorage {
    links: DashMap<String, StoredLink>,
    /// Codes whose entries were swept. Never handed out again.
    retired: DashSet<String>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl MemoryStorage {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            links: DashMap::new(),
            retired: DashSet::new(),
            next_seq: AtomicU64::new(0),
            clock,
            config,
        }
    }

    /// Remove entries that expired more than `retention` ago and return how many were dropped.
    /// A negative retention counts as zero, so live links are never removed.
    ///
    /// Removal holds the shard lock, so it never overlaps a resolve on the same
    /// entry. Removed codes are retired before the lock is released.
    pub fn sweep_expired(&self, retention: Duration) -> usize {
        let retention = retention.max(Duration::zero());
        let Some(cutoff) = self.clock.now().checked_sub_signed(retention) else {
            return 0;
        };

        let mut removed = 0;
        self.links.retain(|code, stored| {
            if stored.link.expires_at <= cutoff {
                self.retired.insert(code.clone());
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            info!(removed, "swept expired links");
        }
        removed
    }

    fn ttl_for(&self, ttl_minutes: Option<f64>) -> StoreResult<Duration> {
        let minutes = match ttl_minutes {
            Some(minutes) if minutes > 0.0 => minutes,
            _ => self.config.default_ttl_minutes,
        };

        if !minutes.is_finite() || minutes <= 0.0 || minutes > MAX_TTL_MINUTES {
            return Err(StoreError::InvalidInput(format!(
                "TTL of {minutes} minutes is out of range"
            )));
        }

        // Round up so any positive TTL yields expires_at > created_at
        Ok(Duration::microseconds((minutes * 60_000_000.0).ceil() as i64))
    }

    /// Insert under the shard lock if the code is free. `None` means taken.
    fn try_insert(
        &self,
        short_code: String,
        original_url: &str,
        ttl: Duration,
    ) -> StoreResult<Option<ShortLink>> {
        match self.links.entry(short_code) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(vacant) => {
                if self.retired.contains(vacant.key()) {
                    return Ok(None);
                }

                let created_at = self.clock.now();
                let expires_at = created_at.checked_add_signed(ttl).ok_or_else(|| {
                    StoreError::InvalidInput("TTL overflows the timestamp range".to_string())
                })?;

                let link = ShortLink {
                    short_code: vacant.key().clone(),
                    original_url: original_url.to_string(),
                    created_at,
                    expires_at,
                    clicks: Vec::new(),
                };
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                vacant.insert(StoredLink {
                    seq,
                    link: link.clone(),
                });

                Ok(Some(link))
            }
        }
    }

    fn insert_generated(
        &self,
        original_url: &str,
        ttl: Duration,
        code_length: Option<usize>,
    ) -> StoreResult<ShortLink> {
        let max_length = self.config.max_code_length;
        let start = code_length.unwrap_or(self.config.code_length);
        if start == 0 || start > max_length {
            return Err(StoreError::InvalidInput(format!(
                "generated code length must be 1-{max_length}"
            )));
        }

        for length in start..=max_length {
            for _ in 0..MAX_ATTEMPTS_PER_LENGTH {
                let code = generate_short_code(length);
                if let Some(link) = self.try_insert(code, original_url, ttl)? {
                    return Ok(link);
                }
            }
            warn!(length, "short code collisions exhausted attempts, extending length");
        }

        Err(StoreError::CodeSpaceExhausted)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Storage for MemoryStorage {
    fn create(&self, new_link: NewLink) -> StoreResult<ShortLink> {
        validate_url(&new_link.original_url)?;
        let ttl = self.ttl_for(new_link.ttl_minutes)?;

        let link = match new_link.requested_code {
            Some(code) => {
                validate_requested_code(&code, self.config.max_code_length)?;
                self.try_insert(code.clone(), &new_link.original_url, ttl)?
                    .ok_or(StoreError::CodeConflict(code))?
            }
            None => {
                self.insert_generated(&new_link.original_url, ttl, new_link.code_length)?
            }
        };

        debug!(short_code = %link.short_code, expires_at = %link.expires_at, "created link");
        Ok(link)
    }

    fn resolve(&self, short_code: &str, visitor: Visitor) -> StoreResult<String> {
        let Some(mut stored) = self.links.get_mut(short_code) else {
            if self.retired.contains(short_code) {
                return Err(StoreError::Expired(short_code.to_string()));
            }
            return Err(StoreError::NotFound(short_code.to_string()));
        };

        let now = self.clock.now();
        if stored.link.is_expired_at(now) {
            return Err(StoreError::Expired(short_code.to_string()));
        }

        stored.link.clicks.push(visitor.into_click(now));
        Ok(stored.link.original_url.clone())
    }

    /// Ordered by `created_at`, then by insertion sequence for identical timestamps
    fn list(&self) -> Vec<ShortLink> {
        let mut snapshot: Vec<(u64, ShortLink)> = self
            .links
            .iter()
            .map(|entry| (entry.seq, entry.link.clone()))
            .collect();
        snapshot.sort_unstable_by(|(a_seq, a), (b_seq, b)| {
            a.created_at.cmp(&b.created_at).then(a_seq.cmp(b_seq))
        });
        snapshot.into_iter().map(|(_, link)| link).collect()
    }
}

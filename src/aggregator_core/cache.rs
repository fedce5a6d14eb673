//! Time-to-live cache of daily rows keyed by window length
//!
//! Sits between the dashboard and the aggregator. Each window length has its
//! own slot; the slot lock is held across a fetch so concurrent callers for
//! the same window wait for one query instead of issuing their own. Entries are
//! replaced whole, never merged.

use super::types::{DailyCount, WindowDays};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct CachedRows {
    pub rows: Arc<Vec<DailyCount>>,
    pub fetched_at: Instant,
}

impl CachedRows {
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

type Slot = Arc<Mutex<Option<CachedRows>>>;

#[derive(Debug)]
pub struct WindowCache {
    ttl: Duration,
    slots: RwLock<HashMap<WindowDays, Slot>>,
}

impl WindowCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_or_fetch<F, E>(&self, window: WindowDays, fetch: F) -> Result<Arc<Vec<DailyCount>>, E>
    where
        F: FnOnce() -> Result<Vec<DailyCount>, E>,
    {
        self.get_or_fetch_at(window, Instant::now(), fetch)
    }

    /// Same as [`Self::get_or_fetch`] with an explicit clock reading.
    ///
    /// A failed fetch leaves the previous entry (if any) untouched and is not
    /// cached.
    pub fn get_or_fetch_at<F, E>(
        &self,
        window: WindowDays,
        now: Instant,
        fetch: F,
    ) -> Result<Arc<Vec<DailyCount>>, E>
    where
        F: FnOnce() -> Result<Vec<DailyCount>, E>,
    {
        let slot = self.slot(window);
        let mut entry = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(cached) = entry.as_ref().filter(|c| c.is_fresh(now, self.ttl)) {
            log::debug!("Cache hit for window {}", window);
            return Ok(Arc::clone(&cached.rows));
        }

        log::debug!("Cache miss for window {}, fetching", window);
        let rows = Arc::new(fetch()?);
        *entry = Some(CachedRows {
            rows: Arc::clone(&rows),
            fetched_at: now,
        });
        Ok(rows)
    }

    /// Current entry for `window`, fresh or not
    pub fn peek(&self, window: WindowDays) -> Option<CachedRows> {
        let slots = self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let slot = slots.get(&window)?;
        let entry = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        entry.clone()
    }

    pub fn invalidate(&self, window: WindowDays) {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&window)
        {
            *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        }
    }

    /// Empty every slot. Slots stay registered so a fetch already in flight
    /// still lands where the next caller looks.
    pub fn clear(&self) {
        let slots = self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        for slot in slots.values() {
            *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        }
    }

    fn slot(&self, window: WindowDays) -> Slot {
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&window)
        {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(slots.entry(window).or_default())
    }
}

impl Default for WindowCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

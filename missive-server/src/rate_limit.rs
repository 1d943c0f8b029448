//! Per-client rate limiting using a sliding window
//!
//! Each client identifier maps to the instants of its recent accepted
//! requests. On every check the instants older than the window are dropped
//! and the rest are counted:
//!
//! ```text
//! window: 10 min, max: 6
//! - 6 requests in the last 10 minutes -> rejected, nothing recorded
//! - 5 requests in the last 10 minutes -> accepted, "now" recorded
//! ```
//!
//! The table lives behind [`RateLimitStore`] so a shared store can replace
//! the in-process [`MemoryStore`] when several instances serve the endpoint.

use std::{
    collections::VecDeque,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::RateLimitConfig;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a [`RateLimiter`].
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Outcome of recording one request against a client's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request was recorded; `remaining` more fit in the window
    Allowed { remaining: usize },
    /// The window is full and the request was not recorded
    Limited,
}

/// Storage for per-client request history.
///
/// `hit` must prune, count and record as one step for a given key.
pub trait RateLimitStore: Send + Sync {
    fn hit(&self, key: &str, now: Instant, window: Duration, max: usize) -> RateLimitDecision;

    /// Number of clients currently holding an entry
    fn tracked_clients(&self) -> usize;
}

/// In-process store, optionally bounded in the number of clients.
///
/// When a new client arrives at a full store, clients with nothing left in
/// their window are dropped first, then the least recently active.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, VecDeque<Instant>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store tracking at most `capacity` clients. Zero means unbounded.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: (capacity > 0).then_some(capacity),
        }
    }

    fn make_room(&self, now: Instant, window: Duration, capacity: usize) {
        self.entries
            .retain(|_, instants| instants.back().is_some_and(|t| in_window(now, *t, window)));

        while self.entries.len() >= capacity {
            let idle = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().back().copied())
                .map(|entry| entry.key().clone());

            let Some(idle) = idle else {
                break;
            };

            tracing::debug!(client = %idle, "Evicting rate limit entry");
            self.entries.remove(&idle);
        }
    }
}

impl RateLimitStore for MemoryStore {
    fn hit(&self, key: &str, now: Instant, window: Duration, max: usize) -> RateLimitDecision {
        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(key) && self.entries.len() >= capacity {
                self.make_room(now, window, capacity);
            }
        }

        let mut entry = self.entries.entry(key.to_string()).or_default();
        let instants = entry.value_mut();

        while instants
            .front()
            .is_some_and(|t| !in_window(now, *t, window))
        {
            instants.pop_front();
        }

        if instants.len() >= max {
            return RateLimitDecision::Limited;
        }

        instants.push_back(now);
        RateLimitDecision::Allowed {
            remaining: max - instants.len(),
        }
    }

    fn tracked_clients(&self) -> usize {
        self.entries.len()
    }
}

fn in_window(now: Instant, at: Instant, window: Duration) -> bool {
    now.saturating_duration_since(at) <= window
}

/// Decides whether a client may submit right now
pub struct RateLimiter {
    enabled: bool,
    window: Duration,
    max_requests: usize,
    clock: Arc<dyn Clock>,
    store: Arc<dyn RateLimitStore>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("enabled", &self.enabled)
            .field("window", &self.window)
            .field("max_requests", &self.max_requests)
            .field("tracked_clients", &self.store.tracked_clients())
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// A limiter on the system clock with an in-process store
    #[must_use]
    pub fn new(config: &RateLimitConfig) -> Self {
        let store = config
            .capacity
            .map_or_else(MemoryStore::new, MemoryStore::bounded);

        Self {
            enabled: config.enabled,
            window: config.window(),
            max_requests: config.max_requests,
            clock: Arc::new(SystemClock),
            store: Arc::new(store),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: impl RateLimitStore + 'static) -> Self {
        self.store = Arc::new(store);
        self
    }

    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.store.tracked_clients()
    }

    /// Record a request from `client`.
    ///
    /// # Errors
    ///
    /// Returns how long the client should wait before retrying if its
    /// window is already full.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        if !self.enabled {
            return Ok(());
        }

        match self
            .store
            .hit(client, self.clock.now(), self.window, self.max_requests)
        {
            RateLimitDecision::Allowed { remaining } => {
                tracing::trace!(client, remaining, "Rate limit check passed");
                Ok(())
            }
            RateLimitDecision::Limited => {
                tracing::debug!(
                    client,
                    window_secs = self.window.as_secs(),
                    max_requests = self.max_requests,
                    "Rate limit exceeded"
                );
                Err(self.window)
            }
        }
    }
}

//! Per-client sliding window rate limiter
//!
//! Tracks request timestamps per (client address, tier) pair over a 60
//! second window. Writes get stricter limits than reads so triggering
//! mining or audits stays bounded. Rejections are final; nothing queues.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Window length in milliseconds
const WINDOW_MS: u64 = 60_000;

/// Request class, each with its own limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Fact submission (triggers mining)
    Submit,
    /// Attachment upload
    Upload,
    /// Chain reads and audits
    Read,
}

type Clock = Box<dyn Fn() -> u64 + Send + Sync>;

/// Sliding window limiter over client addresses
pub struct RateLimiter {
    windows: Mutex<HashMap<(IpAddr, Tier), VecDeque<u64>>>,
    clock: Clock,
}

impl RateLimiter {
    /// Create a limiter using system time
    pub fn new() -> Self {
        Self::with_clock(Box::new(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        }))
    }

    /// Create with a custom clock (for deterministic tests)
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Record a request and report whether it is within the limit.
    ///
    /// Timestamps older than the window are dropped before counting, so
    /// the window truly slides rather than resetting in steps. Clients
    /// whose every timestamp has aged out are removed entirely; the map
    /// never retains an entry per address seen over the process lifetime.
    pub fn check(&self, client: IpAddr, tier: Tier, limit: u32) -> bool {
        let now = (self.clock)();
        let mut windows = self.windows.lock().unwrap();

        windows.retain(|_, window| {
            while let Some(&front) = window.front() {
                if front + WINDOW_MS <= now {
                    window.pop_front();
                } else {
                    break;
                }
            }
            !window.is_empty()
        });

        let window = windows.entry((client, tier)).or_default();
        if window.len() >= limit as usize {
            return false;
        }
        window.push_back(now);
        true
    }

    #[cfg(test)]
    fn tracked_entries(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

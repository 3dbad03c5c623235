//! Per-IP connection rate limiting.
//!
//! Uses the `governor` crate's token bucket: one new connection per second
//! per IP, with a configurable burst. This gates admission only; per-command
//! pacing of game traffic is the job of [`super::throttle`].

use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;
use tracing::debug;

/// Type alias for governor's direct rate limiter.
type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Entries kept before [`ConnectionRateLimiter::cleanup`] starts over.
const MAX_ENTRIES: usize = 10_000;

/// Thread-safe per-IP connection limiter.
#[derive(Debug)]
pub struct ConnectionRateLimiter {
    limiters: DashMap<IpAddr, DirectRateLimiter>,
    burst: NonZeroU32,
}

impl ConnectionRateLimiter {
    /// A zero burst is treated as one.
    pub fn new(burst_per_ip: u32) -> Self {
        Self {
            limiters: DashMap::new(),
            burst: NonZeroU32::new(burst_per_ip).unwrap_or(NonZeroU32::MIN),
        }
    }

    /// Check if an IP can make a new connection.
    ///
    /// Returns `true` if allowed, `false` if rate limited.
    pub fn check_connection_rate(&self, ip: IpAddr) -> bool {
        let limiter = self.limiters.entry(ip).or_insert_with(|| {
            GovRateLimiter::direct(Quota::per_second(NonZeroU32::MIN).allow_burst(self.burst))
        });

        let allowed = limiter.check().is_ok();
        if !allowed {
            debug!(ip = %ip, "connection rate limit exceeded");
        }
        allowed
    }

    /// Drop all state once the table grows too large.
    ///
    /// Call periodically from a maintenance task.
    pub fn cleanup(&self) {
        if self.limiters.len() > MAX_ENTRIES {
            self.limiters.clear();
            debug!("cleared connection rate limiters (exceeded {} entries)", MAX_ENTRIES);
        }
    }

    /// Number of tracked IPs.
    pub fn tracked(&self) -> usize {
        self.limiters.len()
    }
}

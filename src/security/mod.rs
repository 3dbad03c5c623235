//! Security module for onyxd.
//!
//! - **Session Guard**: content and authentication checks on game packets
//! - **Throttle**: per-session, per-command cooldowns
//! - **Rate Limiting**: governor-based per-IP connection admission
//! - **Password**: handshake digests and key generation
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Security Module                       │
//! ├───────────────┬────────────────┬─────────────┬───────────┤
//! │ SessionGuard  │ ThrottleRegistry│ Rate Limit │ Password  │
//! │ reserved char │ key -> cooldown │  Governor  │ SHA-256   │
//! │ login check   │ per-session ts  │  per IP    │ subtle    │
//! └───────────────┴────────────────┴─────────────┴───────────┘
//! ```

pub mod guard;
pub mod password;
pub mod rate_limit;
pub mod throttle;

pub use guard::{GuardViolation, SessionGuard};
pub use rate_limit::ConnectionRateLimiter;
pub use throttle::{Clock, SystemClock, ThrottleDecision, ThrottleRegistry};

#[cfg(test)]
pub use throttle::ManualClock;

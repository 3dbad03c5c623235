//! Per-session command cooldowns.
//!
//! The registry is built once from configuration and is read-only after
//! startup. The per-command timestamps live on the [`Session`], so one
//! client's traffic never throttles another's.

use crate::config::ThrottleConfig;
use crate::state::Session;
use onyx_proto::CommandKey;
use std::collections::HashMap;

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Settable clock for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock(std::sync::atomic::AtomicI64);

#[cfg(test)]
impl ManualClock {
    pub fn at(now: i64) -> Self {
        Self(std::sync::atomic::AtomicI64::new(now))
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Result of a throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// The command has no cooldown.
    Unthrottled,
    /// Allowed; the next one is allowed at `next_allowed`.
    Allowed { next_allowed: i64 },
    /// Too soon. Drop silently.
    Throttled { retry_at: i64 },
}

impl ThrottleDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Throttled { .. })
    }
}

/// Command key to cooldown in seconds.
#[derive(Debug, Clone, Default)]
pub struct ThrottleRegistry {
    cooldowns: HashMap<String, i64>,
}

impl ThrottleRegistry {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        Self {
            cooldowns: entries
                .into_iter()
                .map(|(k, secs)| (k.into(), i64::try_from(secs).unwrap_or(i64::MAX)))
                .collect(),
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.iter())
    }

    pub fn cooldown(&self, key: &str) -> Option<i64> {
        self.cooldowns.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cooldowns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cooldowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty()
    }

    /// Check `key` for `session` at `now`, updating the stored timestamp on
    /// success. A throttled call leaves the timestamp unchanged.
    pub fn check(&self, session: &mut Session, key: &CommandKey, now: i64) -> ThrottleDecision {
        let Some(cooldown) = self.cooldown(key.as_str()) else {
            return ThrottleDecision::Unthrottled;
        };

        if let Some(next) = session.next_allowed(key.as_str())
            && now < next
        {
            return ThrottleDecision::Throttled { retry_at: next };
        }

        let next_allowed = now.saturating_add(cooldown);
        session.set_next_allowed(key.as_str(), next_allowed);
        ThrottleDecision::Allowed { next_allowed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_session;

    fn registry() -> ThrottleRegistry {
        ThrottleRegistry::from_config(&ThrottleConfig::default())
    }

    #[test]
    fn unlisted_commands_are_never_throttled() {
        let registry = registry();
        let mut session = test_session();
        let key = CommandKey::parse("u#h");
        for _ in 0..5 {
            assert_eq!(registry.check(&mut session, &key, 100), ThrottleDecision::Unthrottled);
        }
        assert_eq!(session.throttled_keys(), 0);
    }

    #[test]
    fn second_call_inside_cooldown_is_dropped() {
        let registry = registry();
        let mut session = test_session();
        let key = CommandKey::parse("u#sf");

        assert_eq!(
            registry.check(&mut session, &key, 100),
            ThrottleDecision::Allowed { next_allowed: 102 }
        );
        assert_eq!(
            registry.check(&mut session, &key, 101),
            ThrottleDecision::Throttled { retry_at: 102 }
        );
        // A dropped call does not extend the window.
        assert_eq!(session.next_allowed("u#sf"), Some(102));
    }

    #[test]
    fn call_at_or_after_cooldown_is_allowed() {
        let registry = registry();
        let mut session = test_session();
        let key = CommandKey::parse("u#sf");

        assert!(registry.check(&mut session, &key, 100).is_allowed());
        assert!(registry.check(&mut session, &key, 102).is_allowed());
        assert!(registry.check(&mut session, &key, 110).is_allowed());
        assert_eq!(session.next_allowed("u#sf"), Some(112));
    }

    #[test]
    fn keys_are_independent() {
        let registry = registry();
        let mut session = test_session();
        assert!(registry.check(&mut session, &CommandKey::parse("u#sf"), 100).is_allowed());
        assert!(registry.check(&mut session, &CommandKey::parse("u#sa"), 100).is_allowed());
        assert!(!registry.check(&mut session, &CommandKey::parse("u#sa"), 101).is_allowed());
    }

    #[test]
    fn sessions_are_independent() {
        let registry = registry();
        let key = CommandKey::parse("u#sg");
        let mut first = test_session();
        let mut second = test_session();
        assert!(registry.check(&mut first, &key, 100).is_allowed());
        assert!(registry.check(&mut second, &key, 100).is_allowed());
        assert!(!registry.check(&mut first, &key, 104).is_allowed());
    }

    #[test]
    fn keys_are_case_sensitive() {
        let registry = ThrottleRegistry::new([("u#sf", 2)]);
        let mut session = test_session();
        assert_eq!(
            registry.check(&mut session, &CommandKey::parse("U#SF"), 1),
            ThrottleDecision::Unthrottled
        );
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at(50);
        clock.advance(3);
        assert_eq!(clock.now(), 53);
        assert!(SystemClock.now() > 1_600_000_000);
    }
}

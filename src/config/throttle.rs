//! Per-command cooldown table.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::defaults::DEFAULT_COOLDOWNS;

/// Command key to cooldown in seconds.
///
/// A `[throttle]` section replaces the whole default table.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ThrottleConfig(pub BTreeMap<String, u64>);

impl ThrottleConfig {
    pub fn cooldown(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self(
            DEFAULT_COOLDOWNS
                .iter()
                .map(|(key, secs)| (key.to_string(), *secs))
                .collect(),
        )
    }
}

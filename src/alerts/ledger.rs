use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::types::AlertKey;

/// How long an alerted pass is remembered after its AOS.
pub const RETENTION: Duration = Duration::hours(2);

/// Alerts already emitted, keyed by (pass, class) with the time they fired.
#[derive(Debug, Clone, Default)]
pub struct AlertLedger {
    entries: HashMap<AlertKey, DateTime<Utc>>,
}

impl AlertLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &AlertKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Record `key` as fired at `at`. Returns false if it was already recorded,
    /// in which case the original time is kept.
    pub fn insert(&mut self, key: AlertKey, at: DateTime<Utc>) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.insert(key, at);
        true
    }

    pub fn fired_at(&self, key: &AlertKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entry whose pass rose before `now - retention`.
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let cutoff = now - retention;
        let before = self.entries.len();
        self.entries.retain(|key, _| key.aos >= cutoff);
        before - self.entries.len()
    }

    pub fn pruned(mut self, now: DateTime<Utc>, retention: Duration) -> Self {
        self.prune(now, retention);
        self
    }
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::PresenceRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub record: PresenceRecord,
    pub cached_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(record: PresenceRecord, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            record,
            cached_at,
            ttl,
        }
    }

    /// An entry is valid while `now - cached_at < ttl`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = chrono::Duration::from_std(self.ttl) else {
            return true;
        };
        now.signed_duration_since(self.cached_at) < ttl
    }
}

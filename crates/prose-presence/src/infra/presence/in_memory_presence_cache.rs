// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::trace;

use crate::app::deps::DynTimeProvider;
use crate::domain::presence::models::{CacheEntry, PresenceRecord};
use crate::domain::presence::repos::PresenceCache;
use crate::domain::shared::models::UserId;

pub struct InMemoryPresenceCache {
    time_provider: DynTimeProvider,
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<UserId, CacheEntry>>,
}

impl InMemoryPresenceCache {
    pub fn new(time_provider: DynTimeProvider, ttl: Duration, capacity: usize) -> Self {
        Self {
            time_provider,
            ttl,
            capacity: capacity.max(1),
            entries: Default::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PresenceCache for InMemoryPresenceCache {
    fn get(&self, user_id: &UserId) -> Option<PresenceRecord> {
        let now = self.time_provider.now();
        self.entries
            .read()
            .get(user_id)
            .filter(|entry| entry.is_valid_at(now))
            .map(|entry| entry.record.clone())
    }

    fn put(&self, record: PresenceRecord) {
        let now = self.time_provider.now();
        let mut entries = self.entries.write();

        if let Some(existing) = entries.get(&record.user_id) {
            if existing.record.is_newer_than(&record) {
                trace!("Ignoring outdated presence of {}.", record.user_id);
                return;
            }
        }

        entries.insert(
            record.user_id.clone(),
            CacheEntry::new(record, now, self.ttl),
        );

        if entries.len() <= self.capacity {
            return;
        }

        entries.retain(|_, entry| entry.is_valid_at(now));

        while entries.len() > self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.cached_at)
                .map(|(user_id, _)| user_id.clone())
            else {
                break;
            };
            entries.remove(&oldest);
        }
    }

    fn clear(&self) {
        self.entries.write().clear()
    }
}

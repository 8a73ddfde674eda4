// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::presence::models::{PresenceRecord, PresenceStatus};
use crate::domain::shared::models::UserId;

/// Decides which records of a channel are delivered, and when.
///
/// - Records that aren't newer than the latest accepted record of the same user are dropped.
/// - Online records are delivered immediately and cancel a pending Offline.
/// - An Offline record following a delivered Online is held back for `window`. The first such
///   record schedules a single check; later records don't move it. At the check the latest
///   record is delivered if it's still Offline.
/// - Any other Offline record is delivered immediately.
pub struct PresenceDebouncer {
    window: Duration,
    users: HashMap<UserId, UserState>,
}

#[derive(Default)]
struct UserState {
    latest: Option<PresenceRecord>,
    delivered: Option<PresenceStatus>,
    pending: Option<Instant>,
}

impl PresenceDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            users: Default::default(),
        }
    }

    /// Starts from records that were delivered before, e.g. by an earlier channel for the same
    /// targets.
    pub fn with_baseline(
        delivered: impl IntoIterator<Item = PresenceRecord>,
        window: Duration,
    ) -> Self {
        let mut debouncer = Self::new(window);
        for record in delivered {
            debouncer.users.insert(
                record.user_id.clone(),
                UserState {
                    delivered: Some(record.status),
                    latest: Some(record),
                    pending: None,
                },
            );
        }
        debouncer
    }

    /// Returns the record if it should be delivered right away.
    pub fn accept(&mut self, record: PresenceRecord, now: Instant) -> Option<PresenceRecord> {
        let user = self.users.entry(record.user_id.clone()).or_default();

        if let Some(latest) = &user.latest {
            if !record.is_newer_than(latest) {
                return None;
            }
        }
        user.latest = Some(record.clone());

        match record.status {
            PresenceStatus::Online => {
                user.pending = None;
            }
            PresenceStatus::Offline if user.delivered == Some(PresenceStatus::Online) => {
                if user.pending.is_none() {
                    user.pending = Some(now + self.window);
                }
                return None;
            }
            PresenceStatus::Offline => (),
        }

        user.delivered = Some(record.status);
        Some(record)
    }

    /// Returns the held back records whose check is due at `now`.
    pub fn flush_due(&mut self, now: Instant) -> Vec<PresenceRecord> {
        let mut due = vec![];

        for user in self.users.values_mut() {
            match user.pending {
                Some(deadline) if deadline <= now => (),
                _ => continue,
            }
            user.pending = None;

            let Some(latest) = &user.latest else {
                continue;
            };
            if latest.status == PresenceStatus::Offline {
                user.delivered = Some(PresenceStatus::Offline);
                due.push(latest.clone());
            }
        }

        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.users.values().filter_map(|user| user.pending).min()
    }
}

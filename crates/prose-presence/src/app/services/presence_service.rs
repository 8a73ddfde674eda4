// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use chrono::{DateTime, Utc};

use prose_presence_macros::InjectDependencies;

use crate::app::deps::{
    DynConnectionHealthMonitor, DynPresenceCache, DynPresenceSubscriber, DynTimeProvider,
};
use crate::domain::connection::models::ConnectionState;
use crate::domain::presence::models::{
    format_last_seen, PresenceRecord, PresenceUpdate, SubscriptionHandle, TargetSet,
};
use crate::domain::shared::models::UserId;

/// What to render for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceDisplay {
    /// Show the live indicator.
    Online,
    LastSeen { at: DateTime<Utc>, label: String },
    /// Nothing (unexpired) is known about the user. Render like offline, without a last seen.
    Unknown,
}

#[derive(InjectDependencies)]
pub struct PresenceService {
    #[inject]
    cache: DynPresenceCache,
    #[inject]
    connection_monitor: DynConnectionHealthMonitor,
    #[inject]
    presence_subscriber: DynPresenceSubscriber,
    #[inject]
    time_provider: DynTimeProvider,
}

impl PresenceService {
    /// Observes `user_ids` until the returned handle is cancelled or dropped. `on_change` is
    /// called on a background task.
    pub fn observe(
        &self,
        user_ids: impl IntoIterator<Item = UserId>,
        on_change: impl Fn(PresenceUpdate) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.presence_subscriber
            .observe(user_ids.into_iter().collect::<TargetSet>(), Arc::new(on_change))
    }

    pub fn cancel(&self, handle: SubscriptionHandle) {
        handle.cancel()
    }

    /// Snapshot read of the local cache. Expired entries count as offline.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.cache.is_online(user_id)
    }

    pub fn cached_presence(&self, user_id: &UserId) -> Option<PresenceRecord> {
        self.cache.get(user_id)
    }

    pub fn presence_display(&self, user_id: &UserId) -> PresenceDisplay {
        let Some(record) = self.cache.get(user_id) else {
            return PresenceDisplay::Unknown;
        };

        let is_connected = self.connection_monitor.state() == ConnectionState::Connected;
        if record.is_online() && is_connected {
            return PresenceDisplay::Online;
        }

        PresenceDisplay::LastSeen {
            at: record.last_seen,
            label: format_last_seen(record.last_seen, self.time_provider.now()),
        }
    }
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::shared::models::UserId;

use super::PresenceRecord;

/// Invoked on a background task for every delivered update. Implementations are expected to
/// hand the update over to the UI thread themselves.
pub type PresenceCallback = Arc<dyn Fn(PresenceUpdate) + Send + Sync>;

/// The records that changed in one delivery, keyed by user.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceUpdate {
    pub records: HashMap<UserId, PresenceRecord>,
    /// How long the rendering layer should take to fade between the old and new state.
    pub fade_hint: Duration,
}

impl PresenceUpdate {
    pub fn new(records: impl IntoIterator<Item = PresenceRecord>, fade_hint: Duration) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.user_id.clone(), record))
                .collect(),
            fade_hint,
        }
    }

    pub fn get(&self, user_id: &UserId) -> Option<&PresenceRecord> {
        self.records.get(user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

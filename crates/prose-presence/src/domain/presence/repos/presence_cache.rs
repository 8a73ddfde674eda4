// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::presence::models::PresenceRecord;
use crate::domain::shared::models::UserId;

/// A bounded local copy of recently delivered presence records.
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait PresenceCache: Send + Sync {
    /// Returns the cached record for `user_id` if it hasn't expired yet.
    fn get(&self, user_id: &UserId) -> Option<PresenceRecord>;

    /// Stores `record` unless a newer record for the same user is cached already.
    fn put(&self, record: PresenceRecord);

    /// Returns true only if an unexpired record says the user is online.
    fn is_online(&self, user_id: &UserId) -> bool {
        self.get(user_id)
            .map(|record| record.is_online())
            .unwrap_or(false)
    }

    fn clear(&self);
}

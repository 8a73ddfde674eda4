// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::presence::models::{PresenceStatus, WriteError};
use crate::domain::shared::models::UserId;

#[async_trait]
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait PresenceWriter: Send + Sync {
    /// Writes `status` for `user_id`, retrying transient failures with exponential backoff.
    /// Any newer call supersedes this one; a superseded call returns `WriteError::Superseded`
    /// without touching the store again.
    async fn set_status(&self, user_id: &UserId, status: PresenceStatus) -> Result<(), WriteError>;

    /// Writes the most recently requested status again, e.g. after a reconnect. Does nothing if
    /// no status was requested yet.
    async fn resend_last_intended(&self) -> Result<(), WriteError>;

    /// The most recently requested status, whether or not it was written successfully.
    fn last_intended(&self) -> Option<(UserId, PresenceStatus)>;

    /// Forgets the last requested status.
    fn reset(&self);
}

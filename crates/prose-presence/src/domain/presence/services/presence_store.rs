// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::connection::models::SessionId;
use crate::domain::presence::models::{
    DisconnectAction, PresenceRecord, PresenceWriteRequest, StoreError, SubscribeError, TargetSet,
};
use crate::domain::shared::models::UserId;

/// Records pushed by the store for one subscription. The first items are the current records of
/// all targets, followed by every later change. The stream ends, or yields an error, when the
/// channel goes away.
pub type PresenceFeed = BoxStream<'static, Result<PresenceRecord, SubscribeError>>;

/// The remote realtime store holding one presence record per user.
///
/// A session is a lease kept alive with `keep_alive`. When the store stops hearing from a
/// session for longer than its timeout it executes the session's registered `DisconnectAction`.
#[async_trait]
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait PresenceStore: Send + Sync {
    async fn open_session(&self, user_id: &UserId) -> Result<SessionId, StoreError>;
    async fn keep_alive(&self, session_id: &SessionId) -> Result<(), StoreError>;
    /// Ends the session cleanly. A registered disconnect action is not executed.
    async fn close_session(&self, session_id: &SessionId) -> Result<(), StoreError>;

    /// Writes the record of `user_id`. The store stamps `last_seen` itself and returns the
    /// record as persisted. Fails with `Unauthorized` if the session belongs to another user.
    async fn put_presence(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        request: PresenceWriteRequest,
    ) -> Result<PresenceRecord, StoreError>;

    /// Registers `action` to be executed once the session is lost. Replaces any previously
    /// registered action of the session.
    async fn set_on_disconnect(
        &self,
        session_id: &SessionId,
        action: DisconnectAction,
    ) -> Result<(), StoreError>;
    async fn cancel_on_disconnect(&self, session_id: &SessionId) -> Result<(), StoreError>;

    async fn subscribe(&self, targets: &TargetSet) -> Result<PresenceFeed, SubscribeError>;
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;

use crate::domain::presence::models::StoreError;
use crate::domain::shared::models::UserId;

/// Keeps the store-side disconnect action of the current session in sync with the local
/// presence.
#[async_trait]
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait DisconnectRegistrar: Send + Sync {
    /// Registers an action that flips `user_id` to offline once the session is lost. Arming an
    /// already armed session is a no-op.
    async fn arm(&self, user_id: &UserId) -> Result<(), StoreError>;
    async fn disarm(&self, user_id: &UserId) -> Result<(), StoreError>;
    fn is_armed(&self) -> bool;
    /// Forgets the armed state without talking to the store, i.e. after the session was replaced.
    fn reset(&self);
}

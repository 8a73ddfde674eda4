// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::connection::models::ConnectionState;
use crate::domain::shared::models::UserId;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The connectivity to the presence store has changed.
    ConnectionStatusChanged { state: ConnectionState },

    /// Writing the local user's presence failed permanently. Other users might see an outdated
    /// status until the next successful write.
    PresenceDegraded { user_id: UserId },

    /// The store refused a subscription. The subscription won't deliver any updates.
    SubscriptionFailed { user_ids: Vec<UserId> },
}

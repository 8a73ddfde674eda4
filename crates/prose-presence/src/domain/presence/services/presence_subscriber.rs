// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use crate::domain::connection::models::ConnectionState;
use crate::domain::presence::models::{PresenceCallback, SubscriptionHandle, TargetSet};

/// Fans presence changes out to any number of observers. Observers with equal target sets share
/// one store channel.
#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait PresenceSubscriber: Send + Sync {
    /// Starts observing `targets`. The current state is delivered as soon as it is known, later
    /// changes are delivered as they happen.
    fn observe(&self, targets: TargetSet, callback: PresenceCallback) -> SubscriptionHandle;

    /// Cancels all subscriptions and closes all channels.
    fn cancel_all(&self);

    /// Re-establishes lost channels once the store is reachable again.
    fn handle_connection_changed(&self, state: ConnectionState);

    /// The number of open store channels.
    fn channel_count(&self) -> usize;
}

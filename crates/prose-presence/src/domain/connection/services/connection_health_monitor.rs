// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use futures::stream::BoxStream;

use crate::domain::connection::models::ConnectionState;

pub type ConnectionTransitions = BoxStream<'static, ConnectionState>;

#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait ConnectionHealthMonitor: Send + Sync {
    /// The current connectivity to the presence store.
    fn state(&self) -> ConnectionState;

    /// A stream that yields each state change after the moment of the call. Repeated reports of
    /// the same state are not emitted.
    fn transitions(&self) -> ConnectionTransitions;

    /// Reports the outcome of the latest liveness check.
    fn report(&self, state: ConnectionState);
}

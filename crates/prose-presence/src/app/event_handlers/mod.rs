// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use connection_event_handler::ConnectionEventHandler;

use crate::ClientEvent;

mod connection_event_handler;

#[cfg_attr(any(test, feature = "test"), mockall::automock)]
pub trait ClientEventDispatcherTrait: Send + Sync {
    fn dispatch_event(&self, event: ClientEvent);
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use disconnect_registrar::DisconnectRegistrar;
pub use presence_store::{PresenceFeed, PresenceStore};
pub use presence_subscriber::PresenceSubscriber;
pub use presence_writer::PresenceWriter;

mod disconnect_registrar;
pub mod impls;
mod presence_store;
mod presence_subscriber;
mod presence_writer;

#[cfg(any(test, feature = "test"))]
pub mod mocks {
    pub use super::disconnect_registrar::MockDisconnectRegistrar;
    pub use super::presence_store::MockPresenceStore;
    pub use super::presence_subscriber::MockPresenceSubscriber;
    pub use super::presence_writer::MockPresenceWriter;
}

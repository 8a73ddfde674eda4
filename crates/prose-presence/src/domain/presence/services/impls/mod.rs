// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use disconnect_registrar::{DisconnectRegistrar, DisconnectRegistrarDependencies};
pub use presence_debouncer::PresenceDebouncer;
pub use presence_subscriber::{PresenceSubscriber, PresenceSubscriberDependencies};
pub use presence_writer::{PresenceWriter, PresenceWriterDependencies};

mod disconnect_registrar;
mod presence_debouncer;
mod presence_subscriber;
mod presence_writer;
mod subscription_registry;

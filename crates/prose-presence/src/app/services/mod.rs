// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use connection_service::ConnectionService;
pub use lifecycle_coordinator::LifecycleCoordinator;
pub use presence_service::{PresenceDisplay, PresenceService};

mod connection_service;
mod lifecycle_coordinator;
mod presence_service;

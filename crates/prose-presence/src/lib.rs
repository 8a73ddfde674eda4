// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use client::{Client, ClientDelegate, ClientInner};
pub use client_builder::{ClientBuilder, UndefinedStore};
pub use client_event::ClientEvent;


pub mod app;
mod client;
mod client_builder;
mod client_event;
pub mod domain;
pub mod infra;
pub mod logger;

pub mod dtos {
    pub use crate::app::deps::AppConfig;
    pub use crate::app::services::PresenceDisplay;
    pub use crate::domain::connection::models::{ConnectionState, SessionId};
    pub use crate::domain::presence::models::{
        DeviceInfo, LifecycleEvent, PresenceCallback, PresencePhase, PresenceRecord, PresenceStatus,
        PresenceUpdate, SubscriptionHandle, SubscriptionId, TargetSet,
    };
    pub use crate::domain::shared::models::UserId;
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use crate::app::deps::app_context::AppContext;
use crate::app::event_handlers::ClientEventDispatcherTrait;
use crate::domain::connection::services::ConnectionHealthMonitor;
use crate::domain::general::services::TimeProvider;
use crate::domain::presence::repos::PresenceCache;
use crate::domain::presence::services::{
    DisconnectRegistrar, PresenceStore, PresenceSubscriber, PresenceWriter,
};

pub type DynAppContext = Arc<AppContext>;
pub type DynClientEventDispatcher = Arc<dyn ClientEventDispatcherTrait>;
pub type DynConnectionHealthMonitor = Arc<dyn ConnectionHealthMonitor>;
pub type DynDisconnectRegistrar = Arc<dyn DisconnectRegistrar>;
pub type DynPresenceCache = Arc<dyn PresenceCache>;
pub type DynPresenceStore = Arc<dyn PresenceStore>;
pub type DynPresenceSubscriber = Arc<dyn PresenceSubscriber>;
pub type DynPresenceWriter = Arc<dyn PresenceWriter>;
pub type DynTimeProvider = Arc<dyn TimeProvider>;

pub struct AppDependencies {
    pub cache: DynPresenceCache,
    pub client_event_dispatcher: DynClientEventDispatcher,
    pub connection_monitor: DynConnectionHealthMonitor,
    pub ctx: DynAppContext,
    pub disconnect_registrar: DynDisconnectRegistrar,
    pub presence_store: DynPresenceStore,
    pub presence_subscriber: DynPresenceSubscriber,
    pub presence_writer: DynPresenceWriter,
    pub time_provider: DynTimeProvider,
}

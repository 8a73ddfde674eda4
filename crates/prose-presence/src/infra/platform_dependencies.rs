// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use tokio::runtime::Handle;

use crate::app::deps::{
    AppContext, AppDependencies, DynClientEventDispatcher, DynPresenceCache, DynPresenceStore,
    DynTimeProvider,
};
use crate::domain::presence::services::impls::{
    DisconnectRegistrar, DisconnectRegistrarDependencies, PresenceSubscriber,
    PresenceSubscriberDependencies, PresenceWriter, PresenceWriterDependencies,
};
use crate::infra::connection::WatchConnectionHealthMonitor;
use crate::infra::presence::InMemoryPresenceCache;

pub(crate) struct PlatformDependencies {
    /// Defaults to an `InMemoryPresenceCache` configured from `ctx.config`.
    pub cache: Option<DynPresenceCache>,
    pub client_event_dispatcher: DynClientEventDispatcher,
    pub ctx: AppContext,
    pub presence_store: DynPresenceStore,
    pub runtime: Handle,
    pub time_provider: DynTimeProvider,
}

impl From<PlatformDependencies> for AppDependencies {
    fn from(d: PlatformDependencies) -> Self {
        let ctx = Arc::new(d.ctx);

        let cache = d.cache.unwrap_or_else(|| {
            Arc::new(InMemoryPresenceCache::new(
                d.time_provider.clone(),
                ctx.config.cache_ttl,
                ctx.config.cache_capacity,
            ))
        });

        let disconnect_registrar = Arc::new(DisconnectRegistrar::from(
            DisconnectRegistrarDependencies {
                ctx: ctx.clone(),
                presence_store: d.presence_store.clone(),
            },
        ));

        let presence_writer = Arc::new(PresenceWriter::from(PresenceWriterDependencies {
            cache: cache.clone(),
            client_event_dispatcher: d.client_event_dispatcher.clone(),
            ctx: ctx.clone(),
            disconnect_registrar: disconnect_registrar.clone(),
            presence_store: d.presence_store.clone(),
            time_provider: d.time_provider.clone(),
        }));

        let presence_subscriber = Arc::new(PresenceSubscriber::from(
            PresenceSubscriberDependencies {
                cache: cache.clone(),
                client_event_dispatcher: d.client_event_dispatcher.clone(),
                ctx: ctx.clone(),
                presence_store: d.presence_store.clone(),
                runtime: d.runtime,
            },
        ));

        Self {
            cache,
            client_event_dispatcher: d.client_event_dispatcher,
            connection_monitor: Arc::new(WatchConnectionHealthMonitor::default()),
            ctx,
            disconnect_registrar,
            presence_store: d.presence_store,
            presence_subscriber,
            presence_writer,
            time_provider: d.time_provider,
        }
    }
}

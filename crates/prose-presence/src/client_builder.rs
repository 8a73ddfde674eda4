// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

use crate::app::deps::{
    AppConfig, AppContext, AppDependencies, DynPresenceCache, DynPresenceStore, DynTimeProvider,
};
use crate::app::event_handlers::ConnectionEventHandler;
use crate::app::services::{ConnectionService, LifecycleCoordinator, PresenceService};
use crate::client::ClientInner;
use crate::domain::general::services::{SystemTimeProvider, TimeProvider};
use crate::domain::presence::repos::PresenceCache;
use crate::domain::presence::services::PresenceStore;
use crate::infra::events::ImmediateClientEventDispatcher;
use crate::infra::platform_dependencies::PlatformDependencies;
use crate::{Client, ClientDelegate};

pub struct UndefinedStore;

pub struct ClientBuilder<S> {
    app_config: AppConfig,
    cache: Option<DynPresenceCache>,
    delegate: Option<Box<dyn ClientDelegate>>,
    store: S,
    time_provider: DynTimeProvider,
}

impl ClientBuilder<UndefinedStore> {
    pub(crate) fn new() -> Self {
        ClientBuilder {
            app_config: Default::default(),
            cache: None,
            delegate: None,
            store: UndefinedStore,
            time_provider: Arc::new(SystemTimeProvider::default()),
        }
    }

    pub fn set_store<S: PresenceStore + 'static>(
        self,
        store: Arc<S>,
    ) -> ClientBuilder<DynPresenceStore> {
        ClientBuilder {
            app_config: self.app_config,
            cache: self.cache,
            delegate: self.delegate,
            store,
            time_provider: self.time_provider,
        }
    }
}

impl<S> ClientBuilder<S> {
    pub fn set_time_provider<T: TimeProvider + 'static>(mut self, time_provider: T) -> Self {
        self.time_provider = Arc::new(time_provider);
        self
    }

    pub fn set_cache<C: PresenceCache + 'static>(mut self, cache: C) -> Self {
        self.cache = Some(Arc::new(cache));
        self
    }

    pub fn set_config(mut self, config: AppConfig) -> Self {
        self.app_config = config;
        self
    }

    pub fn set_delegate(mut self, delegate: Option<Box<dyn ClientDelegate>>) -> Self {
        self.delegate = delegate;
        self
    }
}

impl ClientBuilder<DynPresenceStore> {
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Client {
        let event_dispatcher = Arc::new(ImmediateClientEventDispatcher::new(self.delegate));

        let dependencies: AppDependencies = PlatformDependencies {
            cache: self.cache,
            client_event_dispatcher: event_dispatcher.clone(),
            ctx: AppContext::new(self.app_config),
            presence_store: self.store,
            runtime: tokio::runtime::Handle::current(),
            time_provider: self.time_provider,
        }
        .into();

        let connection_event_handler = ConnectionEventHandler::from(&dependencies);
        let transitions = dependencies.connection_monitor.transitions();
        let connection_task = tokio::spawn(async move {
            connection_event_handler.run(transitions).await
        });

        let client_inner = Arc::new(ClientInner {
            presence: PresenceService::from(&dependencies),
            lifecycle: LifecycleCoordinator::from(&dependencies),
            connection: ConnectionService::from(&dependencies),
            ctx: dependencies.ctx.clone(),
            background_tasks: parking_lot::Mutex::new(vec![connection_task.abort_handle()]),
        });

        event_dispatcher.set_client_inner(Arc::downgrade(&client_inner));

        Client::from(client_inner)
    }
}

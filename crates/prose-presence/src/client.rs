// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::ops::Deref;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::app::deps::DynAppContext;
use crate::app::services::{ConnectionService, LifecycleCoordinator, PresenceService};
use crate::client_builder::{ClientBuilder, UndefinedStore};
use crate::domain::connection::models::{ConnectionError, ConnectionState, SessionId};
use crate::domain::presence::models::LifecycleEvent;
use crate::domain::shared::models::UserId;
use crate::ClientEvent;

#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub trait ClientDelegate: Send + Sync {
    fn handle_event(&self, client: Client, event: ClientEvent);
}

impl Client {
    pub fn builder() -> ClientBuilder<UndefinedStore> {
        ClientBuilder::new()
    }
}

pub struct ClientInner {
    pub presence: PresenceService,
    pub lifecycle: LifecycleCoordinator,
    pub(crate) connection: ConnectionService,
    pub(crate) ctx: DynAppContext,
    pub(crate) background_tasks: Mutex<Vec<AbortHandle>>,
}

impl From<Arc<ClientInner>> for Client {
    fn from(inner: Arc<ClientInner>) -> Self {
        Client { inner }
    }
}

impl Deref for Client {
    type Target = ClientInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Client {
    pub async fn connect(&self, user_id: &UserId) -> Result<(), ConnectionError> {
        self.connection.connect(user_id).await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.connection_state()
    }

    pub fn connected_user_id(&self) -> Option<UserId> {
        self.ctx.connected_user().ok()
    }

    /// The store session of the current connection, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        self.ctx.session_id()
    }

    /// Forwards `event` to the `LifecycleCoordinator`. Logging out also ends the session.
    pub async fn handle_lifecycle_event(&self, event: LifecycleEvent) -> Result<()> {
        self.lifecycle.handle_event(event).await?;

        if event == LifecycleEvent::LoggedOut {
            self.connection.disconnect().await;
        }
        Ok(())
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        for task in self.background_tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

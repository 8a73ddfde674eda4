// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use prose_presence_macros::InjectDependencies;

use crate::app::deps::{
    DynAppContext, DynConnectionHealthMonitor, DynDisconnectRegistrar, DynPresenceStore,
};
use crate::domain::connection::models::{ConnectionError, ConnectionState};
use crate::domain::presence::models::PresencePhase;
use crate::domain::shared::models::UserId;

/// Owns the session with the presence store. Keeps it alive with heartbeats and replaces it
/// with a new one after it was lost.
#[derive(InjectDependencies)]
pub struct ConnectionService {
    #[inject]
    connection_monitor: DynConnectionHealthMonitor,
    #[inject]
    ctx: DynAppContext,
    #[inject]
    disconnect_registrar: DynDisconnectRegistrar,
    #[inject]
    presence_store: DynPresenceStore,

    session_keeper: Mutex<Option<AbortHandle>>,
}

impl ConnectionService {
    pub async fn connect(&self, user_id: &UserId) -> Result<(), ConnectionError> {
        if self.ctx.session_id().is_some() {
            self.disconnect().await;
        }

        let session_id = self.presence_store.open_session(user_id).await?;
        info!("Connected as {user_id} with session {session_id}.");

        self.ctx.set_session(user_id.clone(), session_id);
        if self.ctx.phase() == PresencePhase::Terminated {
            self.ctx.set_phase(PresencePhase::Uninitialized);
        }
        self.disconnect_registrar.reset();

        let keeper = SessionKeeper {
            connection_monitor: self.connection_monitor.clone(),
            ctx: self.ctx.clone(),
            presence_store: self.presence_store.clone(),
            user_id: user_id.clone(),
        };
        let handle = tokio::spawn(keeper.run()).abort_handle();
        if let Some(previous) = self.session_keeper.lock().replace(handle) {
            previous.abort();
        }

        self.connection_monitor.report(ConnectionState::Connected);
        Ok(())
    }

    /// Signs off cleanly. The store won't execute the disconnect action of the session.
    pub async fn disconnect(&self) {
        if let Some(keeper) = self.session_keeper.lock().take() {
            keeper.abort();
        }

        if let Some(session_id) = self.ctx.session_id() {
            if let Err(err) = self.presence_store.close_session(&session_id).await {
                warn!("Failed to close session {session_id}. {err}");
            }
        }

        self.ctx.reset_session();
        self.disconnect_registrar.reset();
        self.connection_monitor
            .report(ConnectionState::Disconnected);
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_monitor.state()
    }
}

impl Drop for ConnectionService {
    fn drop(&mut self) {
        if let Some(keeper) = self.session_keeper.lock().take() {
            keeper.abort();
        }
    }
}

struct SessionKeeper {
    connection_monitor: DynConnectionHealthMonitor,
    ctx: DynAppContext,
    presence_store: DynPresenceStore,
    user_id: UserId,
}

impl SessionKeeper {
    async fn run(self) {
        let config = &self.ctx.config;

        loop {
            tokio::time::sleep(config.heartbeat_interval).await;

            let Some(session_id) = self.ctx.session_id() else {
                return;
            };

            let Err(err) = self.presence_store.keep_alive(&session_id).await else {
                continue;
            };

            warn!("Heartbeat for session {session_id} failed. {err}");
            self.connection_monitor
                .report(ConnectionState::Disconnected);
            self.reconnect().await;
        }
    }

    async fn reconnect(&self) {
        loop {
            tokio::time::sleep(self.ctx.config.reconnect_delay).await;

            match self.presence_store.open_session(&self.user_id).await {
                Ok(session_id) => {
                    info!("Reconnected as {} with session {session_id}.", self.user_id);
                    self.ctx.set_session(self.user_id.clone(), session_id);
                    self.connection_monitor.report(ConnectionState::Connected);
                    return;
                }
                Err(err) => debug!("Reconnecting failed. {err}"),
            }
        }
    }
}

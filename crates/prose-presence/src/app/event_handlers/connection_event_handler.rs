// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use futures::StreamExt;
use tracing::{info, warn};

use prose_presence_macros::InjectDependencies;

use crate::app::deps::{
    DynClientEventDispatcher, DynDisconnectRegistrar, DynPresenceSubscriber, DynPresenceWriter,
};
use crate::domain::connection::models::ConnectionState;
use crate::domain::connection::services::ConnectionTransitions;
use crate::domain::presence::models::{PresenceStatus, WriteError};
use crate::ClientEvent;

/// Reacts to connectivity transitions reported by the `ConnectionHealthMonitor`.
#[derive(InjectDependencies)]
pub struct ConnectionEventHandler {
    #[inject]
    client_event_dispatcher: DynClientEventDispatcher,
    #[inject]
    disconnect_registrar: DynDisconnectRegistrar,
    #[inject]
    presence_subscriber: DynPresenceSubscriber,
    #[inject]
    presence_writer: DynPresenceWriter,
}

impl ConnectionEventHandler {
    /// Handles transitions until the stream ends.
    pub async fn run(&self, mut transitions: ConnectionTransitions) {
        while let Some(state) = transitions.next().await {
            if let Err(err) = self.handle_connection_event(state).await {
                warn!("Failed to handle connection transition to {state}. {}", err);
            }
        }
    }

    pub async fn handle_connection_event(&self, state: ConnectionState) -> Result<()> {
        self.client_event_dispatcher
            .dispatch_event(ClientEvent::ConnectionStatusChanged { state });

        match state {
            ConnectionState::Connected => self.handle_reconnect().await,
            ConnectionState::Disconnected => {
                // Subscription channels notice the loss by themselves. Everything else keeps
                // working off the cache until we're back.
                self.presence_subscriber.handle_connection_changed(state);
                Ok(())
            }
        }
    }

    async fn handle_reconnect(&self) -> Result<()> {
        self.presence_subscriber
            .handle_connection_changed(ConnectionState::Connected);

        let Some((user_id, status)) = self.presence_writer.last_intended() else {
            return Ok(());
        };

        info!("Connection restored. Resending {status} for {user_id}…");

        // The new session is a new lease. Whatever was armed before died with the old session.
        self.disconnect_registrar.reset();
        if status == PresenceStatus::Online {
            if let Err(err) = self.disconnect_registrar.arm(&user_id).await {
                warn!("Failed to re-arm disconnect action for {user_id}. {}", err);
            }
        }

        match self.presence_writer.resend_last_intended().await {
            Ok(()) | Err(WriteError::Superseded) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

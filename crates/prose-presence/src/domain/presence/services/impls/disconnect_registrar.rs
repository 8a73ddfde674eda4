// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use prose_presence_macros::DependenciesStruct;

use crate::app::deps::{DynAppContext, DynPresenceStore};
use crate::domain::connection::models::SessionId;
use crate::domain::presence::models::{DisconnectAction, StoreError};
use crate::domain::shared::models::UserId;

use super::super::DisconnectRegistrar as DisconnectRegistrarTrait;

#[derive(DependenciesStruct)]
pub struct DisconnectRegistrar {
    ctx: DynAppContext,
    presence_store: DynPresenceStore,

    /// The session we've armed an action for.
    #[state]
    armed: Mutex<Option<SessionId>>,
}

impl DisconnectRegistrar {
    fn current_session(&self) -> Result<SessionId, StoreError> {
        self.ctx.session_id().ok_or(StoreError::NotConnected)
    }
}

#[async_trait]
impl DisconnectRegistrarTrait for DisconnectRegistrar {
    async fn arm(&self, user_id: &UserId) -> Result<(), StoreError> {
        let session_id = self.current_session()?;

        if self.armed.lock().as_ref() == Some(&session_id) {
            return Ok(());
        }

        debug!("Arming disconnect action for {user_id} in session {session_id}…");
        self.presence_store
            .set_on_disconnect(
                &session_id,
                DisconnectAction::go_offline(
                    user_id.clone(),
                    self.ctx.config.device_info.clone(),
                ),
            )
            .await?;

        self.armed.lock().replace(session_id);
        Ok(())
    }

    async fn disarm(&self, user_id: &UserId) -> Result<(), StoreError> {
        let session_id = self.current_session()?;

        debug!("Disarming disconnect action for {user_id} in session {session_id}…");
        self.presence_store.cancel_on_disconnect(&session_id).await?;

        let mut armed = self.armed.lock();
        if armed.as_ref() == Some(&session_id) {
            armed.take();
        }
        Ok(())
    }

    fn is_armed(&self) -> bool {
        let Some(session_id) = self.ctx.session_id() else {
            return false;
        };
        self.armed.lock().as_ref() == Some(&session_id)
    }

    fn reset(&self) {
        self.armed.lock().take();
    }
}

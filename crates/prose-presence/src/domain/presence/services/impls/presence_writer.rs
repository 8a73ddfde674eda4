// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use prose_presence_macros::DependenciesStruct;

use crate::app::deps::{
    DynAppContext, DynClientEventDispatcher, DynDisconnectRegistrar, DynPresenceCache,
    DynPresenceStore, DynTimeProvider,
};
use crate::domain::presence::models::{
    PresenceRecord, PresenceStatus, PresenceWriteRequest, RetryState, StoreError, WriteError,
};
use crate::domain::shared::models::UserId;
use crate::ClientEvent;

use super::super::PresenceWriter as PresenceWriterTrait;

#[derive(DependenciesStruct)]
pub struct PresenceWriter {
    cache: DynPresenceCache,
    client_event_dispatcher: DynClientEventDispatcher,
    ctx: DynAppContext,
    disconnect_registrar: DynDisconnectRegistrar,
    presence_store: DynPresenceStore,
    time_provider: DynTimeProvider,

    #[state]
    state: Mutex<WriterState>,
}

#[derive(Default)]
struct WriterState {
    next_generation: u64,
    /// One entry per user with a write in flight. Owned by the most recent `set_status` call.
    retries: HashMap<UserId, RetryState>,
    last_intended: Option<(UserId, PresenceStatus)>,
}

impl WriterState {
    fn is_superseded(&self, user_id: &UserId, generation: u64) -> bool {
        self.retries
            .get(user_id)
            .map(|retry| retry.generation != generation)
            .unwrap_or(true)
    }
}

enum Attempt {
    Retry(std::time::Duration),
    Exhausted { attempts: u32 },
    Superseded,
}

#[async_trait]
impl PresenceWriterTrait for PresenceWriter {
    async fn set_status(&self, user_id: &UserId, status: PresenceStatus) -> Result<(), WriteError> {
        let generation = {
            let mut state = self.state.lock();
            state.next_generation += 1;
            let generation = state.next_generation;
            state.last_intended = Some((user_id.clone(), status));
            state.retries.insert(
                user_id.clone(),
                RetryState::new(&self.ctx.config.backoff_schedule(), generation),
            );
            generation
        };

        self.write_with_retries(user_id, status, generation).await
    }

    async fn resend_last_intended(&self) -> Result<(), WriteError> {
        let Some((user_id, status)) = self.last_intended() else {
            return Ok(());
        };
        self.set_status(&user_id, status).await
    }

    fn last_intended(&self) -> Option<(UserId, PresenceStatus)> {
        self.state.lock().last_intended.clone()
    }

    fn reset(&self) {
        let mut state = self.state.lock();
        state.retries.clear();
        state.last_intended = None;
    }
}

impl PresenceWriter {
    async fn write_with_retries(
        &self,
        user_id: &UserId,
        status: PresenceStatus,
        generation: u64,
    ) -> Result<(), WriteError> {
        loop {
            if self.state.lock().is_superseded(user_id, generation) {
                return Err(WriteError::Superseded);
            }

            let err = match self.try_write(user_id, status).await {
                Ok(record) => {
                    self.finish(user_id, generation);
                    self.handle_successful_write(record).await;
                    return Ok(());
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                self.finish(user_id, generation);
                error!("Giving up on writing {status} for {user_id}. {err}");
                return Err(err.into());
            }

            match self.advance_retry(user_id, generation) {
                Attempt::Retry(delay) => {
                    debug!("Writing {status} for {user_id} failed ({err}). Retrying in {delay:?}…");
                    tokio::time::sleep(delay).await;
                }
                Attempt::Exhausted { attempts } => {
                    warn!("Writing {status} for {user_id} failed after {attempts} attempts. {err}");
                    self.client_event_dispatcher
                        .dispatch_event(ClientEvent::PresenceDegraded {
                            user_id: user_id.clone(),
                        });
                    return Err(WriteError::Exhausted { attempts });
                }
                Attempt::Superseded => return Err(WriteError::Superseded),
            }
        }
    }

    async fn try_write(
        &self,
        user_id: &UserId,
        status: PresenceStatus,
    ) -> Result<PresenceRecord, StoreError> {
        let session_id = self.ctx.session_id().ok_or(StoreError::NotConnected)?;

        self.presence_store
            .put_presence(
                &session_id,
                user_id,
                PresenceWriteRequest {
                    status,
                    last_seen: self.time_provider.now(),
                    device_info: self.ctx.config.device_info.clone(),
                },
            )
            .await
    }

    fn advance_retry(&self, user_id: &UserId, generation: u64) -> Attempt {
        let schedule = self.ctx.config.backoff_schedule();
        let mut state = self.state.lock();

        if state.is_superseded(user_id, generation) {
            return Attempt::Superseded;
        }
        let Some(retry) = state.retries.get_mut(user_id) else {
            return Attempt::Superseded;
        };

        if let Some(delay) = retry.advance(&schedule) {
            return Attempt::Retry(delay);
        }

        let attempts = retry.calls_made();
        state.retries.remove(user_id);
        Attempt::Exhausted { attempts }
    }

    fn finish(&self, user_id: &UserId, generation: u64) {
        let mut state = self.state.lock();
        if !state.is_superseded(user_id, generation) {
            state.retries.remove(user_id);
        }
    }

    async fn handle_successful_write(&self, record: PresenceRecord) {
        info!(
            "Wrote {} for {} (last seen {}).",
            record.status, record.user_id, record.last_seen
        );

        let result = match record.status {
            PresenceStatus::Online => self.disconnect_registrar.arm(&record.user_id).await,
            PresenceStatus::Offline => self.disconnect_registrar.disarm(&record.user_id).await,
        };
        if let Err(err) = result {
            warn!(
                "Failed to update disconnect action for {}. {err}",
                record.user_id
            );
        }

        self.cache.put(record);
    }
}

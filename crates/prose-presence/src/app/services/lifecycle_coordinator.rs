// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use prose_presence_macros::InjectDependencies;

use crate::app::deps::{DynAppContext, DynPresenceSubscriber, DynPresenceWriter};
use crate::domain::presence::models::{
    LifecycleEvent, PresencePhase, PresenceStatus, WriteError,
};
use crate::domain::shared::models::UserId;

/// Translates lifecycle events of the host application into presence writes.
#[derive(InjectDependencies)]
pub struct LifecycleCoordinator {
    #[inject]
    ctx: DynAppContext,
    #[inject]
    presence_subscriber: DynPresenceSubscriber,
    #[inject]
    presence_writer: DynPresenceWriter,

    pending_write: Mutex<Option<JoinHandle<()>>>,
}

impl LifecycleCoordinator {
    /// Returns without waiting for the resulting write, except for `LoggedOut` which waits for
    /// the Offline write before cancelling all subscriptions.
    pub async fn handle_event(&self, event: LifecycleEvent) -> Result<()> {
        let phase = self.ctx.phase();
        let Some(next_phase) = phase.next(event) else {
            debug!("Ignoring {event} in phase {phase:?}.");
            return Ok(());
        };

        let user_id = self.ctx.connected_user()?;
        self.ctx.set_phase(next_phase);
        info!("{event} moves presence of {user_id} from {phase:?} to {next_phase:?}.");

        let Some(status) = next_phase.status() else {
            return Ok(());
        };

        if next_phase != PresencePhase::Terminated {
            self.spawn_write(user_id, status);
            return Ok(());
        }

        if let Some(pending) = self.pending_write.lock().take() {
            pending.abort();
        }
        log_write_result(
            &user_id,
            self.presence_writer.set_status(&user_id, status).await,
        );
        self.presence_subscriber.cancel_all();
        self.presence_writer.reset();

        Ok(())
    }

    /// Waits for the write triggered by the latest lifecycle event, e.g. before the process
    /// gets suspended.
    pub async fn flush(&self) {
        let Some(pending) = self.pending_write.lock().take() else {
            return;
        };
        _ = pending.await;
    }

    fn spawn_write(&self, user_id: UserId, status: PresenceStatus) {
        let writer = self.presence_writer.clone();
        let handle = tokio::spawn(async move {
            log_write_result(&user_id, writer.set_status(&user_id, status).await);
        });
        // The previous write is superseded by this one and finishes on its own.
        self.pending_write.lock().replace(handle);
    }
}

fn log_write_result(user_id: &UserId, result: Result<(), WriteError>) {
    match result {
        Ok(()) => (),
        Err(WriteError::Superseded) => debug!("Write for {user_id} was superseded."),
        Err(err) => warn!("Presence of {user_id} might be outdated. {err}"),
    }
}

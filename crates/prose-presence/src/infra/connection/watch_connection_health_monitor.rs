// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use futures::StreamExt;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::info;

use crate::domain::connection::models::ConnectionState;
use crate::domain::connection::services::{ConnectionHealthMonitor, ConnectionTransitions};

pub struct WatchConnectionHealthMonitor {
    state: watch::Sender<ConnectionState>,
}

impl Default for WatchConnectionHealthMonitor {
    fn default() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self { state }
    }
}

impl ConnectionHealthMonitor for WatchConnectionHealthMonitor {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn transitions(&self) -> ConnectionTransitions {
        WatchStream::from_changes(self.state.subscribe()).boxed()
    }

    fn report(&self, state: ConnectionState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            *current = state;
            true
        });

        if changed {
            info!("Connection to presence store is now {state}.");
        }
    }
}

// prose-presence/prose-presence-integration-tests
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use prose_presence::app::deps::{AppConfig, DynTimeProvider};
use prose_presence::domain::presence::models::{PresenceRecord, PresenceStatus};
use prose_presence::domain::shared::models::UserId;
use prose_presence::infra::presence::InMemoryPresenceStore;
use prose_presence::test::{mock_data, PausedClockTimeProvider};
use prose_presence::{Client, ClientDelegate, ClientEvent};

pub fn record(user_id: &str, status: PresenceStatus, secs: i64) -> PresenceRecord {
    PresenceRecord {
        user_id: UserId::from(user_id),
        status,
        last_seen: mock_data::reference_date() + chrono::Duration::seconds(secs),
        device_info: None,
    }
}

/// Lets spawned tasks run. Only moves the paused clock by a negligible amount.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await
}

#[derive(Clone, Default)]
pub struct RecordingDelegate {
    events: Arc<Mutex<Vec<ClientEvent>>>,
}

impl RecordingDelegate {
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().clone()
    }
}

impl ClientDelegate for RecordingDelegate {
    fn handle_event(&self, _client: Client, event: ClientEvent) {
        self.events.lock().push(event)
    }
}

/// An in-memory store and the clock it shares with every client created by `client`.
pub struct TestNetwork {
    pub store: Arc<InMemoryPresenceStore>,
    pub time_provider: DynTimeProvider,
}

impl TestNetwork {
    /// Must be called from within a runtime with a paused clock.
    pub fn new() -> Self {
        let time_provider: DynTimeProvider =
            Arc::new(PausedClockTimeProvider::new(mock_data::reference_date()));
        let store = Arc::new(InMemoryPresenceStore::new(
            time_provider.clone(),
            Duration::from_secs(15),
        ));
        Self {
            store,
            time_provider,
        }
    }

    pub fn client(&self) -> Client {
        self.client_with_delegate(None)
    }

    pub fn client_with_delegate(&self, delegate: Option<RecordingDelegate>) -> Client {
        Client::builder()
            .set_store(self.store.clone())
            .set_time_provider(self.time_provider.clone())
            .set_config(AppConfig::default())
            .set_delegate(delegate.map(|d| Box::new(d) as Box<dyn ClientDelegate>))
            .build()
    }
}

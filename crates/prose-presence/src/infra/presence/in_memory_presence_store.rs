// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::deps::DynTimeProvider;
use crate::domain::connection::models::SessionId;
use crate::domain::general::services::SystemTimeProvider;
use crate::domain::presence::models::{
    DeviceInfo, DisconnectAction, PresenceRecord, PresenceStatus, PresenceWriteRequest,
    StoreError, SubscribeError, TargetSet,
};
use crate::domain::presence::services::{PresenceFeed, PresenceStore};
use crate::domain::shared::models::UserId;

/// A presence store living in process memory.
///
/// Sessions are leases: a session that hasn't been kept alive for `session_timeout` is expired by
/// `expire_stale_sessions` (or the reaper task), which executes its disconnect action. Can be
/// made unreachable to simulate network partitions.
pub struct InMemoryPresenceStore {
    time_provider: DynTimeProvider,
    session_timeout: Duration,
    state: Mutex<StoreState>,
}

struct StoreState {
    reachable: bool,
    records: HashMap<UserId, PresenceRecord>,
    sessions: HashMap<SessionId, Session>,
    watchers: Vec<Watcher>,
    restricted: HashSet<UserId>,
}

struct Session {
    user_id: UserId,
    last_keep_alive: Instant,
    on_disconnect: Option<DisconnectAction>,
}

struct Watcher {
    targets: TargetSet,
    tx: mpsc::UnboundedSender<Result<PresenceRecord, SubscribeError>>,
}

impl Default for InMemoryPresenceStore {
    fn default() -> Self {
        Self::new(
            Arc::new(SystemTimeProvider::default()),
            Duration::from_secs(15),
        )
    }
}

impl InMemoryPresenceStore {
    pub fn new(time_provider: DynTimeProvider, session_timeout: Duration) -> Self {
        Self {
            time_provider,
            session_timeout,
            state: Mutex::new(StoreState {
                reachable: true,
                records: Default::default(),
                sessions: Default::default(),
                watchers: vec![],
                restricted: Default::default(),
            }),
        }
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// While unreachable every request fails and all open feeds are terminated.
    pub fn set_reachable(&self, reachable: bool) {
        let mut state = self.state.lock();
        if state.reachable == reachable {
            return;
        }
        state.reachable = reachable;

        if !reachable {
            info!("Presence store is now unreachable.");
            for watcher in state.watchers.drain(..) {
                _ = watcher.tx.send(Err(SubscribeError::ChannelLost));
            }
        } else {
            info!("Presence store is reachable again.");
        }
    }

    /// Refuses subscriptions that include `user_id`.
    pub fn restrict(&self, user_id: UserId) {
        self.state.lock().restricted.insert(user_id);
    }

    /// Terminates `session_id` as if its connection had dropped, executing its disconnect
    /// action.
    pub fn sever_session(&self, session_id: &SessionId) {
        let mut state = self.state.lock();
        let Some(session) = state.sessions.remove(session_id) else {
            return;
        };
        info!("Session {session_id} of {} was severed.", session.user_id);
        self.run_disconnect_action(&mut state, session);
    }

    /// Expires all sessions that missed their keep-alive. Returns the number of expired sessions.
    pub fn expire_stale_sessions(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.lock();

        let stale = state
            .sessions
            .iter()
            .filter(|(_, session)| {
                now.duration_since(session.last_keep_alive) >= self.session_timeout
            })
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();

        for session_id in &stale {
            let Some(session) = state.sessions.remove(session_id) else {
                continue;
            };
            info!("Session {session_id} of {} expired.", session.user_id);
            self.run_disconnect_action(&mut state, session);
        }

        stale.len()
    }

    /// Periodically expires stale sessions until the store is dropped.
    pub fn spawn_session_reaper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    return;
                };
                store.expire_stale_sessions();
            }
        })
    }

    pub fn record(&self, user_id: &UserId) -> Option<PresenceRecord> {
        self.state.lock().records.get(user_id).cloned()
    }

    pub fn disconnect_action(&self, session_id: &SessionId) -> Option<DisconnectAction> {
        self.state
            .lock()
            .sessions
            .get(session_id)
            .and_then(|session| session.on_disconnect.clone())
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn watcher_count(&self) -> usize {
        let mut state = self.state.lock();
        state.watchers.retain(|watcher| !watcher.tx.is_closed());
        state.watchers.len()
    }
}

impl InMemoryPresenceStore {
    fn run_disconnect_action(&self, state: &mut StoreState, session: Session) {
        let Some(action) = session.on_disconnect else {
            return;
        };
        debug!("Executing disconnect action for {}.", action.user_id);
        self.write_record(state, action.user_id, action.status, action.device_info);
    }

    fn write_record(
        &self,
        state: &mut StoreState,
        user_id: UserId,
        status: PresenceStatus,
        device_info: Option<DeviceInfo>,
    ) -> PresenceRecord {
        let now = self.time_provider.now();
        let last_seen = match state.records.get(&user_id) {
            Some(previous) if previous.last_seen >= now => {
                previous.last_seen + chrono::Duration::milliseconds(1)
            }
            _ => now,
        };

        let record = PresenceRecord {
            user_id: user_id.clone(),
            status,
            last_seen,
            device_info,
        };
        state.records.insert(user_id, record.clone());

        state.watchers.retain(|watcher| {
            if !watcher.targets.contains(&record.user_id) {
                return !watcher.tx.is_closed();
            }
            watcher.tx.send(Ok(record.clone())).is_ok()
        });

        record
    }

    fn session_mut<'a>(
        state: &'a mut StoreState,
        session_id: &SessionId,
    ) -> Result<&'a mut Session, StoreError> {
        if !state.reachable {
            return Err(StoreError::Unreachable);
        }
        state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionExpired(session_id.clone()))
    }
}

#[async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn open_session(&self, user_id: &UserId) -> Result<SessionId, StoreError> {
        let mut state = self.state.lock();
        if !state.reachable {
            return Err(StoreError::Unreachable);
        }

        let session_id = SessionId::from(Uuid::new_v4().to_string().as_str());
        state.sessions.insert(
            session_id.clone(),
            Session {
                user_id: user_id.clone(),
                last_keep_alive: Instant::now(),
                on_disconnect: None,
            },
        );
        debug!("Opened session {session_id} for {user_id}.");
        Ok(session_id)
    }

    async fn keep_alive(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let session = Self::session_mut(&mut state, session_id)?;
        session.last_keep_alive = Instant::now();
        Ok(())
    }

    async fn close_session(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if !state.reachable {
            return Err(StoreError::Unreachable);
        }
        if state.sessions.remove(session_id).is_some() {
            debug!("Closed session {session_id}.");
        }
        Ok(())
    }

    async fn put_presence(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        request: PresenceWriteRequest,
    ) -> Result<PresenceRecord, StoreError> {
        let mut state = self.state.lock();
        let session = Self::session_mut(&mut state, session_id)?;

        if &session.user_id != user_id {
            return Err(StoreError::Unauthorized {
                user_id: user_id.clone(),
            });
        }
        session.last_keep_alive = Instant::now();

        Ok(self.write_record(
            &mut state,
            user_id.clone(),
            request.status,
            request.device_info,
        ))
    }

    async fn set_on_disconnect(
        &self,
        session_id: &SessionId,
        action: DisconnectAction,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let session = Self::session_mut(&mut state, session_id)?;

        if session.user_id != action.user_id {
            return Err(StoreError::Unauthorized {
                user_id: action.user_id,
            });
        }
        session.on_disconnect = Some(action);
        Ok(())
    }

    async fn cancel_on_disconnect(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        let session = Self::session_mut(&mut state, session_id)?;
        session.on_disconnect = None;
        Ok(())
    }

    async fn subscribe(&self, targets: &TargetSet) -> Result<PresenceFeed, SubscribeError> {
        let mut state = self.state.lock();
        if !state.reachable {
            return Err(SubscribeError::ChannelLost);
        }
        if targets.iter().any(|user_id| state.restricted.contains(user_id)) {
            return Err(SubscribeError::Unauthorized);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        for user_id in targets.iter() {
            if let Some(record) = state.records.get(user_id) {
                _ = tx.send(Ok(record.clone()));
            }
        }

        state.watchers.push(Watcher {
            targets: targets.clone(),
            tx,
        });

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

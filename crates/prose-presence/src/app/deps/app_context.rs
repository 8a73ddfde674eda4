// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use anyhow::Result;
use parking_lot::RwLock;

use crate::domain::connection::models::SessionId;
use crate::domain::presence::models::{BackoffSchedule, DeviceInfo, PresencePhase};
use crate::domain::shared::models::UserId;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// How long an Online→Offline transition is held back before it is delivered.
    pub offline_debounce: Duration,
    /// Duration of the crossfade the rendering layer should use for a delivered transition.
    pub fade_hint: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    /// Delay before the first retry of a failed write. Doubles with every further retry.
    pub retry_base_delay: Duration,
    pub max_retry_attempts: u32,
    pub heartbeat_interval: Duration,
    pub reconnect_delay: Duration,
    /// Sent along with every write of the local user's presence.
    pub device_info: Option<DeviceInfo>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            offline_debounce: Duration::from_secs(2),
            fade_hint: Duration::from_millis(200),
            cache_ttl: Duration::from_secs(30),
            cache_capacity: 1000,
            retry_base_delay: Duration::from_secs(1),
            max_retry_attempts: 3,
            heartbeat_interval: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(2),
            device_info: None,
        }
    }
}

impl AppConfig {
    pub fn backoff_schedule(&self) -> BackoffSchedule {
        BackoffSchedule::new(self.retry_base_delay, self.max_retry_attempts)
    }
}

pub struct AppContext {
    pub config: AppConfig,
    pub session: RwLock<Option<(UserId, SessionId)>>,
    pub phase: RwLock<PresencePhase>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: Default::default(),
            phase: Default::default(),
        }
    }
}

impl AppContext {
    pub fn connected_user(&self) -> Result<UserId> {
        self.session
            .read()
            .as_ref()
            .map(|(user_id, _)| user_id.clone())
            .ok_or(anyhow::anyhow!(
                "Failed to read the user's id since the client is not connected."
            ))
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session
            .read()
            .as_ref()
            .map(|(_, session_id)| session_id.clone())
    }

    pub fn phase(&self) -> PresencePhase {
        *self.phase.read()
    }
}

impl AppContext {
    pub fn set_session(&self, user_id: UserId, session_id: SessionId) {
        self.session.write().replace((user_id, session_id));
    }

    pub fn reset_session(&self) {
        self.session.write().take();
    }

    pub fn set_phase(&self, phase: PresencePhase) {
        *self.phase.write() = phase;
    }
}

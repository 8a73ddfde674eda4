// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use super::{LifecycleEvent, PresenceStatus};

/// The local view of this session's presence. `Terminated` may also be reached at the store
/// without the client noticing, when the disconnect action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresencePhase {
    #[default]
    Uninitialized,
    Online,
    Offline,
    Terminated,
}

impl PresencePhase {
    /// Returns the phase that follows `event`, or `None` if the event has to be ignored.
    pub fn next(self, event: LifecycleEvent) -> Option<PresencePhase> {
        match (self, event) {
            (PresencePhase::Terminated, _) => None,
            (_, LifecycleEvent::Launched | LifecycleEvent::EnteredForeground) => {
                Some(PresencePhase::Online)
            }
            (_, LifecycleEvent::EnteredBackground) => Some(PresencePhase::Offline),
            (_, LifecycleEvent::LoggedOut) => Some(PresencePhase::Terminated),
        }
    }

    /// The status a writer has to publish to reach this phase.
    pub fn status(&self) -> Option<PresenceStatus> {
        match self {
            PresencePhase::Online => Some(PresenceStatus::Online),
            PresencePhase::Offline | PresencePhase::Terminated => Some(PresenceStatus::Offline),
            PresencePhase::Uninitialized => None,
        }
    }
}

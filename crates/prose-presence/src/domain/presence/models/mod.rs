// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use cache_entry::CacheEntry;
pub use device_info::DeviceInfo;
pub use disconnect_action::DisconnectAction;
pub use errors::{StoreError, SubscribeError, WriteError};
pub use last_seen::format_last_seen;
pub use lifecycle_event::LifecycleEvent;
pub use presence_phase::PresencePhase;
pub use presence_record::{presence_path, PresenceRecord, PresenceStatus, PresenceWriteRequest};
pub use presence_update::{PresenceCallback, PresenceUpdate};
pub use retry_state::{BackoffSchedule, RetryState};
pub use subscription::{SubscriptionCanceller, SubscriptionHandle, SubscriptionId};
pub use target_set::TargetSet;

mod cache_entry;
mod device_info;
mod disconnect_action;
mod errors;
mod last_seen;
mod lifecycle_event;
mod presence_phase;
mod presence_record;
mod presence_update;
mod retry_state;
mod subscription;
mod target_set;

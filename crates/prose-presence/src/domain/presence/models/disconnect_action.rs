// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use serde::{Deserialize, Serialize};

use crate::domain::shared::models::UserId;

use super::{DeviceInfo, PresenceStatus};

/// A write the store executes on its own when a session terminates without sign-off. The store
/// stamps `last_seen` with the termination time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectAction {
    pub user_id: UserId,
    pub status: PresenceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

impl DisconnectAction {
    pub fn go_offline(user_id: UserId, device_info: Option<DeviceInfo>) -> Self {
        Self {
            user_id,
            status: PresenceStatus::Offline,
            device_info,
        }
    }
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::domain::shared::models::UserId;

use super::DeviceInfo;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// One user's liveness state as held by the presence store.
///
/// The store stamps `last_seen`, which makes it non-decreasing per user and the sole
/// tie-breaker for "latest".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

impl PresenceRecord {
    pub fn is_online(&self) -> bool {
        self.status == PresenceStatus::Online
    }

    /// Returns true if `self` was written strictly after `other`.
    pub fn is_newer_than(&self, other: &PresenceRecord) -> bool {
        self.last_seen > other.last_seen
    }
}

/// Body of `PUT /presence/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceWriteRequest {
    pub status: PresenceStatus,
    pub last_seen: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
}

pub fn presence_path(user_id: &UserId) -> String {
    format!("/presence/{}", user_id)
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use thiserror::Error;

use crate::domain::connection::models::SessionId;
use crate::domain::shared::models::UserId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("There is no open session with the presence store.")]
    NotConnected,
    #[error("The presence store is unreachable.")]
    Unreachable,
    #[error("The request to the presence store timed out.")]
    Timeout,
    #[error("Not authorized to write the presence of {user_id}.")]
    Unauthorized { user_id: UserId },
    #[error("Session {0} is unknown or has expired.")]
    SessionExpired(SessionId),
}

impl StoreError {
    /// Transient errors are expected to go away on their own (or after a reconnect) and are
    /// worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::NotConnected
            | StoreError::Unreachable
            | StoreError::Timeout
            | StoreError::SessionExpired(_) => true,
            StoreError::Unauthorized { .. } => false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WriteError {
    #[error("Presence write failed: {0}")]
    Transient(StoreError),
    #[error("Presence write failed after {attempts} attempts.")]
    Exhausted { attempts: u32 },
    #[error("Presence write was superseded by a newer status.")]
    Superseded,
    #[error("Not authorized to write the presence of {user_id}.")]
    Unauthorized { user_id: UserId },
}

impl From<StoreError> for WriteError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unauthorized { user_id } => WriteError::Unauthorized { user_id },
            err => WriteError::Transient(err),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("The presence channel was lost.")]
    ChannelLost,
    #[error("Not authorized to observe the requested users.")]
    Unauthorized,
}

impl From<StoreError> for SubscribeError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unauthorized { .. } => SubscribeError::Unauthorized,
            _ => SubscribeError::ChannelLost,
        }
    }
}

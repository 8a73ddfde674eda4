// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use thiserror::Error;

use crate::domain::presence::models::StoreError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Could not connect to the presence store: {0}")]
    Store(#[from] StoreError),
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use presence_cache::PresenceCache;

mod presence_cache;

#[cfg(any(test, feature = "test"))]
pub mod mocks {
    pub use super::presence_cache::MockPresenceCache;
}

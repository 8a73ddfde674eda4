// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use in_memory_presence_cache::InMemoryPresenceCache;
pub use in_memory_presence_store::InMemoryPresenceStore;

mod in_memory_presence_cache;
mod in_memory_presence_store;

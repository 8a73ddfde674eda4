// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use connection_error::ConnectionError;
pub use connection_state::ConnectionState;
pub use session_id::SessionId;

mod connection_error;
mod connection_state;
mod session_id;

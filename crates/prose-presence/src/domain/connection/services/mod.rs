// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use connection_health_monitor::{ConnectionHealthMonitor, ConnectionTransitions};

mod connection_health_monitor;

#[cfg(any(test, feature = "test"))]
pub mod mocks {
    pub use super::connection_health_monitor::MockConnectionHealthMonitor;
}

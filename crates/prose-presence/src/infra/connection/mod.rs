// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use watch_connection_health_monitor::WatchConnectionHealthMonitor;

mod watch_connection_health_monitor;

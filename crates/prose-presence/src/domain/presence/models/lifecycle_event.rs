// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use strum_macros::Display;

/// Opaque triggers from the host application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LifecycleEvent {
    Launched,
    EnteredForeground,
    EnteredBackground,
    LoggedOut,
}

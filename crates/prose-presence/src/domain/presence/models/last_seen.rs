// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use chrono::{DateTime, Utc};

/// Renders `last_seen` relative to `now`, e.g. "Last seen 5 minutes ago".
pub fn format_last_seen(last_seen: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(last_seen);

    if elapsed.num_seconds() < 60 {
        return "Last seen just now".to_string();
    }

    let (value, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 7 {
        (elapsed.num_days(), "day")
    } else {
        return format!("Last seen on {}", last_seen.format("%Y-%m-%d"));
    };

    format!(
        "Last seen {} {}{} ago",
        value,
        unit,
        if value == 1 { "" } else { "s" }
    )
}

// prose-presence/prose-presence-integration-tests
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use mockall::predicate;
use pretty_assertions::assert_eq;

use prose_presence::app::services::{PresenceDisplay, PresenceService};
use prose_presence::domain::connection::models::ConnectionState;
use prose_presence::domain::presence::models::{
    PresenceRecord, PresenceStatus, SubscriptionHandle, SubscriptionId,
};
use prose_presence::test::{mock_data, MockAppDependencies};
use prose_presence::{target_set, user_id};

fn record(status: PresenceStatus, minutes_ago: i64) -> PresenceRecord {
    PresenceRecord {
        user_id: user_id!("alice"),
        status,
        last_seen: mock_data::reference_date() - chrono::Duration::minutes(minutes_ago),
        device_info: None,
    }
}

#[tokio::test]
async fn test_displays_online_while_connected() {
    let mut deps = MockAppDependencies::default();

    deps.cache
        .expect_get()
        .with(predicate::eq(user_id!("alice")))
        .return_const(Some(record(PresenceStatus::Online, 0)));
    deps.connection_monitor
        .expect_state()
        .return_const(ConnectionState::Connected);

    let service = PresenceService::from(&deps.into_deps());
    assert_eq!(
        service.presence_display(&user_id!("alice")),
        PresenceDisplay::Online
    );
}

#[tokio::test]
async fn test_falls_back_to_last_seen_while_disconnected() {
    let mut deps = MockAppDependencies::default();

    deps.cache
        .expect_get()
        .return_const(Some(record(PresenceStatus::Online, 5)));
    deps.connection_monitor
        .expect_state()
        .return_const(ConnectionState::Disconnected);

    let service = PresenceService::from(&deps.into_deps());
    assert_eq!(
        service.presence_display(&user_id!("alice")),
        PresenceDisplay::LastSeen {
            at: mock_data::reference_date() - chrono::Duration::minutes(5),
            label: "Last seen 5 minutes ago".to_string(),
        }
    );
}

#[tokio::test]
async fn test_displays_last_seen_for_offline_users() {
    let mut deps = MockAppDependencies::default();

    deps.cache
        .expect_get()
        .return_const(Some(record(PresenceStatus::Offline, 120)));
    deps.connection_monitor
        .expect_state()
        .return_const(ConnectionState::Connected);

    let service = PresenceService::from(&deps.into_deps());
    assert_eq!(
        service.presence_display(&user_id!("alice")),
        PresenceDisplay::LastSeen {
            at: mock_data::reference_date() - chrono::Duration::hours(2),
            label: "Last seen 2 hours ago".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unknown_without_cached_record() {
    let mut deps = MockAppDependencies::default();

    deps.cache.expect_get().return_const(None);
    deps.cache.expect_is_online().return_const(false);

    let service = PresenceService::from(&deps.into_deps());
    assert_eq!(
        service.presence_display(&user_id!("alice")),
        PresenceDisplay::Unknown
    );
    assert_eq!(service.cached_presence(&user_id!("alice")), None);
    assert!(!service.is_online(&user_id!("alice")));
}

#[tokio::test]
async fn test_observe_collapses_user_ids_into_target_set() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.presence_subscriber
        .expect_observe()
        .once()
        .withf(|targets, _| *targets == target_set!["alice", "bob"])
        .return_once(|targets, _| SubscriptionHandle::detached(SubscriptionId::new(1), targets));

    let service = PresenceService::from(&deps.into_deps());
    let handle = service.observe(
        [user_id!("bob"), user_id!("alice"), user_id!("bob")],
        |_| (),
    );

    assert_eq!(handle.id(), SubscriptionId::new(1));
    assert_eq!(handle.targets().len(), 2);
    assert!(handle.is_active());

    service.cancel(handle);
    Ok(())
}

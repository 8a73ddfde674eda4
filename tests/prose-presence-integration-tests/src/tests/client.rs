// prose-presence/prose-presence-integration-tests
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

use anyhow::Result;
use pretty_assertions::assert_eq;

use prose_presence::app::services::PresenceDisplay;
use prose_presence::domain::connection::models::ConnectionState;
use prose_presence::domain::presence::models::{LifecycleEvent, PresenceStatus, StoreError};
use prose_presence::test::{FaultyPresenceStore, PresenceRecorder};
use prose_presence::{user_id, Client, ClientEvent};

use super::helpers::{settle, RecordingDelegate, TestNetwork};

use PresenceStatus::{Offline, Online};

async fn go_online(client: &Client, user_id: &str) -> Result<()> {
    client.connect(&user_id!(user_id)).await?;
    client.handle_lifecycle_event(LifecycleEvent::Launched).await?;
    client.lifecycle.flush().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observer_sees_user_come_online() -> Result<()> {
    let network = TestNetwork::new();
    let (alice, bob) = (network.client(), network.client());

    go_online(&bob, "bob").await?;
    let recorder = PresenceRecorder::default();
    let _handle = bob
        .presence
        .observe([user_id!("alice")], recorder.callback());
    settle().await;

    go_online(&alice, "alice").await?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(recorder.last_status(&user_id!("alice")), Some(Online));
    assert!(bob.presence.is_online(&user_id!("alice")));
    assert_eq!(
        bob.presence.presence_display(&user_id!("alice")),
        PresenceDisplay::Online
    );

    alice
        .handle_lifecycle_event(LifecycleEvent::EnteredBackground)
        .await?;
    alice.lifecycle.flush().await;
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(recorder.last_status(&user_id!("alice")), Some(Offline));
    assert!(matches!(
        bob.presence.presence_display(&user_id!("alice")),
        PresenceDisplay::LastSeen { .. }
    ));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_crashed_client_goes_offline_via_disconnect_action() -> Result<()> {
    let network = TestNetwork::new();
    let _reaper = network.store.spawn_session_reaper(Duration::from_secs(1));
    let (alice, bob) = (network.client(), network.client());

    go_online(&bob, "bob").await?;
    go_online(&alice, "alice").await?;

    let recorder = PresenceRecorder::default();
    let _handle = bob
        .presence
        .observe([user_id!("alice")], recorder.callback());
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(recorder.statuses(&user_id!("alice")), vec![Online]);

    // No sign-off, no Offline write. Alice just stops sending heartbeats.
    drop(alice);

    let timeout = network.store.session_timeout();
    tokio::time::sleep(timeout + Duration::from_secs(4)).await;

    assert_eq!(recorder.statuses(&user_id!("alice")), vec![Online, Offline]);
    assert_eq!(
        network.store.record(&user_id!("alice")).map(|r| r.status),
        Some(Offline)
    );
    assert_eq!(network.store.session_count(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_signed_off_client_does_not_trigger_disconnect_action() -> Result<()> {
    let network = TestNetwork::new();
    let _reaper = network.store.spawn_session_reaper(Duration::from_secs(1));
    let alice = network.client();

    go_online(&alice, "alice").await?;
    alice.disconnect().await;

    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(
        network.store.record(&user_id!("alice")).map(|r| r.status),
        Some(Online)
    );
    assert_eq!(network.store.session_count(), 0);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cache_outlives_failed_writes_until_ttl() -> Result<()> {
    let network = TestNetwork::new();
    let store = std::sync::Arc::new(FaultyPresenceStore::new(network.store.clone()));
    let delegate = RecordingDelegate::default();

    let alice = prose_presence::Client::builder()
        .set_store(store.clone())
        .set_time_provider(network.time_provider.clone())
        .set_delegate(Some(Box::new(delegate.clone())))
        .build();

    go_online(&alice, "alice").await?;
    assert_eq!(store.put_calls(), 1);

    store.fail_writes(Some(StoreError::Timeout));
    alice
        .handle_lifecycle_event(LifecycleEvent::EnteredBackground)
        .await?;
    alice.lifecycle.flush().await;

    assert_eq!(store.put_calls(), 5);
    assert!(delegate.events().contains(&ClientEvent::PresenceDegraded {
        user_id: user_id!("alice")
    }));

    // The last successful write is still what the cache knows.
    assert_eq!(
        alice
            .presence
            .cached_presence(&user_id!("alice"))
            .map(|r| r.status),
        Some(Online)
    );

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(alice.presence.cached_presence(&user_id!("alice")), None);
    assert_eq!(
        alice.presence.presence_display(&user_id!("alice")),
        PresenceDisplay::Unknown
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_flapping_produces_at_most_one_offline_transition() -> Result<()> {
    let network = TestNetwork::new();
    let (alice, bob) = (network.client(), network.client());

    go_online(&bob, "bob").await?;
    go_online(&alice, "alice").await?;

    let recorder = PresenceRecorder::default();
    let _handle = bob
        .presence
        .observe([user_id!("alice")], recorder.callback());
    settle().await;

    for _ in 0..5 {
        alice
            .handle_lifecycle_event(LifecycleEvent::EnteredBackground)
            .await?;
        alice.lifecycle.flush().await;
        tokio::time::sleep(Duration::from_millis(800)).await;

        alice
            .handle_lifecycle_event(LifecycleEvent::EnteredForeground)
            .await?;
        alice.lifecycle.flush().await;
        tokio::time::sleep(Duration::from_millis(1200)).await;
    }

    alice
        .handle_lifecycle_event(LifecycleEvent::EnteredBackground)
        .await?;
    alice.lifecycle.flush().await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    let statuses = recorder.statuses(&user_id!("alice"));
    let offline_transitions = statuses
        .windows(2)
        .filter(|pair| pair[0] == Online && pair[1] == Offline)
        .count();

    assert_eq!(offline_transitions, 1);
    assert_eq!(statuses.last(), Some(&Offline));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_recovers_from_partition() -> Result<()> {
    let network = TestNetwork::new();
    let delegate = RecordingDelegate::default();
    let alice = network.client_with_delegate(Some(delegate.clone()));
    let bob = network.client();

    go_online(&bob, "bob").await?;
    go_online(&alice, "alice").await?;

    let recorder = PresenceRecorder::default();
    let _handle = bob
        .presence
        .observe([user_id!("alice")], recorder.callback());
    settle().await;
    assert_eq!(recorder.statuses(&user_id!("alice")), vec![Online]);

    network.store.set_reachable(false);
    // Both heartbeats fail within one interval.
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(alice.connection_state(), ConnectionState::Disconnected);
    assert!(matches!(
        bob.presence.presence_display(&user_id!("alice")),
        PresenceDisplay::LastSeen { .. }
    ));

    let last_seen_before = network
        .store
        .record(&user_id!("alice"))
        .map(|r| r.last_seen);

    network.store.set_reachable(true);
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(alice.connection_state(), ConnectionState::Connected);
    assert_eq!(bob.connection_state(), ConnectionState::Connected);
    assert_eq!(
        delegate.events(),
        vec![
            ClientEvent::ConnectionStatusChanged {
                state: ConnectionState::Connected
            },
            ClientEvent::ConnectionStatusChanged {
                state: ConnectionState::Disconnected
            },
            ClientEvent::ConnectionStatusChanged {
                state: ConnectionState::Connected
            },
        ]
    );

    // The last intended status was written again with the new session.
    let record = network.store.record(&user_id!("alice"));
    assert_eq!(record.as_ref().map(|r| r.status), Some(Online));
    assert!(record.map(|r| r.last_seen) > last_seen_before);

    // Bob's channel was reopened.
    alice
        .handle_lifecycle_event(LifecycleEvent::EnteredBackground)
        .await?;
    alice.lifecycle.flush().await;
    tokio::time::sleep(Duration::from_secs(3)).await;

    assert_eq!(recorder.last_status(&user_id!("alice")), Some(Offline));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_logout_signs_off() -> Result<()> {
    let network = TestNetwork::new();
    let alice = network.client();

    go_online(&alice, "alice").await?;
    let recorder = PresenceRecorder::default();
    let handle = alice
        .presence
        .observe([user_id!("bob")], recorder.callback());

    alice
        .handle_lifecycle_event(LifecycleEvent::LoggedOut)
        .await?;

    assert!(!handle.is_active());
    assert_eq!(alice.connected_user_id(), None);
    assert_eq!(alice.connection_state(), ConnectionState::Disconnected);
    assert_eq!(
        network.store.record(&user_id!("alice")).map(|r| r.status),
        Some(Offline)
    );
    assert_eq!(network.store.session_count(), 0);

    // A new login starts from scratch.
    go_online(&alice, "alice").await?;
    assert_eq!(
        network.store.record(&user_id!("alice")).map(|r| r.status),
        Some(Online)
    );

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_severed_session_goes_offline_via_disconnect_action() -> Result<()> {
    let network = TestNetwork::new();
    let (alice, bob) = (network.client(), network.client());

    go_online(&bob, "bob").await?;
    go_online(&alice, "alice").await?;
    let session_id = alice.session_id().unwrap();

    let recorder = PresenceRecorder::default();
    let _handle = bob
        .presence
        .observe([user_id!("alice")], recorder.callback());
    settle().await;
    assert_eq!(recorder.statuses(&user_id!("alice")), vec![Online]);

    // Alice's process is gone before it could write anything.
    drop(alice);
    network.store.sever_session(&session_id);

    // Well within the session timeout, so only the disconnect action can be the cause.
    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(recorder.statuses(&user_id!("alice")), vec![Online, Offline]);
    assert_eq!(network.store.disconnect_action(&session_id), None);
    assert_eq!(network.store.session_count(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_observe_from_thread_outside_runtime() -> Result<()> {
    let network = TestNetwork::new();
    let (alice, bob) = (network.client(), network.client());
    go_online(&bob, "bob").await?;

    let (first, second) = (PresenceRecorder::default(), PresenceRecorder::default());

    let first_handle = std::thread::spawn({
        let bob = bob.clone();
        let callback = first.callback();
        move || bob.presence.observe([user_id!("alice")], callback)
    })
    .join()
    .unwrap();
    assert!(first_handle.is_active());
    settle().await;

    go_online(&alice, "alice").await?;
    settle().await;
    assert_eq!(first.statuses(&user_id!("alice")), vec![Online]);

    // Joins the open channel and gets the current state replayed.
    let second_handle = std::thread::spawn({
        let bob = bob.clone();
        let callback = second.callback();
        move || bob.presence.observe([user_id!("alice")], callback)
    })
    .join()
    .unwrap();
    settle().await;

    assert!(second_handle.is_active());
    assert_eq!(second.statuses(&user_id!("alice")), vec![Online]);
    assert_eq!(network.store.watcher_count(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_subscription_releases_store_watcher() -> Result<()> {
    let network = TestNetwork::new();
    let bob = network.client();
    go_online(&bob, "bob").await?;

    let recorder = PresenceRecorder::default();
    let handle = bob
        .presence
        .observe([user_id!("alice"), user_id!("carol")], recorder.callback());
    settle().await;
    assert_eq!(network.store.watcher_count(), 1);

    handle.cancel();
    settle().await;

    assert_eq!(network.store.watcher_count(), 0);

    Ok(())
}

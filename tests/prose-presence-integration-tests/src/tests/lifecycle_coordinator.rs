// prose-presence/prose-presence-integration-tests
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use anyhow::Result;
use mockall::{predicate, Sequence};
use pretty_assertions::assert_eq;

use prose_presence::app::deps::AppContext;
use prose_presence::app::services::LifecycleCoordinator;
use prose_presence::domain::presence::models::{
    LifecycleEvent, PresencePhase, PresenceStatus, WriteError,
};
use prose_presence::test::{mock_data, MockAppDependencies};

#[tokio::test]
async fn test_launch_and_foreground_write_online() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.presence_writer
        .expect_set_status()
        .times(2)
        .with(
            predicate::eq(mock_data::user_id()),
            predicate::eq(PresenceStatus::Online),
        )
        .returning(|_, _| Box::pin(async { Ok(()) }));

    let deps = deps.into_deps();
    let coordinator = LifecycleCoordinator::from(&deps);

    coordinator.handle_event(LifecycleEvent::Launched).await?;
    coordinator.flush().await;
    assert_eq!(deps.ctx.phase(), PresencePhase::Online);

    coordinator
        .handle_event(LifecycleEvent::EnteredForeground)
        .await?;
    coordinator.flush().await;
    assert_eq!(deps.ctx.phase(), PresencePhase::Online);

    Ok(())
}

#[tokio::test]
async fn test_background_writes_offline() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    deps.ctx.set_phase(PresencePhase::Online);

    deps.presence_writer
        .expect_set_status()
        .once()
        .with(
            predicate::eq(mock_data::user_id()),
            predicate::eq(PresenceStatus::Offline),
        )
        .return_once(|_, _| Box::pin(async { Ok(()) }));

    let deps = deps.into_deps();
    let coordinator = LifecycleCoordinator::from(&deps);

    coordinator
        .handle_event(LifecycleEvent::EnteredBackground)
        .await?;
    coordinator.flush().await;

    assert_eq!(deps.ctx.phase(), PresencePhase::Offline);
    Ok(())
}

#[tokio::test]
async fn test_failed_write_does_not_fail_the_event() -> Result<()> {
    let mut deps = MockAppDependencies::default();

    deps.presence_writer
        .expect_set_status()
        .once()
        .return_once(|_, _| Box::pin(async { Err(WriteError::Exhausted { attempts: 4 }) }));

    let deps = deps.into_deps();
    let coordinator = LifecycleCoordinator::from(&deps);

    coordinator.handle_event(LifecycleEvent::Launched).await?;
    coordinator.flush().await;

    assert_eq!(deps.ctx.phase(), PresencePhase::Online);
    Ok(())
}

#[tokio::test]
async fn test_logout_writes_offline_before_tearing_down() -> Result<()> {
    let mut deps = MockAppDependencies::default();
    deps.ctx.set_phase(PresencePhase::Online);

    let mut seq = Sequence::new();
    deps.presence_writer
        .expect_set_status()
        .once()
        .in_sequence(&mut seq)
        .with(
            predicate::eq(mock_data::user_id()),
            predicate::eq(PresenceStatus::Offline),
        )
        .return_once(|_, _| Box::pin(async { Ok(()) }));
    deps.presence_subscriber
        .expect_cancel_all()
        .once()
        .in_sequence(&mut seq)
        .return_const(());
    deps.presence_writer
        .expect_reset()
        .once()
        .in_sequence(&mut seq)
        .return_const(());

    let deps = deps.into_deps();
    let coordinator = LifecycleCoordinator::from(&deps);

    coordinator.handle_event(LifecycleEvent::LoggedOut).await?;
    assert_eq!(deps.ctx.phase(), PresencePhase::Terminated);

    // Ignored until the next connect.
    coordinator
        .handle_event(LifecycleEvent::EnteredForeground)
        .await?;
    coordinator.handle_event(LifecycleEvent::Launched).await?;
    coordinator.flush().await;
    assert_eq!(deps.ctx.phase(), PresencePhase::Terminated);

    Ok(())
}

#[tokio::test]
async fn test_requires_connected_user() {
    let mut deps = MockAppDependencies::default();
    deps.ctx = AppContext::new(Default::default());

    let deps = deps.into_deps();
    let coordinator = LifecycleCoordinator::from(&deps);

    assert!(coordinator
        .handle_event(LifecycleEvent::Launched)
        .await
        .is_err());
    assert_eq!(deps.ctx.phase(), PresencePhase::Uninitialized);
}

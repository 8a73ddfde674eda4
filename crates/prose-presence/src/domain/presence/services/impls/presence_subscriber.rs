// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use prose_presence_macros::DependenciesStruct;

use crate::app::deps::{
    DynAppContext, DynClientEventDispatcher, DynPresenceCache, DynPresenceStore,
};
use crate::domain::connection::models::ConnectionState;
use crate::domain::presence::models::{
    PresenceCallback, PresenceRecord, PresenceUpdate, SubscribeError, SubscriptionCanceller,
    SubscriptionHandle, TargetSet,
};
use crate::ClientEvent;

use super::super::PresenceSubscriber as PresenceSubscriberTrait;
use super::subscription_registry::{ChannelState, SubscriptionRegistry};
use super::PresenceDebouncer;

/// Upper bound of records handed to a callback in one update.
const MAX_BATCH_SIZE: usize = 256;

#[derive(DependenciesStruct)]
pub struct PresenceSubscriber {
    cache: DynPresenceCache,
    client_event_dispatcher: DynClientEventDispatcher,
    ctx: DynAppContext,
    presence_store: DynPresenceStore,
    /// Pumps run here, so that `observe` may be called from threads outside of the runtime.
    runtime: Handle,

    #[state]
    registry: Arc<SubscriptionRegistry>,
}

impl PresenceSubscriberTrait for PresenceSubscriber {
    fn observe(&self, targets: TargetSet, callback: PresenceCallback) -> SubscriptionHandle {
        let registration = self
            .registry
            .register(&targets, callback.clone(), |epoch| {
                self.spawn_pump(targets.clone(), epoch)
            });

        debug!(
            "Observing {:?} with subscription {}.",
            targets, registration.id
        );

        // Late joiners get the state of the channel right away, but never from within the
        // caller's stack.
        if !registration.replay.is_empty() {
            let active = registration.active.clone();
            let update = PresenceUpdate::new(registration.replay, self.ctx.config.fade_hint);
            self.runtime.spawn(async move {
                if active.load(Ordering::SeqCst) {
                    callback(update)
                }
            });
        }

        let registry: Arc<dyn SubscriptionCanceller> = self.registry.clone();
        SubscriptionHandle::new(
            registration.id,
            targets,
            registration.active,
            Arc::downgrade(&registry),
        )
    }

    fn cancel_all(&self) {
        self.registry.cancel_all()
    }

    fn handle_connection_changed(&self, state: ConnectionState) {
        match state {
            ConnectionState::Connected => {
                let channels = self.registry.reopenable_channels();
                if !channels.is_empty() {
                    info!("Reopening {} presence channels…", channels.len());
                }
                for targets in channels {
                    self.registry.install_pump(&targets, |epoch| {
                        self.spawn_pump(targets.clone(), epoch)
                    });
                }
            }
            ConnectionState::Disconnected => {
                debug!("Presence channels will be reopened once the connection is back.");
            }
        }
    }

    fn channel_count(&self) -> usize {
        self.registry.channel_count()
    }
}

impl PresenceSubscriber {
    fn spawn_pump(&self, targets: TargetSet, epoch: u64) -> AbortHandle {
        let pump = ChannelPump {
            cache: self.cache.clone(),
            client_event_dispatcher: self.client_event_dispatcher.clone(),
            debounce: self.ctx.config.offline_debounce,
            epoch,
            fade_hint: self.ctx.config.fade_hint,
            presence_store: self.presence_store.clone(),
            registry: self.registry.clone(),
            targets,
        };
        self.runtime.spawn(pump.run()).abort_handle()
    }
}

impl Drop for PresenceSubscriber {
    fn drop(&mut self) {
        self.registry.cancel_all()
    }
}

/// Feeds one channel from the store until the feed ends or the pump is aborted.
struct ChannelPump {
    cache: DynPresenceCache,
    client_event_dispatcher: DynClientEventDispatcher,
    debounce: Duration,
    epoch: u64,
    fade_hint: Duration,
    presence_store: DynPresenceStore,
    registry: Arc<SubscriptionRegistry>,
    targets: TargetSet,
}

impl ChannelPump {
    async fn run(self) {
        let feed = match self.presence_store.subscribe(&self.targets).await {
            Ok(feed) => feed,
            Err(err) => return self.handle_error(err),
        };

        if !self
            .registry
            .set_state(&self.targets, self.epoch, ChannelState::Live)
        {
            return;
        }

        let mut feed = feed.ready_chunks(MAX_BATCH_SIZE);
        let mut debouncer =
            PresenceDebouncer::with_baseline(self.registry.delivered(&self.targets), self.debounce);

        loop {
            let deadline = debouncer.next_deadline();

            tokio::select! {
                chunk = feed.next() => {
                    let Some(chunk) = chunk else {
                        return self.handle_error(SubscribeError::ChannelLost);
                    };

                    let now = Instant::now();
                    let mut records = vec![];
                    let mut failure = None;

                    for item in chunk {
                        match item {
                            Ok(record) if self.targets.contains(&record.user_id) => {
                                records.extend(debouncer.accept(record, now));
                            }
                            Ok(record) => {
                                debug!("Ignoring presence of unrelated user {}.", record.user_id);
                            }
                            Err(err) => {
                                failure = Some(err);
                                break;
                            }
                        }
                    }

                    self.deliver(records);

                    if let Some(err) = failure {
                        return self.handle_error(err);
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deliver(debouncer.flush_due(Instant::now()));
                }
            }
        }
    }

    fn deliver(&self, records: Vec<PresenceRecord>) {
        if records.is_empty() {
            return;
        }

        let listeners = self
            .registry
            .commit_delivery(&self.targets, self.epoch, &records);
        if listeners.is_empty() {
            return;
        }

        for record in &records {
            self.cache.put(record.clone());
        }

        let update = PresenceUpdate::new(records, self.fade_hint);
        for listener in listeners {
            if listener.active.load(Ordering::SeqCst) {
                (listener.callback)(update.clone())
            }
        }
    }

    fn handle_error(&self, err: SubscribeError) {
        match err {
            SubscribeError::Unauthorized => {
                if !self
                    .registry
                    .set_state(&self.targets, self.epoch, ChannelState::Failed)
                {
                    return;
                }
                error!("Not authorized to observe {:?}. Giving up.", self.targets);
                self.client_event_dispatcher
                    .dispatch_event(ClientEvent::SubscriptionFailed {
                        user_ids: self.targets.to_vec(),
                    });
            }
            SubscribeError::ChannelLost => {
                if !self
                    .registry
                    .set_state(&self.targets, self.epoch, ChannelState::Lost)
                {
                    return;
                }
                warn!("Lost presence channel for {:?}.", self.targets);
            }
        }
    }
}

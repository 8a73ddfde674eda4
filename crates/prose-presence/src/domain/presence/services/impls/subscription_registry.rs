// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::domain::presence::models::{
    PresenceCallback, PresenceRecord, SubscriptionCanceller, SubscriptionId, TargetSet,
};
use crate::domain::shared::models::UserId;

/// Maps target sets to their shared store channel. All mutations go through the single lock.
#[derive(Default)]
pub(super) struct SubscriptionRegistry {
    inner: Mutex<RegistryState>,
    next_id: AtomicU64,
    next_epoch: AtomicU64,
}

#[derive(Default)]
struct RegistryState {
    channels: HashMap<TargetSet, Channel>,
    handles: HashMap<SubscriptionId, TargetSet>,
}

struct Channel {
    listeners: Vec<Listener>,
    /// The records delivered most recently, per user.
    delivered: HashMap<UserId, PresenceRecord>,
    /// Identifies the pump that currently feeds this channel.
    epoch: u64,
    pump: Option<AbortHandle>,
    state: ChannelState,
}

#[derive(Clone)]
pub(super) struct Listener {
    id: SubscriptionId,
    pub callback: PresenceCallback,
    pub active: Arc<AtomicBool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChannelState {
    Opening,
    Live,
    Lost,
    Failed,
}

pub(super) struct Registration {
    pub id: SubscriptionId,
    pub active: Arc<AtomicBool>,
    /// Records to replay to the new listener.
    pub replay: Vec<PresenceRecord>,
}

impl Channel {
    fn new() -> Self {
        Self {
            listeners: vec![],
            delivered: Default::default(),
            epoch: 0,
            pump: None,
            state: ChannelState::Opening,
        }
    }
}

impl SubscriptionRegistry {
    /// Adds a listener for `targets`. If the channel has no running pump and hasn't failed,
    /// `spawn` is called with the epoch the new pump has to present when delivering.
    pub fn register(
        &self,
        targets: &TargetSet,
        callback: PresenceCallback,
        spawn: impl FnOnce(u64) -> AbortHandle,
    ) -> Registration {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let active = Arc::new(AtomicBool::new(true));

        let mut state = self.inner.lock();
        state.handles.insert(id, targets.clone());

        let channel = state
            .channels
            .entry(targets.clone())
            .or_insert_with(Channel::new);

        channel.listeners.push(Listener {
            id,
            callback,
            active: active.clone(),
        });

        // A failed channel is retried only once all of its handles are gone.
        if channel.pump.is_none() && channel.state != ChannelState::Failed {
            let epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst) + 1;
            channel.epoch = epoch;
            channel.state = ChannelState::Opening;
            channel.pump = Some(spawn(epoch));
        }

        Registration {
            id,
            active,
            replay: channel.delivered.values().cloned().collect(),
        }
    }

    /// Replaces the pump of `targets`, aborting the previous one. Returns false if the channel
    /// is gone.
    pub fn install_pump(&self, targets: &TargetSet, spawn: impl FnOnce(u64) -> AbortHandle) -> bool {
        let epoch = self.next_epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let mut state = self.inner.lock();
        let Some(channel) = state.channels.get_mut(targets) else {
            return false;
        };

        channel.epoch = epoch;
        channel.state = ChannelState::Opening;
        if let Some(previous) = channel.pump.replace(spawn(epoch)) {
            previous.abort();
        }
        true
    }

    /// Target sets of all channels that should be reopened after a reconnect.
    pub fn reopenable_channels(&self) -> Vec<TargetSet> {
        self.inner
            .lock()
            .channels
            .iter()
            .filter(|(_, channel)| channel.state != ChannelState::Failed)
            .map(|(targets, _)| targets.clone())
            .collect()
    }

    pub fn set_state(&self, targets: &TargetSet, epoch: u64, new_state: ChannelState) -> bool {
        let mut state = self.inner.lock();
        let Some(channel) = state.channels.get_mut(targets) else {
            return false;
        };
        if channel.epoch != epoch {
            return false;
        }

        channel.state = new_state;
        if matches!(new_state, ChannelState::Lost | ChannelState::Failed) {
            channel.pump = None;
        }
        true
    }

    pub fn delivered(&self, targets: &TargetSet) -> Vec<PresenceRecord> {
        self.inner
            .lock()
            .channels
            .get(targets)
            .map(|channel| channel.delivered.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Records `records` as delivered and returns the listeners to notify. Returns nothing if
    /// the pump identified by `epoch` has been replaced in the meantime.
    pub fn commit_delivery(
        &self,
        targets: &TargetSet,
        epoch: u64,
        records: &[PresenceRecord],
    ) -> Vec<Listener> {
        let mut state = self.inner.lock();
        let Some(channel) = state.channels.get_mut(targets) else {
            return vec![];
        };
        if channel.epoch != epoch {
            return vec![];
        }

        for record in records {
            channel
                .delivered
                .insert(record.user_id.clone(), record.clone());
        }
        channel.listeners.clone()
    }

    pub fn channel_count(&self) -> usize {
        self.inner.lock().channels.len()
    }

    pub fn cancel_all(&self) {
        let mut state = self.inner.lock();

        for (_, channel) in state.channels.drain() {
            for listener in &channel.listeners {
                listener.active.store(false, Ordering::SeqCst);
            }
            if let Some(pump) = channel.pump {
                pump.abort();
            }
        }
        state.handles.clear();
    }
}

impl SubscriptionCanceller for SubscriptionRegistry {
    fn cancel(&self, id: SubscriptionId) {
        let mut state = self.inner.lock();

        let Some(targets) = state.handles.remove(&id) else {
            return;
        };

        let Entry::Occupied(mut entry) = state.channels.entry(targets) else {
            return;
        };
        entry.get_mut().listeners.retain(|listener| listener.id != id);

        if !entry.get().listeners.is_empty() {
            return;
        }

        let (targets, channel) = entry.remove_entry();
        if let Some(pump) = channel.pump {
            pump.abort();
        }
        debug!("Closed presence channel for {:?}.", targets);
    }
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use super::TargetSet;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl Debug for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait SubscriptionCanceller: Send + Sync {
    fn cancel(&self, id: SubscriptionId);
}

/// Keeps a presence subscription alive. Cancelling (or dropping) the handle detaches the
/// callback; the handle goes inactive synchronously so no further updates are delivered.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    targets: TargetSet,
    active: Arc<AtomicBool>,
    canceller: Option<Weak<dyn SubscriptionCanceller>>,
}

impl SubscriptionHandle {
    pub fn new(
        id: SubscriptionId,
        targets: TargetSet,
        active: Arc<AtomicBool>,
        canceller: Weak<dyn SubscriptionCanceller>,
    ) -> Self {
        Self {
            id,
            targets,
            active,
            canceller: Some(canceller),
        }
    }

    /// A handle that isn't backed by any subscriber. Useful for mocks.
    pub fn detached(id: SubscriptionId, targets: TargetSet) -> Self {
        Self {
            id,
            targets,
            active: Arc::new(AtomicBool::new(true)),
            canceller: None,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn cancel(self) {
        // Dropping does the work.
    }

    fn deactivate(&mut self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(canceller) = self.canceller.take().and_then(|c| c.upgrade()) {
            canceller.cancel(self.id);
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.deactivate()
    }
}

impl Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("targets", &self.targets)
            .field("active", &self.is_active())
            .finish()
    }
}

// prose-presence/prose-presence
//
// Copyright: 2024, Marc Bauer <mb@nesium.com>
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};

use crate::domain::shared::models::UserId;

/// The set of users watched by one subscription. Subscriptions with equal target sets share a
/// single store channel.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TargetSet(BTreeSet<UserId>);

impl TargetSet {
    pub fn single(user_id: UserId) -> Self {
        TargetSet(BTreeSet::from([user_id]))
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.0.contains(user_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserId> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<UserId> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<UserId> for TargetSet {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        TargetSet(iter.into_iter().collect())
    }
}

impl From<UserId> for TargetSet {
    fn from(value: UserId) -> Self {
        TargetSet::single(value)
    }
}

impl Debug for TargetSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

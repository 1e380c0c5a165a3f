//! Concurrent index of open channels, keyed by user and by channel id.

use std::sync::Arc;

use dashmap::DashMap;

use atelier_core::types::{ChannelId, UserId};

use crate::channel::Channel;

/// Registry of all open delivery channels.
///
/// The per-user vector keeps registration order, which the session manager
/// relies on when it evicts a user's oldest channel.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    by_user: DashMap<UserId, Vec<Arc<Channel>>>,
    by_id: DashMap<ChannelId, Arc<Channel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, channel: Arc<Channel>) {
        self.by_id.insert(channel.id(), Arc::clone(&channel));
        self.by_user
            .entry(channel.user_id())
            .or_default()
            .push(channel);
    }

    /// Remove a channel from both indexes.
    ///
    /// Unknown ids are ignored, so tearing the same channel down from two
    /// paths (socket close and heartbeat timeout) is harmless.
    pub fn unregister(&self, id: &ChannelId) -> Option<Arc<Channel>> {
        let (_, channel) = self.by_id.remove(id)?;
        let user_id = channel.user_id();
        let mut emptied = false;
        if let Some(mut channels) = self.by_user.get_mut(&user_id) {
            channels.retain(|c| c.id() != *id);
            emptied = channels.is_empty();
        }
        if emptied {
            // Re-checked under the entry lock: a concurrent register may
            // have refilled the vector since we released it.
            self.by_user.remove_if(&user_id, |_, channels| channels.is_empty());
        }
        Some(channel)
    }

    pub fn channel(&self, id: &ChannelId) -> Option<Arc<Channel>> {
        self.by_id.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// All channels belonging to one user, in registration order.
    pub fn channels_for(&self, user_id: &UserId) -> Vec<Arc<Channel>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Every open channel, for broadcast fan-out.
    pub fn all_channels(&self) -> Vec<Arc<Channel>> {
        self.by_id
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.by_user
            .get(user_id)
            .map(|entry| !entry.value().is_empty())
            .unwrap_or(false)
    }

    pub fn channel_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

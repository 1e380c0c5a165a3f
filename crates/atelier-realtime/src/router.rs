//! Fan-out of outbound events to the channels that should carry them.

use std::sync::Arc;

use tracing::debug;

use atelier_core::types::{ChannelId, UserId};

use crate::channel::{Channel, ChannelRegistry, PushStatus};
use crate::message::OutboundEvent;
use crate::metrics::HubMetrics;

/// The fate of one push into one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelPush {
    pub channel_id: ChannelId,
    pub status: PushStatus,
}

/// Aggregate result of delivering one event.
#[derive(Debug, Default)]
pub struct DeliveryOutcome {
    pub pushes: Vec<ChannelPush>,
}

impl DeliveryOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no channel was eligible, i.e. the target is offline.
    pub fn is_offline(&self) -> bool {
        self.pushes.is_empty()
    }

    /// Number of channels that accepted the event.
    pub fn delivered(&self) -> usize {
        self.pushes
            .iter()
            .filter(|push| push.status.is_delivered())
            .count()
    }
}

/// Routes events to channels. Stateless beyond its registry handle;
/// delivery itself is synchronous and never blocks on consumers.
#[derive(Debug)]
pub struct DeliveryRouter {
    registry: Arc<ChannelRegistry>,
    metrics: Arc<HubMetrics>,
}

impl DeliveryRouter {
    pub fn new(registry: Arc<ChannelRegistry>, metrics: Arc<HubMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Deliver an event to every open channel of one user.
    ///
    /// An empty outcome means the user has no channels right now; durable
    /// events reach them later through backfill.
    pub fn deliver_to_user(&self, user_id: &UserId, event: &OutboundEvent) -> DeliveryOutcome {
        self.push_all(self.registry.channels_for(user_id), event)
    }

    /// Deliver an event to every open channel, honoring per-session
    /// presence filters for presence frames.
    pub fn broadcast(&self, event: &OutboundEvent) -> DeliveryOutcome {
        let channels = match event.presence_user() {
            Some(subject) => self
                .registry
                .all_channels()
                .into_iter()
                .filter(|channel| channel.wants_presence(&subject))
                .collect(),
            None => self.registry.all_channels(),
        };
        self.push_all(channels, event)
    }

    fn push_all(&self, channels: Vec<Arc<Channel>>, event: &OutboundEvent) -> DeliveryOutcome {
        let mut pushes = Vec::with_capacity(channels.len());
        for channel in channels {
            let status = channel.push_live(event.clone());
            self.metrics.record_push(status);
            match status {
                PushStatus::Evicted => debug!(
                    channel = %channel.id(),
                    event = event.name(),
                    "Slow consumer; oldest buffered event evicted"
                ),
                PushStatus::Closed => debug!(
                    channel = %channel.id(),
                    event = event.name(),
                    "Dropped event for closed channel"
                ),
                _ => {}
            }
            pushes.push(ChannelPush {
                channel_id: channel.id(),
                status,
            });
        }
        DeliveryOutcome { pushes }
    }
}

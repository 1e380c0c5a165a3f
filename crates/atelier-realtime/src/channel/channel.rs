//! Bounded per-session delivery channel with a replay gate.
//!
//! A channel is the only path from the hub to one WebSocket. It buffers a
//! bounded number of events; when the buffer is full the oldest event is
//! evicted so a slow consumer can never stall producers. Until the replay
//! gate opens, live events are parked in a side buffer so that backfilled
//! history is always drained first.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use uuid::Uuid;

use atelier_core::types::{ChannelId, SessionId, UserId};

use crate::message::OutboundEvent;

/// Result of pushing one event into a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStatus {
    /// The event was buffered for delivery.
    Delivered,
    /// The event replaced an unconsumed presence update with the same key.
    Coalesced,
    /// The event was buffered, evicting the oldest buffered event.
    Evicted,
    /// The channel is closed; the event was dropped.
    Closed,
}

impl PushStatus {
    /// Whether the event will reach the consumer.
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug)]
struct EventQueue {
    /// Events the consumer may take now.
    ready: VecDeque<OutboundEvent>,
    /// Live events held back while history replay is in progress.
    parked: VecDeque<OutboundEvent>,
    /// Once true, live events go straight to `ready`.
    gate_open: bool,
}

/// A single session's delivery channel.
///
/// Producers push synchronously and never block; the consuming socket task
/// awaits [`Channel::recv`]. All state is behind one mutex held only for
/// queue manipulation.
#[derive(Debug)]
pub struct Channel {
    id: ChannelId,
    user_id: UserId,
    session_id: SessionId,
    capacity: usize,
    open: AtomicBool,
    queue: Mutex<EventQueue>,
    notify: Notify,
    presence_filter: Mutex<Option<HashSet<UserId>>>,
    last_pong: Mutex<DateTime<Utc>>,
}

impl Channel {
    pub fn new(user_id: UserId, session_id: SessionId, capacity: usize) -> Self {
        Self {
            id: ChannelId::new(),
            user_id,
            session_id,
            capacity: capacity.max(1),
            open: AtomicBool::new(true),
            queue: Mutex::new(EventQueue {
                ready: VecDeque::new(),
                parked: VecDeque::new(),
                gate_open: false,
            }),
            notify: Notify::new(),
            presence_filter: Mutex::new(None),
            last_pong: Mutex::new(Utc::now()),
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Push a live event.
    ///
    /// While the replay gate is closed the event is parked; it surfaces when
    /// [`Channel::open_gate`] runs. Pushing into a closed channel drops the
    /// event and reports [`PushStatus::Closed`].
    pub fn push_live(&self, event: OutboundEvent) -> PushStatus {
        if !self.is_open() {
            return PushStatus::Closed;
        }
        let status = {
            let mut queue = self.lock_queue();
            if queue.gate_open {
                enqueue_bounded(&mut queue.ready, event, self.capacity)
            } else {
                enqueue_bounded(&mut queue.parked, event, self.capacity)
            }
        };
        self.notify.notify_one();
        status
    }

    /// Push a replayed history event, bypassing the gate.
    ///
    /// Replay volume is bounded upstream by the backfill limit, so no
    /// eviction applies here.
    pub fn push_replay(&self, event: OutboundEvent) -> PushStatus {
        if !self.is_open() {
            return PushStatus::Closed;
        }
        {
            let mut queue = self.lock_queue();
            queue.ready.push_back(event);
        }
        self.notify.notify_one();
        PushStatus::Delivered
    }

    /// Open the replay gate and promote parked live events.
    ///
    /// `replayed` holds the durable ids already pushed during backfill;
    /// parked events carrying one of those ids were raced by the replay and
    /// are discarded instead of being delivered twice.
    pub fn open_gate(&self, replayed: &HashSet<Uuid>) {
        {
            let mut queue = self.lock_queue();
            if queue.gate_open {
                return;
            }
            queue.gate_open = true;
            while let Some(event) = queue.parked.pop_front() {
                if let Some(id) = event.event_id() {
                    if replayed.contains(&id) {
                        continue;
                    }
                }
                queue.ready.push_back(event);
            }
        }
        self.notify.notify_one();
    }

    /// Await the next deliverable event.
    ///
    /// Returns `None` once the channel is closed. A channel has exactly one
    /// consumer, the socket task that drains it.
    pub async fn recv(&self) -> Option<OutboundEvent> {
        loop {
            {
                let mut queue = self.lock_queue();
                if let Some(event) = queue.ready.pop_front() {
                    return Some(event);
                }
            }
            if !self.is_open() {
                return None;
            }
            self.notify.notified().await;
        }
    }

    /// Take the next deliverable event without waiting.
    pub fn try_recv(&self) -> Option<OutboundEvent> {
        self.lock_queue().ready.pop_front()
    }

    /// Number of buffered events, parked ones included.
    pub fn depth(&self) -> usize {
        let queue = self.lock_queue();
        queue.ready.len() + queue.parked.len()
    }

    /// Close the channel. Buffered events are discarded and subsequent
    /// pushes are dropped silently.
    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        {
            let mut queue = self.lock_queue();
            queue.ready.clear();
            queue.parked.clear();
        }
        // notify_one stores a permit even with no waiter registered, so a
        // consumer between its queue check and `notified().await` still wakes.
        self.notify.notify_one();
    }

    /// Replace the session's presence interest list. `None` means all users.
    pub fn set_presence_filter(&self, filter: Option<HashSet<UserId>>) {
        *lock_ignore_poison(&self.presence_filter) = filter;
    }

    /// Whether this session wants presence frames about `user_id`.
    pub fn wants_presence(&self, user_id: &UserId) -> bool {
        match lock_ignore_poison(&self.presence_filter).as_ref() {
            Some(allowed) => allowed.contains(user_id),
            None => true,
        }
    }

    /// Record a heartbeat response from the client.
    pub fn record_pong(&self) {
        *lock_ignore_poison(&self.last_pong) = Utc::now();
    }

    /// Instant of the most recent pong (or channel creation).
    pub fn last_pong(&self) -> DateTime<Utc> {
        *lock_ignore_poison(&self.last_pong)
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, EventQueue> {
        lock_ignore_poison(&self.queue)
    }
}

/// Append to a bounded buffer, coalescing presence and evicting the oldest
/// event when full.
fn enqueue_bounded(
    buffer: &mut VecDeque<OutboundEvent>,
    event: OutboundEvent,
    capacity: usize,
) -> PushStatus {
    if let Some(key) = event.presence_key() {
        if let Some(slot) = buffer.iter_mut().find(|e| e.presence_key() == Some(key)) {
            *slot = event;
            return PushStatus::Coalesced;
        }
    }
    if buffer.len() >= capacity {
        buffer.pop_front();
        buffer.push_back(event);
        return PushStatus::Evicted;
    }
    buffer.push_back(event);
    PushStatus::Delivered
}

fn lock_ignore_poison<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

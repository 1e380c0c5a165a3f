//! `[hub]` section: the delivery engine's knobs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    /// Bounded outbound buffer per delivery channel. When a buffer is
    /// full, the oldest buffered event is dropped.
    #[serde(default = "defaults::channel_buffer")]
    pub channel_buffer_size: usize,
    /// Concurrent delivery channels allowed per user. The oldest channel
    /// is evicted when the cap is exceeded.
    #[serde(default = "defaults::channels_per_user")]
    pub max_channels_per_user: usize,
    /// Upper bound on backfill replay duration in seconds. On expiry the
    /// session proceeds to live delivery and the gap is logged.
    #[serde(default = "defaults::backfill_timeout")]
    pub backfill_timeout_seconds: u64,
    /// Cadence of server pings over the socket, in seconds.
    #[serde(default = "defaults::ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without a pong before a session is considered dead.
    #[serde(default = "defaults::ping_timeout")]
    pub ping_timeout_seconds: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: defaults::channel_buffer(),
            max_channels_per_user: defaults::channels_per_user(),
            backfill_timeout_seconds: defaults::backfill_timeout(),
            ping_interval_seconds: defaults::ping_interval(),
            ping_timeout_seconds: defaults::ping_timeout(),
        }
    }
}

mod defaults {
    pub fn channel_buffer() -> usize {
        256
    }

    pub fn channels_per_user() -> usize {
        8
    }

    pub fn backfill_timeout() -> u64 {
        5
    }

    pub fn ping_interval() -> u64 {
        30
    }

    pub fn ping_timeout() -> u64 {
        90
    }
}

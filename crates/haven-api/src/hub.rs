//! Per-channel broadcast hub.
//!
//! One tokio broadcast channel per signaling channel, created lazily on
//! first subscription or publish. Every WebSocket connection subscribed
//! to a channel gets every broadcast; a publish with no subscribers is
//! dropped silently, matching pub/sub semantics.

use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use haven_types::channel::ChannelId;

/// Buffered broadcasts per channel before slow subscribers lag.
const CHANNEL_CAPACITY: usize = 256;

pub struct ChannelHub {
    channels: DashMap<ChannelId, broadcast::Sender<String>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    fn sender(&self, channel_id: ChannelId) -> broadcast::Sender<String> {
        self.channels
            .entry(channel_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a channel's broadcasts.
    pub fn subscribe(&self, channel_id: ChannelId) -> broadcast::Receiver<String> {
        self.sender(channel_id).subscribe()
    }

    /// Publish a frame to all current subscribers of a channel.
    pub fn publish(&self, channel_id: ChannelId, payload: String) {
        let sender = self.sender(channel_id);
        match sender.send(payload) {
            Ok(receivers) => debug!(channel_id, receivers, "broadcast delivered"),
            Err(_) => debug!(channel_id, "broadcast with no subscribers dropped"),
        }
    }

    /// Drop a channel's sender when nobody is listening anymore. Called
    /// by connections after unsubscribing; a racing subscribe simply
    /// recreates the entry.
    pub fn prune(&self, channel_id: ChannelId) {
        self.channels
            .remove_if(&channel_id, |_, sender| sender.receiver_count() == 0);
    }
}

impl Default for ChannelHub {
    fn default() -> Self {
        Self::new()
    }
}

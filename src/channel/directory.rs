//! Channel directory - maps channel names to subscriber endpoints
//!
//! The directory owns channel lifecycle but not the sessions it lists:
//! subscriber entries are endpoint keys resolved through the session
//! registry. The default channel exists for the lifetime of the directory;
//! any other channel is deleted the instant its subscriber list empties.

use std::collections::HashMap;
use std::net::SocketAddr;

/// Result of a join request against the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Channel did not exist; created with this one subscriber
    Created,
    /// Channel existed; subscriber added
    Joined,
    /// Subscriber was already on the channel; no-op
    AlreadyMember,
}

/// All channels on the server, keyed by exact (truncated) name
pub struct ChannelDirectory {
    /// Subscriber endpoints per channel, in insertion order
    channels: HashMap<String, Vec<SocketAddr>>,

    /// The permanent channel; never deleted, even with zero subscribers
    default_channel: String,
}

impl ChannelDirectory {
    /// Create a directory holding only the (empty) default channel
    pub fn new(default_channel: &str) -> Self {
        let mut channels = HashMap::new();
        channels.insert(default_channel.to_string(), Vec::new());
        Self {
            channels,
            default_channel: default_channel.to_string(),
        }
    }

    pub fn default_channel(&self) -> &str {
        &self.default_channel
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Add a subscriber, creating the channel if it does not exist.
    /// Membership is deduplicated by endpoint identity.
    pub fn join_or_create(&mut self, name: &str, endpoint: SocketAddr) -> JoinOutcome {
        match self.channels.get_mut(name) {
            None => {
                self.channels.insert(name.to_string(), vec![endpoint]);
                JoinOutcome::Created
            }
            Some(subscribers) => {
                if subscribers.contains(&endpoint) {
                    JoinOutcome::AlreadyMember
                } else {
                    subscribers.push(endpoint);
                    JoinOutcome::Joined
                }
            }
        }
    }

    /// Remove a subscriber if present. An empty non-default channel is
    /// deleted on the spot; returns true if the channel was deleted.
    pub fn leave(&mut self, name: &str, endpoint: SocketAddr) -> bool {
        let Some(subscribers) = self.channels.get_mut(name) else {
            return false;
        };
        subscribers.retain(|s| *s != endpoint);
        if subscribers.is_empty() && name != self.default_channel {
            self.channels.remove(name);
            return true;
        }
        false
    }

    /// Snapshot of one channel's subscribers, in insertion order
    pub fn subscribers(&self, name: &str) -> Option<Vec<SocketAddr>> {
        self.channels.get(name).cloned()
    }

    /// Snapshot of all channel names
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

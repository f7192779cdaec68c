//! Client-local session state
//!
//! The subscription cache is advisory only: the server is the source of
//! truth for who is actually subscribed, and nothing here is ever
//! reconciled with it after a request is sent.

use crate::protocol::SAY_MAX;

/// Fixed capacity of the local subscription cache
pub const SUBSCRIPTION_SLOTS: usize = 10;

/// Everything the client believes about its own session
pub struct App {
    /// The line being typed but not yet submitted
    pub editor: LineEditor,

    /// Channel names the user believes it has joined
    subscriptions: [Option<String>; SUBSCRIPTION_SLOTS],

    /// Target of plain (non-command) lines
    active: Option<String>,
}

impl App {
    /// Fresh state: subscribed to the default channel, which is active
    pub fn new(default_channel: &str) -> Self {
        let mut subscriptions: [Option<String>; SUBSCRIPTION_SLOTS] =
            std::array::from_fn(|_| None);
        subscriptions[0] = Some(default_channel.to_string());
        Self {
            editor: LineEditor::new(SAY_MAX - 1),
            subscriptions,
            active: Some(default_channel.to_string()),
        }
    }

    pub fn active_channel(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.subscriptions
            .iter()
            .any(|slot| slot.as_deref() == Some(name))
    }

    /// Record a join and make the channel active. A cached name is just
    /// reactivated; a new one takes the first empty slot. Returns false
    /// when the cache is saturated, in which case nothing is recorded
    /// even though the join request still goes to the server.
    pub fn record_join(&mut self, name: &str) -> bool {
        if self.is_subscribed(name) {
            self.active = Some(name.to_string());
            return true;
        }
        match self.subscriptions.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(name.to_string());
                self.active = Some(name.to_string());
                true
            }
            None => false,
        }
    }

    /// Clear the matching cache slot, and the active channel if it points
    /// at the same name
    pub fn record_leave(&mut self, name: &str) {
        for slot in &mut self.subscriptions {
            if slot.as_deref() == Some(name) {
                *slot = None;
            }
        }
        if self.active.as_deref() == Some(name) {
            self.active = None;
        }
    }

    /// Change the active channel; only succeeds for a cached name
    pub fn switch_to(&mut self, name: &str) -> bool {
        if self.is_subscribed(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }
}

/// Input line editor, append/backspace only, bounded in bytes
pub struct LineEditor {
    buffer: String,
    limit: usize,
}

impl LineEditor {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            limit,
        }
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// False when the line is at capacity; the character is dropped
    pub fn insert(&mut self, c: char) -> bool {
        if self.buffer.len() + c.len_utf8() > self.limit {
            return false;
        }
        self.buffer.push(c);
        true
    }

    /// False when there is nothing to erase
    pub fn backspace(&mut self) -> bool {
        self.buffer.pop().is_some()
    }

    /// Complete the line: return it and clear the buffer
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

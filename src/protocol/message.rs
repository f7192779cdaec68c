//! Message types for the parley wire protocol

/// Requests sent from client to server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Announce this endpoint under a display name
    Login { username: String },

    /// Tear down this endpoint's session
    Logout,

    /// Subscribe to a channel, creating it if unknown
    Join { channel: String },

    /// Unsubscribe from a channel
    Leave { channel: String },

    /// Broadcast a line of text to a channel's subscribers
    Say { channel: String, text: String },

    /// Request the list of existing channels
    List,

    /// Request the subscribers of a channel
    Who { channel: String },
}

/// Replies sent from server to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A chat line relayed to a channel subscriber
    Say {
        channel: String,
        username: String,
        text: String,
    },

    /// Channel list response
    ChannelList { channels: Vec<String> },

    /// Subscriber list response for one channel
    UserList {
        channel: String,
        users: Vec<String>,
    },

    /// Error response
    Error { message: String },
}

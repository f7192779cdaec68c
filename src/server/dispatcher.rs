//! Routing dispatcher - one state transition per inbound datagram
//!
//! The dispatcher decodes nothing and sends nothing: the listener hands it
//! a parsed request plus the source endpoint, it mutates the session
//! registry and channel directory, and it returns the unicast replies to
//! transmit. One request is fully processed before the next is decoded;
//! there is no state across invocations beyond the two directories.

use std::net::SocketAddr;

use crate::channel::{ChannelDirectory, JoinOutcome};
use crate::protocol::{self, Reply, Request, CHANNEL_MAX};
use crate::server::session::SessionRegistry;

/// One datagram to transmit after a dispatch step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub dest: SocketAddr,
    pub reply: Reply,
}

impl Outbound {
    fn to(dest: SocketAddr, reply: Reply) -> Self {
        Self { dest, reply }
    }
}

/// Server routing engine: owns the session registry and channel directory
pub struct Dispatcher {
    registry: SessionRegistry,
    directory: ChannelDirectory,
}

impl Dispatcher {
    pub fn new(default_channel: &str, max_sessions: usize) -> Self {
        Self {
            registry: SessionRegistry::new(max_sessions),
            directory: ChannelDirectory::new(default_channel),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &ChannelDirectory {
        &self.directory
    }

    /// Process one request, returning zero or more unicast replies
    pub fn dispatch(&mut self, request: Request, from: SocketAddr) -> Vec<Outbound> {
        match request {
            Request::Login { username } => self.handle_login(username, from),
            Request::Logout => self.handle_logout(from),
            Request::Join { channel } => self.handle_join(&channel, from),
            Request::Leave { channel } => self.handle_leave(&channel, from),
            Request::Say { channel, text } => self.handle_say(&channel, &text, from),
            Request::List => self.handle_list(from),
            Request::Who { channel } => self.handle_who(&channel, from),
        }
    }

    /// Login is fire-and-forget: no reply on success. A second login from
    /// an endpoint that already has a session is treated as an implicit
    /// logout followed by the new login, so no channel entry outlives its
    /// session.
    fn handle_login(&mut self, username: String, from: SocketAddr) -> Vec<Outbound> {
        if self.registry.lookup(from).is_some() {
            self.handle_logout(from);
        }
        let username = protocol::truncate(&username, protocol::USERNAME_MAX - 1).to_string();
        match self.registry.register(from, username.clone()) {
            Ok(()) => {
                tracing::info!("{} logged in to the chat from {}", username, from);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("rejecting login from {}: {}", from, e);
                vec![Outbound::to(
                    from,
                    Reply::Error {
                        message: "Failed to log into the server.".to_string(),
                    },
                )]
            }
        }
    }

    /// Logout cascades: the endpoint is removed from every channel it had
    /// joined, and channels left empty (other than the default) go away.
    fn handle_logout(&mut self, from: SocketAddr) -> Vec<Outbound> {
        let Some(session) = self.registry.unregister(from) else {
            return Vec::new();
        };
        tracing::info!("{} logged out", session.username());
        for channel in session.channels() {
            if self.directory.leave(channel, from) {
                tracing::info!("Removed the empty channel {}", channel);
            }
        }
        Vec::new()
    }

    fn handle_join(&mut self, channel: &str, from: SocketAddr) -> Vec<Outbound> {
        let channel = protocol::truncate(channel, CHANNEL_MAX - 1);
        let Some(session) = self.registry.lookup_mut(from) else {
            return Vec::new();
        };
        session.add_channel(channel);
        let username = session.username().to_string();
        match self.directory.join_or_create(channel, from) {
            JoinOutcome::Created => {
                tracing::info!("{} created the channel {}", username, channel)
            }
            JoinOutcome::Joined | JoinOutcome::AlreadyMember => {
                tracing::info!("{} joined the channel {}", username, channel)
            }
        }
        Vec::new()
    }

    fn handle_leave(&mut self, channel: &str, from: SocketAddr) -> Vec<Outbound> {
        let channel = protocol::truncate(channel, CHANNEL_MAX - 1);
        let Some(session) = self.registry.lookup_mut(from) else {
            return Vec::new();
        };
        if !self.directory.contains(channel) {
            tracing::info!("Channel named {} does not exist", channel);
            return vec![Outbound::to(
                from,
                Reply::Error {
                    message: "Channel you are trying to leave does not exist.".to_string(),
                },
            )];
        }
        session.remove_channel(channel);
        tracing::info!("{} left the channel {}", session.username(), channel);
        if self.directory.leave(channel, from) {
            tracing::info!("Removed the empty channel {}", channel);
        }
        Vec::new()
    }

    /// Fan-out is a loop of unicasts over the subscriber snapshot taken
    /// here. The sender's own membership of the named channel is not
    /// checked; the channel name in the request is trusted as-is.
    fn handle_say(&mut self, channel: &str, text: &str, from: SocketAddr) -> Vec<Outbound> {
        let channel = protocol::truncate(channel, CHANNEL_MAX - 1);
        let Some(session) = self.registry.lookup(from) else {
            return Vec::new();
        };
        let Some(subscribers) = self.directory.subscribers(channel) else {
            return Vec::new();
        };
        let username = session.username().to_string();
        let text = protocol::truncate(text, protocol::SAY_MAX - 1).to_string();
        tracing::info!("[{}][{}]: \"{}\"", channel, username, text);
        subscribers
            .into_iter()
            .filter_map(|endpoint| {
                let listener = self.registry.lookup(endpoint)?;
                Some(Outbound::to(
                    listener.addr(),
                    Reply::Say {
                        channel: channel.to_string(),
                        username: username.clone(),
                        text: text.clone(),
                    },
                ))
            })
            .collect()
    }

    fn handle_list(&mut self, from: SocketAddr) -> Vec<Outbound> {
        let Some(session) = self.registry.lookup(from) else {
            return Vec::new();
        };
        tracing::info!("{} listed available channels on server", session.username());
        vec![Outbound::to(
            from,
            Reply::ChannelList {
                channels: self.directory.channel_names(),
            },
        )]
    }

    fn handle_who(&mut self, channel: &str, from: SocketAddr) -> Vec<Outbound> {
        let channel = protocol::truncate(channel, CHANNEL_MAX - 1);
        let Some(session) = self.registry.lookup(from) else {
            return Vec::new();
        };
        let Some(subscribers) = self.directory.subscribers(channel) else {
            tracing::info!("Channel named {} does not exist", channel);
            return vec![Outbound::to(
                from,
                Reply::Error {
                    message: "Channel does not exist.".to_string(),
                },
            )];
        };
        tracing::info!(
            "{} listed all users on channel {}",
            session.username(),
            channel
        );
        let users = subscribers
            .into_iter()
            .filter_map(|endpoint| {
                self.registry
                    .lookup(endpoint)
                    .map(|s| s.username().to_string())
            })
            .collect();
        vec![Outbound::to(
            from,
            Reply::UserList {
                channel: channel.to_string(),
                users,
            },
        )]
    }
}

//! Session management - per-endpoint identity and subscription records

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;

/// Registry-level errors, surfaced to the requester as protocol error
/// replies rather than propagated
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("session registry is full ({capacity} sessions)")]
    Full { capacity: usize },
}

/// One logged-in endpoint: display name plus the channels it has joined
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    addr: SocketAddr,
    channels: Vec<String>,
}

impl Session {
    pub fn new(username: String, addr: SocketAddr) -> Self {
        Self {
            username,
            addr,
            channels: Vec::new(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Channel names this session has joined, in join order
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Record a joined channel. Set semantics: joining a channel twice
    /// leaves a single entry.
    pub fn add_channel(&mut self, name: &str) {
        if !self.channels.iter().any(|c| c == name) {
            self.channels.push(name.to_string());
        }
    }

    pub fn remove_channel(&mut self, name: &str) {
        self.channels.retain(|c| c != name);
    }
}

/// All live sessions, keyed by the transport endpoint.
///
/// The endpoint (address + port) is the stable session identity; the
/// registry exclusively owns the session records, and the channel
/// directory refers to them only by endpoint.
pub struct SessionRegistry {
    sessions: HashMap<SocketAddr, Session>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity,
        }
    }

    /// Create and store a session for an endpoint. Fails only when the
    /// registry is at capacity.
    pub fn register(&mut self, addr: SocketAddr, username: String) -> Result<(), RegistryError> {
        if self.sessions.len() >= self.capacity && !self.sessions.contains_key(&addr) {
            return Err(RegistryError::Full {
                capacity: self.capacity,
            });
        }
        self.sessions.insert(addr, Session::new(username, addr));
        Ok(())
    }

    /// Remove and return the session for an endpoint, if any
    pub fn unregister(&mut self, addr: SocketAddr) -> Option<Session> {
        self.sessions.remove(&addr)
    }

    pub fn lookup(&self, addr: SocketAddr) -> Option<&Session> {
        self.sessions.get(&addr)
    }

    pub fn lookup_mut(&mut self, addr: SocketAddr) -> Option<&mut Session> {
        self.sessions.get_mut(&addr)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

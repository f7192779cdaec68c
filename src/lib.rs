//! parley - A minimal multi-channel chat system over UDP
//!
//! This crate provides the core functionality for parley, including:
//! - The datagram wire protocol shared by client and server
//! - Server-side session and channel directories plus message routing
//! - The interactive client loop and its command interpreter
//!
//! # Architecture
//!
//! parley uses a client-server model where:
//! - The server (`parley-server`) keeps per-endpoint sessions and fans
//!   chat messages out to channel subscribers
//! - The client (`parley`) multiplexes keyboard and network input behind
//!   a single prompt
//! - Communication happens over UDP, one fixed-layout record per datagram

pub mod channel;
pub mod client;
pub mod config;
pub mod protocol;
pub mod server;

//! Channel directory - named broadcast groups and their subscribers

mod directory;

pub use directory::{ChannelDirectory, JoinOutcome};

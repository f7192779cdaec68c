//! Wire protocol for client-server datagrams
//!
//! Every message is one fixed-layout binary record per UDP datagram: a
//! 32-bit little-endian tag followed by fixed-capacity NUL-padded text
//! fields. There is no length prefix; the datagram boundary is the record
//! boundary. Values longer than a field's capacity are silently truncated
//! on encode, never rejected.

mod message;

pub use message::{Reply, Request};

use thiserror::Error;

/// Capacity of a username field, including the trailing NUL
pub const USERNAME_MAX: usize = 32;

/// Capacity of a channel name field, including the trailing NUL
pub const CHANNEL_MAX: usize = 32;

/// Capacity of a message text field, including the trailing NUL
pub const SAY_MAX: usize = 64;

const REQ_LOGIN: u32 = 0;
const REQ_LOGOUT: u32 = 1;
const REQ_JOIN: u32 = 2;
const REQ_LEAVE: u32 = 3;
const REQ_SAY: u32 = 4;
const REQ_LIST: u32 = 5;
const REQ_WHO: u32 = 6;

const TXT_SAY: u32 = 0;
const TXT_LIST: u32 = 1;
const TXT_WHO: u32 = 2;
const TXT_ERROR: u32 = 3;

/// Codec-specific errors
///
/// Every caller treats a decode failure as a silently ignored datagram;
/// no error reply is ever produced for one.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("datagram too short: {len} bytes, record needs {need}")]
    Truncated { len: usize, need: usize },

    #[error("unknown record tag: {0}")]
    UnknownTag(u32),

    #[error("declared entry count {count} does not fit in {len}-byte datagram")]
    CountMismatch { count: u32, len: usize },
}

/// Truncate to the longest prefix of at most `max` bytes that ends on a
/// character boundary.
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Append a text field of exactly `cap` bytes: up to `cap - 1` payload
/// bytes, zero-padded. The final byte is always NUL.
fn put_text(out: &mut Vec<u8>, value: &str, cap: usize) {
    let bytes = value.as_bytes();
    let len = bytes.len().min(cap - 1);
    out.extend_from_slice(&bytes[..len]);
    out.resize(out.len() + (cap - len), 0);
}

/// Read a text field: payload stops at the first NUL. Byte-level
/// truncation can cut a multi-byte sequence, so decoding is lossy.
fn get_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn get_tag(buf: &[u8]) -> Result<u32, CodecError> {
    let bytes: [u8; 4] = buf
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(CodecError::Truncated {
            len: buf.len(),
            need: 4,
        })?;
    Ok(u32::from_le_bytes(bytes))
}

fn check_len(buf: &[u8], need: usize) -> Result<(), CodecError> {
    if buf.len() < need {
        return Err(CodecError::Truncated {
            len: buf.len(),
            need,
        });
    }
    Ok(())
}

/// Encode a request into one datagram payload
pub fn encode_request(request: &Request) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + CHANNEL_MAX + SAY_MAX);
    match request {
        Request::Login { username } => {
            out.extend_from_slice(&REQ_LOGIN.to_le_bytes());
            put_text(&mut out, username, USERNAME_MAX);
        }
        Request::Logout => out.extend_from_slice(&REQ_LOGOUT.to_le_bytes()),
        Request::Join { channel } => {
            out.extend_from_slice(&REQ_JOIN.to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
        }
        Request::Leave { channel } => {
            out.extend_from_slice(&REQ_LEAVE.to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
        }
        Request::Say { channel, text } => {
            out.extend_from_slice(&REQ_SAY.to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
            put_text(&mut out, text, SAY_MAX);
        }
        Request::List => out.extend_from_slice(&REQ_LIST.to_le_bytes()),
        Request::Who { channel } => {
            out.extend_from_slice(&REQ_WHO.to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
        }
    }
    out
}

/// Decode one request datagram
pub fn decode_request(buf: &[u8]) -> Result<Request, CodecError> {
    let tag = get_tag(buf)?;
    match tag {
        REQ_LOGIN => {
            check_len(buf, 4 + USERNAME_MAX)?;
            Ok(Request::Login {
                username: get_text(&buf[4..4 + USERNAME_MAX]),
            })
        }
        REQ_LOGOUT => Ok(Request::Logout),
        REQ_JOIN => {
            check_len(buf, 4 + CHANNEL_MAX)?;
            Ok(Request::Join {
                channel: get_text(&buf[4..4 + CHANNEL_MAX]),
            })
        }
        REQ_LEAVE => {
            check_len(buf, 4 + CHANNEL_MAX)?;
            Ok(Request::Leave {
                channel: get_text(&buf[4..4 + CHANNEL_MAX]),
            })
        }
        REQ_SAY => {
            check_len(buf, 4 + CHANNEL_MAX + SAY_MAX)?;
            Ok(Request::Say {
                channel: get_text(&buf[4..4 + CHANNEL_MAX]),
                text: get_text(&buf[4 + CHANNEL_MAX..4 + CHANNEL_MAX + SAY_MAX]),
            })
        }
        REQ_LIST => Ok(Request::List),
        REQ_WHO => {
            check_len(buf, 4 + CHANNEL_MAX)?;
            Ok(Request::Who {
                channel: get_text(&buf[4..4 + CHANNEL_MAX]),
            })
        }
        other => Err(CodecError::UnknownTag(other)),
    }
}

/// Encode a reply into one datagram payload
pub fn encode_reply(reply: &Reply) -> Vec<u8> {
    match reply {
        Reply::Say {
            channel,
            username,
            text,
        } => {
            let mut out = Vec::with_capacity(4 + CHANNEL_MAX + USERNAME_MAX + SAY_MAX);
            out.extend_from_slice(&TXT_SAY.to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
            put_text(&mut out, username, USERNAME_MAX);
            put_text(&mut out, text, SAY_MAX);
            out
        }
        Reply::ChannelList { channels } => {
            let mut out = Vec::with_capacity(8 + channels.len() * CHANNEL_MAX);
            out.extend_from_slice(&TXT_LIST.to_le_bytes());
            out.extend_from_slice(&(channels.len() as u32).to_le_bytes());
            for channel in channels {
                put_text(&mut out, channel, CHANNEL_MAX);
            }
            out
        }
        Reply::UserList { channel, users } => {
            let mut out = Vec::with_capacity(8 + CHANNEL_MAX + users.len() * USERNAME_MAX);
            out.extend_from_slice(&TXT_WHO.to_le_bytes());
            out.extend_from_slice(&(users.len() as u32).to_le_bytes());
            put_text(&mut out, channel, CHANNEL_MAX);
            for user in users {
                put_text(&mut out, user, USERNAME_MAX);
            }
            out
        }
        Reply::Error { message } => {
            let mut out = Vec::with_capacity(4 + SAY_MAX);
            out.extend_from_slice(&TXT_ERROR.to_le_bytes());
            put_text(&mut out, message, SAY_MAX);
            out
        }
    }
}

/// Decode one reply datagram
///
/// The entry count in list replies is validated against the actual
/// datagram size; a count that does not fit rejects the whole record.
pub fn decode_reply(buf: &[u8]) -> Result<Reply, CodecError> {
    let tag = get_tag(buf)?;
    match tag {
        TXT_SAY => {
            check_len(buf, 4 + CHANNEL_MAX + USERNAME_MAX + SAY_MAX)?;
            let channel = get_text(&buf[4..4 + CHANNEL_MAX]);
            let username = get_text(&buf[4 + CHANNEL_MAX..4 + CHANNEL_MAX + USERNAME_MAX]);
            let text =
                get_text(&buf[4 + CHANNEL_MAX + USERNAME_MAX..4 + CHANNEL_MAX + USERNAME_MAX + SAY_MAX]);
            Ok(Reply::Say {
                channel,
                username,
                text,
            })
        }
        TXT_LIST => {
            check_len(buf, 8)?;
            let count = u32::from_le_bytes(buf[4..8].try_into().unwrap_or_default());
            let need = (count as usize)
                .checked_mul(CHANNEL_MAX)
                .and_then(|n| n.checked_add(8))
                .ok_or(CodecError::CountMismatch {
                    count,
                    len: buf.len(),
                })?;
            if buf.len() < need {
                return Err(CodecError::CountMismatch {
                    count,
                    len: buf.len(),
                });
            }
            let channels = (0..count as usize)
                .map(|i| get_text(&buf[8 + i * CHANNEL_MAX..8 + (i + 1) * CHANNEL_MAX]))
                .collect();
            Ok(Reply::ChannelList { channels })
        }
        TXT_WHO => {
            check_len(buf, 8 + CHANNEL_MAX)?;
            let count = u32::from_le_bytes(buf[4..8].try_into().unwrap_or_default());
            let base = 8 + CHANNEL_MAX;
            let need = (count as usize)
                .checked_mul(USERNAME_MAX)
                .and_then(|n| n.checked_add(base))
                .ok_or(CodecError::CountMismatch {
                    count,
                    len: buf.len(),
                })?;
            if buf.len() < need {
                return Err(CodecError::CountMismatch {
                    count,
                    len: buf.len(),
                });
            }
            let channel = get_text(&buf[8..base]);
            let users = (0..count as usize)
                .map(|i| get_text(&buf[base + i * USERNAME_MAX..base + (i + 1) * USERNAME_MAX]))
                .collect();
            Ok(Reply::UserList { channel, users })
        }
        TXT_ERROR => {
            check_len(buf, 4 + SAY_MAX)?;
            Ok(Reply::Error {
                message: get_text(&buf[4..4 + SAY_MAX]),
            })
        }
        other => Err(CodecError::UnknownTag(other)),
    }
}

//! Terminal output - reply rendering and prompt redraw
//!
//! The terminal is in raw mode, so every line break is an explicit CRLF
//! and asynchronous server output must clear the interactive line before
//! printing, then let the caller redraw the prompt and any partially
//! typed input.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveToColumn,
    execute,
    terminal::{Clear, ClearType},
};

use crate::client::app::LineEditor;
use crate::protocol::Reply;

pub const PROMPT: &str = "> ";

fn clear_line(out: &mut impl Write) -> io::Result<()> {
    execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))
}

/// Print one server reply over the interactive line
pub fn render_reply(reply: &Reply) -> io::Result<()> {
    let mut out = io::stdout();
    clear_line(&mut out)?;
    match reply {
        Reply::Say {
            channel,
            username,
            text,
        } => write!(out, "[{}][{}]: {}\r\n", channel, username, text)?,
        Reply::ChannelList { channels } => {
            write!(out, "Existing channels:\r\n")?;
            for channel in channels {
                write!(out, "  {}\r\n", channel)?;
            }
        }
        Reply::UserList { channel, users } => {
            write!(out, "Users on channel {}:\r\n", channel)?;
            for user in users {
                write!(out, "  {}\r\n", user)?;
            }
        }
        Reply::Error { message } => write!(out, "Error: {}\r\n", message)?,
    }
    out.flush()
}

/// Print a client-local notice on its own line
pub fn print_notice(text: &str) -> io::Result<()> {
    let mut out = io::stdout();
    clear_line(&mut out)?;
    write!(out, "{}\r\n", text)?;
    out.flush()
}

/// Redraw the prompt and the not-yet-submitted input line
pub fn redraw_prompt(editor: &LineEditor) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{}{}", PROMPT, editor.content())?;
    out.flush()
}

/// Echo one accepted character
pub fn echo_char(c: char) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{}", c)?;
    out.flush()
}

/// Visually erase the last echoed character
pub fn erase_char() -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "\u{8} \u{8}")?;
    out.flush()
}

/// Finish the interactive line after Enter
pub fn newline() -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "\r\n")?;
    out.flush()
}

//! Client - the interactive prompt and its multiplexed I/O loop

mod app;
mod commands;
mod renderer;

pub use app::{App, LineEditor, SUBSCRIPTION_SLOTS};
pub use commands::{apply_line, LineAction};

use anyhow::{anyhow, Context, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures_util::StreamExt;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::{interval, Duration};

use crate::config::Config;
use crate::protocol::{self, Request};

/// Largest reply datagram the server can produce still fits a UDP payload
const RECV_BUFFER: usize = 65536;

/// Restores the terminal on every exit path, including errors
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw terminal mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Resolve the server, log in, join the default channel, and run the
/// interactive loop until `/exit`
pub async fn run(host: &str, port: u16, username: &str, config: &Config) -> Result<()> {
    let server = lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve {}:{}", host, port))?
        .next()
        .ok_or_else(|| anyhow!("no address found for {}:{}", host, port))?;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("failed to create a socket")?;
    socket
        .connect(server)
        .await
        .with_context(|| format!("failed to set server address {}", server))?;

    // No reply is awaited; login and the default join are fire-and-forget.
    send(&socket, &Request::Login {
        username: username.to_string(),
    })
    .await?;
    send(&socket, &Request::Join {
        channel: config.general.default_channel.clone(),
    })
    .await?;

    let mut state = App::new(&config.general.default_channel);

    let _guard = RawModeGuard::enable()?;
    event_loop(&socket, &mut state, config).await
}

/// The single-threaded multiplexed loop: network, keyboard, and a bounded
/// tick. `biased` polls the arms top-down, so when both sources are ready
/// in one iteration the network datagram is drained and rendered before
/// keyboard input is processed.
async fn event_loop(socket: &UdpSocket, state: &mut App, config: &Config) -> Result<()> {
    let mut events = EventStream::new();
    let mut buf = vec![0u8; RECV_BUFFER];
    let mut tick = interval(Duration::from_secs(config.general.tick_secs));

    renderer::redraw_prompt(&state.editor)?;

    loop {
        tokio::select! {
            biased;

            received = socket.recv(&mut buf) => {
                let len = received.context("failed to receive from server")?;
                match protocol::decode_reply(&buf[..len]) {
                    Ok(reply) => {
                        renderer::render_reply(&reply)?;
                        renderer::redraw_prompt(&state.editor)?;
                    }
                    Err(e) => tracing::trace!("ignoring datagram: {}", e),
                }
            }

            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) => {
                        if let Flow::Exit = handle_key(socket, state, key).await? {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("keyboard input failed"),
                    None => break,
                }
            }

            _ = tick.tick() => {}
        }
    }

    Ok(())
}

/// Consume one keyboard input unit. Printable characters accumulate in
/// the line editor; backspace erases; Enter completes the line and hands
/// it to the command interpreter. Everything else is ignored.
async fn handle_key(socket: &UdpSocket, state: &mut App, key: KeyEvent) -> Result<Flow> {
    if key.kind == KeyEventKind::Release {
        return Ok(Flow::Continue);
    }

    match key.code {
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                && !c.is_control() =>
        {
            if state.editor.insert(c) {
                renderer::echo_char(c)?;
            }
        }

        KeyCode::Backspace => {
            if state.editor.backspace() {
                renderer::erase_char()?;
            }
        }

        KeyCode::Enter => {
            renderer::newline()?;
            let line = state.editor.take();
            let action = commands::apply_line(&line, state);
            for notice in &action.notices {
                renderer::print_notice(notice)?;
            }
            for request in &action.requests {
                send(socket, request).await?;
            }
            if action.exit {
                return Ok(Flow::Exit);
            }
            renderer::redraw_prompt(&state.editor)?;
        }

        _ => {}
    }

    Ok(Flow::Continue)
}

async fn send(socket: &UdpSocket, request: &Request) -> Result<()> {
    socket
        .send(&protocol::encode_request(request))
        .await
        .context("failed to send request")?;
    Ok(())
}

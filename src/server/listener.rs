//! UDP socket loop - bind, receive, dispatch, transmit
//!
//! Runs on a current-thread runtime: one datagram is fully processed
//! (decode, dispatch, send replies) before the next is received.

use anyhow::{Context, Result};
use tokio::net::UdpSocket;
use tokio::time::{interval, Duration};

use crate::config::Config;
use crate::protocol::{self, Request};
use crate::server::dispatcher::Dispatcher;

/// Largest request record is the say request; anything longer is trailing
/// garbage the codec ignores.
const RECV_BUFFER: usize = 1024;

/// Run the server until the process is terminated
pub async fn run(host: &str, port: u16, config: &Config) -> Result<()> {
    let socket = UdpSocket::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    let local = socket.local_addr().context("failed to read bound address")?;
    tracing::info!("server listening on {}", local);

    let mut dispatcher = Dispatcher::new(
        &config.general.default_channel,
        config.server.max_sessions,
    );

    let mut buf = [0u8; RECV_BUFFER];
    let mut tick = interval(Duration::from_secs(config.general.tick_secs));

    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                match received {
                    Ok((len, from)) => {
                        handle_datagram(&socket, &mut dispatcher, &buf[..len], from).await;
                    }
                    Err(e) => {
                        tracing::warn!("failed to receive datagram: {}", e);
                    }
                }
            }

            _ = tick.tick() => {
                tracing::debug!(
                    sessions = dispatcher.registry().len(),
                    channels = dispatcher.directory().len(),
                    "liveness tick"
                );
            }
        }
    }
}

/// Decode one datagram and transmit whatever the dispatcher produced.
/// Malformed datagrams are dropped without a reply; send failures are
/// logged and never retried.
async fn handle_datagram(
    socket: &UdpSocket,
    dispatcher: &mut Dispatcher,
    datagram: &[u8],
    from: std::net::SocketAddr,
) {
    let request: Request = match protocol::decode_request(datagram) {
        Ok(request) => request,
        Err(e) => {
            tracing::trace!("ignoring datagram from {}: {}", from, e);
            return;
        }
    };

    for outbound in dispatcher.dispatch(request, from) {
        let bytes = protocol::encode_reply(&outbound.reply);
        if let Err(e) = socket.send_to(&bytes, outbound.dest).await {
            tracing::warn!("failed to send reply to {}: {}", outbound.dest, e);
        }
    }
}

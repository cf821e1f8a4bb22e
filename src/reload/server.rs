//! WebSocket Server for Live Reload
//!
//! Binds the listener and hands raw client streams to the WsActor, which
//! performs the handshake and registers them with the notification channel.

use std::net::{SocketAddr, TcpListener};

use anyhow::{Result, anyhow};

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Path prefix agents connect to.
pub const WS_PATH: &str = "/crxReloader";

/// Start the acceptor thread. Returns the address actually bound.
///
/// The thread exits once the WsActor is gone.
pub fn start_ws_server_with_channel(
    host: &str,
    base_port: u16,
    ws_tx: tokio::sync::mpsc::Sender<WsMsg>,
) -> Result<SocketAddr> {
    let (listener, addr) = try_bind_port(host, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    crate::debug!("reload"; "client connected: {}", peer);

                    // Handshake runs in blocking mode
                    let _ = stream.set_nonblocking(false);

                    if ws_tx.blocking_send(WsMsg::AddClient(stream, peer)).is_err() {
                        crate::debug!("reload"; "ws actor gone, stopping acceptor");
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok(addr)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(host: &str, base_port: u16, max_retries: u16) -> Result<(TcpListener, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((host, port)) {
            Ok(listener) => {
                let addr = listener.local_addr()?;
                if offset > 0 {
                    crate::log!("serve"; "port {} in use, using {}", base_port, port);
                }
                return Ok((listener, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind websocket server on {}:{} after {} attempts: {}",
        host,
        base_port,
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_retries_on_busy_port() {
        let (first, addr) = try_bind_port("127.0.0.1", 0, 1).unwrap();
        let (_second, next) = try_bind_port("127.0.0.1", addr.port(), 10).unwrap();
        assert_ne!(addr.port(), next.port());
        drop(first);
    }

    #[test]
    fn test_bind_reports_failure() {
        let (_held, addr) = try_bind_port("127.0.0.1", 0, 1).unwrap();
        let err = try_bind_port("127.0.0.1", addr.port(), 1).unwrap_err();
        assert!(err.to_string().contains("failed to bind"));
    }
}

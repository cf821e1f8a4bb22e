use std::io::ErrorKind;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use tungstenite::WebSocket;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message;

use crate::reload::channel::{ClientSink, SinkError, SinkStatus};
use crate::reload::server::WS_PATH;

/// Upper bound for a client to finish the handshake.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Frames drained per poll, so a chatty client cannot starve the others.
const MAX_READS_PER_POLL: usize = 16;

/// Perform the server handshake on `WS_PATH`.
///
/// Keeps blocking mode during the handshake and switches to non-blocking
/// after, so later reads and writes never stall the caller.
pub(super) fn handshake(stream: TcpStream, peer: SocketAddr) -> Option<WsSink> {
    let _ = stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT));

    let check_path = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        if req.uri().path().starts_with(WS_PATH) {
            Ok(resp)
        } else {
            crate::debug!("ws"; "rejecting {} for path {}", peer, req.uri().path());
            let mut err = ErrorResponse::new(Some("not found".to_string()));
            *err.status_mut() = StatusCode::NOT_FOUND;
            Err(err)
        }
    };

    match tungstenite::accept_hdr(stream, check_path) {
        Ok(ws) => {
            if let Err(e) = ws.get_ref().set_nonblocking(true) {
                crate::log!("ws"; "failed to configure {}: {}", peer, e);
                return None;
            }
            Some(WsSink { ws })
        }
        Err(e) => {
            crate::debug!("ws"; "handshake failed for {}: {}", peer, e);
            None
        }
    }
}

/// Non-blocking WebSocket client.
pub struct WsSink {
    ws: WebSocket<TcpStream>,
}

fn is_would_block(err: &tungstenite::Error) -> bool {
    matches!(err, tungstenite::Error::Io(e) if e.kind() == ErrorKind::WouldBlock)
}

impl ClientSink for WsSink {
    fn send_text(&mut self, text: &str) -> Result<(), SinkError> {
        match self.ws.send(Message::Text(text.into())) {
            Ok(()) => Ok(()),
            // queued in the write buffer, flushed on the next poll
            Err(ref e) if is_would_block(e) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Err(SinkError::Closed)
            }
            Err(e) => Err(SinkError::Io(e.to_string())),
        }
    }

    fn poll(&mut self) -> SinkStatus {
        for _ in 0..MAX_READS_PER_POLL {
            match self.ws.read() {
                Ok(Message::Close(_)) => return SinkStatus::Closed,
                // agents never send anything meaningful
                Ok(_) => {}
                Err(ref e) if is_would_block(e) => break,
                Err(_) => return SinkStatus::Closed,
            }
        }

        match self.ws.flush() {
            Ok(()) => SinkStatus::Open,
            Err(ref e) if is_would_block(e) => SinkStatus::Open,
            Err(_) => SinkStatus::Closed,
        }
    }

    fn close(&mut self) {
        let _ = self.ws.close(None);
        let _ = self.ws.flush();
    }
}

//! Connection to the reload server.

use std::net::TcpStream;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

pub type ServerSocket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Connect to `url` (`ws://host:port/crxReloader`).
pub fn connect(url: &str) -> Result<ServerSocket> {
    let (socket, _) =
        tungstenite::connect(url).with_context(|| format!("failed to connect to {url}"))?;
    Ok(socket)
}

/// Read text frames on a background thread.
///
/// Frames are forwarded as-is; [`HostAgent::on_text`](super::HostAgent::on_text)
/// decides what they mean. The sender is dropped when the connection ends,
/// which closes the returned receiver.
pub fn spawn_listener(mut socket: ServerSocket) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        loop {
            match socket.read() {
                Ok(Message::Text(text)) => {
                    if tx.send(text.as_str().to_string()).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    crate::debug!("agent"; "connection error: {}", e);
                    break;
                }
            }
        }
        crate::debug!("agent"; "listener stopped");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[tokio::test]
    async fn test_listener_forwards_text_frames() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut ws = tungstenite::accept(stream).unwrap();
            ws.send(Message::Binary(vec![1, 2, 3].into())).unwrap();
            for text in ["garbage", r#"{"eventName":"reload","data":"manifest"}"#] {
                ws.send(Message::Text(text.into())).unwrap();
            }
            ws.close(None).unwrap();
            let _ = ws.flush();
        });

        let socket = connect(&format!("ws://{addr}/crxReloader")).unwrap();
        let mut rx = spawn_listener(socket);

        assert_eq!(rx.recv().await.as_deref(), Some("garbage"));
        assert_eq!(
            rx.recv().await.as_deref(),
            Some(r#"{"eventName":"reload","data":"manifest"}"#)
        );
        assert_eq!(rx.recv().await, None);
        server.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = connect(&format!("ws://{addr}/crxReloader")).unwrap_err();
        assert!(err.to_string().contains("failed to connect"));
    }
}

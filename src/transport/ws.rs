//! WebSocket transport.
//!
//! Thin wrapper around `tokio-tungstenite` mapping binary WebSocket
//! messages to protocol frames. All other message kinds are handled here
//! so the connection layer only ever sees frames:
//!
//! - Ping/Pong are absorbed (tungstenite answers pings on flush),
//! - Text messages are skipped with a warning (the protocol is binary),
//! - Close ends the stream.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::{Sink, Stream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::error::{Result, SwarmpollError};

/// Concrete WebSocket stream type.
type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connect to a `ws://` URL and return the transport once the handshake
/// completes.
pub async fn connect(url: &str) -> Result<WsTransport> {
    let (inner, _response) = connect_async(url)
        .await
        .map_err(|e| SwarmpollError::Transport(e.to_string()))?;
    tracing::debug!(url, "websocket transport ready");
    Ok(WsTransport { inner })
}

/// A connected WebSocket session carrying one protocol frame per binary
/// message.
#[derive(Debug)]
pub struct WsTransport {
    inner: WsStream,
}

impl Stream for WsTransport {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(Message::Binary(data))) => {
                    return Poll::Ready(Some(Ok(Bytes::from(data))))
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Ok(Message::Text(_))) => {
                    tracing::warn!("skipping text message on binary protocol session");
                    continue;
                }
                Some(Ok(Message::Close(_))) | None => return Poll::Ready(None),
                // Raw frames only appear when reading was configured for
                // them, which we never do.
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(SwarmpollError::Transport(e.to_string()))))
                }
            }
        }
    }
}

impl Sink<Bytes> for WsTransport {
    type Error = SwarmpollError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_ready(cx)
            .map_err(|e| SwarmpollError::Transport(e.to_string()))
    }

    fn start_send(self: Pin<&mut Self>, item: Bytes) -> Result<()> {
        Pin::new(&mut self.get_mut().inner)
            .start_send(Message::Binary(Vec::from(item)))
            .map_err(|e| SwarmpollError::Transport(e.to_string()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_flush(cx)
            .map_err(|e| SwarmpollError::Transport(e.to_string()))
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_close(cx)
            .map_err(|e| SwarmpollError::Transport(e.to_string()))
    }
}

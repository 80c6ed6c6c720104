//! In-memory paired transport.
//!
//! [`pair`] returns two linked transports; frames sent on one side arrive
//! on the other, whole and in order, mirroring what a WebSocket session
//! provides. Dropping either side closes the link. The far end doubles as
//! a scripted server in tests.
//!
//! # Example
//!
//! ```
//! use futures_util::{SinkExt, StreamExt};
//! use swarmpoll::transport::mem;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (mut a, mut b) = mem::pair();
//! a.send(bytes::Bytes::from_static(b"ping")).await.unwrap();
//! let frame = b.next().await.unwrap().unwrap();
//! assert_eq!(&frame[..], b"ping");
//! # }
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::{Sink, Stream};
use tokio::sync::mpsc;

use crate::error::SwarmpollError;

/// One side of an in-memory transport link.
#[derive(Debug)]
pub struct MemTransport {
    tx: mpsc::UnboundedSender<Bytes>,
    rx: mpsc::UnboundedReceiver<Bytes>,
}

/// Create a linked pair of in-memory transports.
pub fn pair() -> (MemTransport, MemTransport) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        MemTransport { tx: a_tx, rx: a_rx },
        MemTransport { tx: b_tx, rx: b_rx },
    )
}

impl Stream for MemTransport {
    type Item = Result<Bytes, SwarmpollError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx).map(|opt| opt.map(Ok))
    }
}

impl Sink<Bytes> for MemTransport {
    type Error = SwarmpollError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.tx.is_closed() {
            Poll::Ready(Err(SwarmpollError::ConnectionClosed))
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn start_send(self: Pin<&mut Self>, item: Bytes) -> Result<(), Self::Error> {
        self.get_mut()
            .tx
            .send(item)
            .map_err(|_| SwarmpollError::ConnectionClosed)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};

    #[tokio::test]
    async fn test_frames_cross_in_both_directions() {
        let (mut a, mut b) = pair();

        a.send(Bytes::from_static(b"to-b")).await.unwrap();
        b.send(Bytes::from_static(b"to-a")).await.unwrap();

        assert_eq!(&b.next().await.unwrap().unwrap()[..], b"to-b");
        assert_eq!(&a.next().await.unwrap().unwrap()[..], b"to-a");
    }

    #[tokio::test]
    async fn test_frames_keep_order() {
        let (mut a, mut b) = pair();
        for i in 0u8..5 {
            a.send(Bytes::from(vec![i])).await.unwrap();
        }
        for i in 0u8..5 {
            assert_eq!(b.next().await.unwrap().unwrap()[0], i);
        }
    }

    #[tokio::test]
    async fn test_drop_closes_the_link() {
        let (a, mut b) = pair();
        drop(a);

        assert!(b.next().await.is_none());
        assert!(matches!(
            b.send(Bytes::from_static(b"x")).await,
            Err(SwarmpollError::ConnectionClosed)
        ));
    }
}

//! Connection handle and driver loop.
//!
//! The [`Connection`] is a cheap-clone handle over a command channel; a
//! spawned driver task is the single owner of the transport, the
//! pending-transaction table, the wrapping transaction-id counter and the
//! `last_frame` cursor. Single ownership is what makes the table safe
//! without locks: every mutation happens on the driver task.
//!
//! Lifecycle is `Connecting → Open → Closed`: [`Connection::connect`]
//! covers the Connecting phase and resolves once the transport handshake
//! completes; the driver exiting (peer close, transport error, explicit
//! [`Connection::close`]) is Closed, from which there is no way back —
//! reconnecting means building a new `Connection`.
//!
//! # Example
//!
//! ```ignore
//! use swarmpoll::{Connection, FieldMask, PollOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = Connection::connect("ws://127.0.0.1:8080/bt/control").await?;
//!     match conn.poll(FieldMask::DEFAULT).await? {
//!         PollOutcome::Update(update) => {
//!             for (hash, status) in &update.torrents {
//!                 println!("{hash}: {:?}", status.name());
//!             }
//!         }
//!         PollOutcome::Unavailable => eprintln!("session is gone"),
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, SwarmpollError};
use crate::protocol::{
    decode_poll_response, encode_poll_request, FrameHeader, FUNCTION_GET_UPDATES,
};
use crate::status::{FieldMask, PollUpdate};
use crate::transport::Transport;

/// Command channel depth; polls queue here while the driver is busy.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Result of one poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// The server answered with an update batch (possibly empty).
    Update(PollUpdate),
    /// The connection was not open, or closed before the answer arrived.
    ///
    /// An expected degraded result, not an error: after a transport
    /// failure every later poll resolves this way.
    Unavailable,
}

enum Command {
    Poll {
        mask: FieldMask,
        reply: oneshot::Sender<Result<PollUpdate>>,
    },
    Close,
}

/// Handle to one transport session.
///
/// Clones share the same session. All handles going away closes it.
#[derive(Clone)]
pub struct Connection {
    cmd_tx: mpsc::Sender<Command>,
}

impl Connection {
    /// Connect over WebSocket and drive the session on a spawned task.
    ///
    /// Resolves once the transport is ready; a failure before that point
    /// surfaces here and no `Connection` is built.
    pub async fn connect(url: &str) -> Result<Self> {
        let transport = crate::transport::ws::connect(url).await?;
        Ok(Self::with_transport(transport))
    }

    /// Build a connection over an already-open transport.
    ///
    /// Useful with [`transport::mem`](crate::transport::mem) in tests, or
    /// any custom message-framed transport.
    pub fn with_transport<T: Transport>(transport: T) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            Driver::new(transport, cmd_rx).run().await;
        });
        Self { cmd_tx }
    }

    /// Poll the server for status changes since the last observed frame.
    ///
    /// Allocates the next transaction id, sends one request carrying the
    /// session's current frame cursor, and resolves when the matching
    /// response is routed back — responses match by transaction id, not
    /// arrival order, so concurrent polls resolve independently.
    ///
    /// Returns [`PollOutcome::Unavailable`] when the session is not open;
    /// that path still resolves through an await point, never within the
    /// synchronous part of the call. Wire-format violations and nonzero
    /// server error codes surface as errors to this caller only; the
    /// session itself stays up.
    pub async fn poll(&self, mask: FieldMask) -> Result<PollOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let cmd = Command::Poll {
            mask,
            reply: reply_tx,
        };
        if self.cmd_tx.send(cmd).await.is_err() {
            return Ok(PollOutcome::Unavailable);
        }
        match reply_rx.await {
            Ok(Ok(update)) => Ok(PollOutcome::Update(update)),
            Ok(Err(e)) => Err(e),
            // Driver dropped the reply sender: closed before answering.
            Err(_) => Ok(PollOutcome::Unavailable),
        }
    }

    /// Close the session. Polls still in flight resolve as
    /// [`PollOutcome::Unavailable`].
    pub async fn close(&self) {
        let _ = self.cmd_tx.send(Command::Close).await;
    }

    /// Whether the driver has exited.
    pub fn is_closed(&self) -> bool {
        self.cmd_tx.is_closed()
    }
}

/// Single owner of the session state, running on its own task.
struct Driver<T> {
    transport: T,
    cmd_rx: mpsc::Receiver<Command>,
    /// Outstanding transactions. Removal is the one authoritative
    /// "already answered" guard: a given id's caller is woken at most
    /// once, ever.
    pending: HashMap<u16, oneshot::Sender<Result<PollUpdate>>>,
    /// Wrapping id counter (0..=65535).
    next_tid: u16,
    /// Most recent frame number observed from the server, echoed on the
    /// next request so it only sends the delta.
    last_frame: u32,
}

impl<T: Transport> Driver<T> {
    fn new(transport: T, cmd_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            transport,
            cmd_rx,
            pending: HashMap::new(),
            next_tid: 0,
            last_frame: 0,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Poll { mask, reply }) => {
                        if let Err(e) = self.send_poll(mask, reply).await {
                            tracing::warn!(error = %e, "transport send failed, closing session");
                            break;
                        }
                    }
                    Some(Command::Close) | None => {
                        tracing::debug!("session closed locally");
                        break;
                    }
                },
                frame = self.transport.next() => match frame {
                    Some(Ok(frame)) => self.route_frame(&frame),
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "transport failed, closing session");
                        break;
                    }
                    None => {
                        tracing::debug!("transport closed by peer");
                        break;
                    }
                },
            }
        }
        // Dropping `pending` drops every reply sender; callers still
        // waiting observe Unavailable.
    }

    /// Register a transaction and put its request on the wire.
    async fn send_poll(
        &mut self,
        mask: FieldMask,
        reply: oneshot::Sender<Result<PollUpdate>>,
    ) -> Result<()> {
        let tid = self.next_tid;
        self.next_tid = self.next_tid.wrapping_add(1);

        let request = encode_poll_request(tid, self.last_frame, mask.bits());

        // If the id wrapped all the way around onto a still-pending
        // transaction, the displaced caller resolves as Unavailable.
        if self.pending.insert(tid, reply).is_some() {
            tracing::warn!(tid, "transaction id wrapped onto a pending call");
        }

        tracing::trace!(tid, last_frame = self.last_frame, mask = mask.bits(), "poll sent");
        self.transport.send(Bytes::copy_from_slice(&request)).await
    }

    /// Route one inbound frame.
    fn route_frame(&mut self, frame: &[u8]) {
        let header = match FrameHeader::decode(frame) {
            Ok(h) => h,
            Err(e) => {
                // Fatal for this message only; the session keeps going.
                tracing::warn!(error = %e, "dropping undecodable frame");
                return;
            }
        };

        match header {
            FrameHeader::Call {
                function_id,
                transaction_id,
            } => {
                // Reserved server→client direction; nothing registered
                // for it, and it must never be taken for a response.
                tracing::debug!(function_id, transaction_id, "ignoring inbound call frame");
            }
            FrameHeader::Response {
                function_id,
                transaction_id,
                error_code,
            } => {
                let Some(reply) = self.pending.remove(&transaction_id) else {
                    // Expected: already answered, or a stale id from
                    // before the counter wrapped. Not a fault.
                    tracing::debug!(transaction_id, "response with no pending transaction");
                    return;
                };

                let result = if error_code != 0 {
                    // Routed to the caller uninterpreted.
                    Err(SwarmpollError::Application(error_code))
                } else if function_id != FUNCTION_GET_UPDATES {
                    Err(SwarmpollError::MalformedFrame(format!(
                        "response for unknown function id {}",
                        function_id
                    )))
                } else {
                    match decode_poll_response(&frame[header.payload_offset()..]) {
                        Ok(update) => {
                            self.last_frame = update.frame;
                            Ok(update)
                        }
                        Err(e) => Err(e),
                    }
                };

                // The caller may have given up; that is fine.
                let _ = reply.send(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mem;

    #[tokio::test]
    async fn test_poll_after_close_is_unavailable() {
        let (client_side, server_side) = mem::pair();
        let conn = Connection::with_transport(client_side);

        conn.close().await;
        // Let the driver task observe the command and exit.
        while !conn.is_closed() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            conn.poll(FieldMask::DEFAULT).await,
            Ok(PollOutcome::Unavailable)
        ));
        drop(server_side);
    }

    #[tokio::test]
    async fn test_peer_drop_resolves_inflight_poll_unavailable() {
        let (client_side, server_side) = mem::pair();
        let conn = Connection::with_transport(client_side);

        let pending = tokio::spawn({
            let conn = conn.clone();
            async move { conn.poll(FieldMask::DEFAULT).await }
        });

        drop(server_side);

        assert!(matches!(
            pending.await.unwrap(),
            Ok(PollOutcome::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_clone_shares_the_session() {
        let (client_side, server_side) = mem::pair();
        let conn = Connection::with_transport(client_side);
        let other = conn.clone();

        conn.close().await;
        while !conn.is_closed() {
            tokio::task::yield_now().await;
        }

        assert!(other.is_closed());
        drop(server_side);
    }
}

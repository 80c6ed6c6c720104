//! Message-oriented transport layer.
//!
//! The protocol assumes ordered, reliable, message-framed delivery: one
//! stream item is exactly one protocol frame, never a fragment. [`ws`]
//! provides the real WebSocket transport; [`mem`] provides a linked
//! in-memory pair for tests and embedding.

use bytes::Bytes;
use futures_util::{Sink, Stream};

use crate::error::{Result, SwarmpollError};

pub mod mem;
pub mod ws;

pub use mem::MemTransport;
pub use ws::WsTransport;

/// A message-framed transport carrying whole protocol frames.
///
/// Blanket-implemented for anything that is a `Stream` of inbound frames
/// and a `Sink` of outbound frames. End-of-stream means the session is
/// closed; a stream error means it failed.
pub trait Transport:
    Stream<Item = Result<Bytes>> + Sink<Bytes, Error = SwarmpollError> + Unpin + Send + 'static
{
}

impl<T> Transport for T where
    T: Stream<Item = Result<Bytes>> + Sink<Bytes, Error = SwarmpollError> + Unpin + Send + 'static
{
}

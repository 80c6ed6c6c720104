//! # swarmpoll
//!
//! Client-side codec and transaction multiplexer for the libtorrent-webui
//! binary status-polling protocol.
//!
//! The crate does two things:
//!
//! - **Codec** ([`protocol`]): pure, stateless encode/decode — builds the
//!   fixed 15-byte poll request and walks the bitmask-selected,
//!   variable-shape response records into [`TorrentStatus`] values. No
//!   I/O, no shared state.
//! - **Connection** ([`Connection`]): owns one message-framed transport
//!   session, matches asynchronous responses to outstanding requests by
//!   16-bit transaction id, and maintains the `last_frame` cursor the
//!   server uses to send only deltas.
//!
//! ## Example
//!
//! ```ignore
//! use swarmpoll::{Connection, FieldMask, PollOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = Connection::connect("ws://127.0.0.1:8080/bt/control").await?;
//!     loop {
//!         match conn.poll(FieldMask::DEFAULT).await? {
//!             PollOutcome::Update(update) => {
//!                 for (hash, status) in &update.torrents {
//!                     println!("{hash} {:?} {:?}", status.name(), status.download_rate());
//!                 }
//!             }
//!             PollOutcome::Unavailable => break,
//!         }
//!         tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod transport;

mod connection;
mod status;

pub use connection::{Connection, PollOutcome};
pub use error::{Result, SwarmpollError};
pub use status::{FieldMask, FieldValue, InfoHash, PollUpdate, TorrentStatus};

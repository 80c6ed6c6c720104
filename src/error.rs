//! Error types for swarmpoll.

use thiserror::Error;

/// Main error type for all swarmpoll operations.
///
/// Everything reachable from transport data decodes into one of these;
/// malformed input is never allowed to panic.
#[derive(Debug, Error)]
pub enum SwarmpollError {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure (connect failed, session dropped mid-flight).
    #[error("transport failure: {0}")]
    Transport(String),

    /// Frame shorter than the minimum header size for its kind, or
    /// otherwise not interpretable as a protocol frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// A field decode would read past the end of the buffer.
    ///
    /// Fatal for the whole message: once one field's width is miscounted
    /// the record boundaries are unrecoverable.
    #[error("truncated record: needed {needed} bytes, {remaining} remaining")]
    TruncatedRecord {
        /// Bytes the current field needed.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A presence-mask bit with no defined field meaning.
    ///
    /// The field's width is unknown, so the rest of the message cannot
    /// be decoded either.
    #[error("unknown field bit {0} in presence mask")]
    UnknownField(u8),

    /// Nonzero error code in an otherwise well-formed response.
    ///
    /// Routed to the caller that issued the request; the dispatcher does
    /// not interpret the code.
    #[error("server returned error code {0}")]
    Application(u8),

    /// Connection closed while the operation was in progress.
    #[error("connection closed")]
    ConnectionClosed,
}

/// Result type alias using SwarmpollError.
pub type Result<T> = std::result::Result<T, SwarmpollError>;

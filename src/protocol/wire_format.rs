//! Wire format encoding and decoding.
//!
//! Implements the fixed 15-byte poll request:
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬──────────┐
//! │ Function │ Tid      │ Frame    │ Mask hi  │ Mask lo  │
//! │ 1 byte   │ 2 bytes  │ 4 bytes  │ 4 bytes  │ 4 bytes  │
//! │ 0x00     │ uint16 BE│ uint32 BE│ reserved │ uint32 BE│
//! └──────────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//! and the frame header shared by both directions: byte 0's high bit
//! distinguishes a response (set) from an inbound call (clear), the low 7
//! bits are the function id, bytes 1..3 the transaction id, and byte 3 —
//! present only on responses — the error code.
//!
//! All multi-byte integers are Big Endian.

use crate::error::{Result, SwarmpollError};

/// Function id for the status-polling call.
pub const FUNCTION_GET_UPDATES: u8 = 0;

/// High bit of byte 0: set on responses, clear on calls.
pub const RESPONSE_FLAG: u8 = 0x80;

/// Low 7 bits of byte 0: the function id.
pub const FUNCTION_ID_MASK: u8 = 0x7f;

/// Poll request size in bytes (fixed, exactly 15).
pub const POLL_REQUEST_SIZE: usize = 15;

/// Minimum header size for an inbound call frame.
pub const CALL_HEADER_SIZE: usize = 3;

/// Minimum header size for a response frame (call header + error code).
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Encode a poll request.
///
/// `last_frame` is the most recent frame number observed from the server
/// (zero on the first poll); the server answers with only the torrents
/// changed since. The high mask word is reserved and always written as
/// zero in the current field set.
///
/// # Example
///
/// ```
/// use swarmpoll::protocol::{encode_poll_request, POLL_REQUEST_SIZE};
///
/// let buf = encode_poll_request(42, 7, 0x0103);
/// assert_eq!(buf.len(), POLL_REQUEST_SIZE);
/// assert_eq!(buf[0], 0); // get-updates
/// ```
pub fn encode_poll_request(
    transaction_id: u16,
    last_frame: u32,
    field_mask: u64,
) -> [u8; POLL_REQUEST_SIZE] {
    let mut buf = [0u8; POLL_REQUEST_SIZE];
    buf[0] = FUNCTION_GET_UPDATES;
    buf[1..3].copy_from_slice(&transaction_id.to_be_bytes());
    buf[3..7].copy_from_slice(&last_frame.to_be_bytes());
    buf[7..11].copy_from_slice(&((field_mask >> 32) as u32).to_be_bytes());
    buf[11..15].copy_from_slice(&(field_mask as u32).to_be_bytes());
    buf
}

/// Decoded frame header, tagged by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHeader {
    /// Server-initiated call (high bit clear). Reserved direction, unused
    /// by the polling workflow.
    Call {
        /// Function id (0..=127).
        function_id: u8,
        /// Correlation token chosen by the caller.
        transaction_id: u16,
    },
    /// Response to an outstanding call (high bit set).
    Response {
        /// Function id of the call being answered.
        function_id: u8,
        /// Transaction id echoed from the request.
        transaction_id: u16,
        /// Application error code, 0 = success.
        error_code: u8,
    },
}

impl FrameHeader {
    /// Decode a frame header from the start of a message.
    ///
    /// Fails with [`SwarmpollError::MalformedFrame`] if the buffer is
    /// shorter than the minimum header size for its apparent kind.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < CALL_HEADER_SIZE {
            return Err(SwarmpollError::MalformedFrame(format!(
                "frame of {} bytes is shorter than the {}-byte call header",
                buf.len(),
                CALL_HEADER_SIZE
            )));
        }

        let function_id = buf[0] & FUNCTION_ID_MASK;
        let transaction_id = u16::from_be_bytes([buf[1], buf[2]]);

        if buf[0] & RESPONSE_FLAG == 0 {
            return Ok(FrameHeader::Call {
                function_id,
                transaction_id,
            });
        }

        if buf.len() < RESPONSE_HEADER_SIZE {
            return Err(SwarmpollError::MalformedFrame(format!(
                "response frame of {} bytes is shorter than the {}-byte response header",
                buf.len(),
                RESPONSE_HEADER_SIZE
            )));
        }

        Ok(FrameHeader::Response {
            function_id,
            transaction_id,
            error_code: buf[3],
        })
    }

    /// Offset of the payload following this header.
    #[inline]
    pub fn payload_offset(&self) -> usize {
        match self {
            FrameHeader::Call { .. } => CALL_HEADER_SIZE,
            FrameHeader::Response { .. } => RESPONSE_HEADER_SIZE,
        }
    }

    /// Function id regardless of direction.
    #[inline]
    pub fn function_id(&self) -> u8 {
        match *self {
            FrameHeader::Call { function_id, .. } => function_id,
            FrameHeader::Response { function_id, .. } => function_id,
        }
    }

    /// Transaction id regardless of direction.
    #[inline]
    pub fn transaction_id(&self) -> u16 {
        match *self {
            FrameHeader::Call { transaction_id, .. } => transaction_id,
            FrameHeader::Response { transaction_id, .. } => transaction_id,
        }
    }

    /// Whether this is a response frame.
    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, FrameHeader::Response { .. })
    }
}

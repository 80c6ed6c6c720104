//! Protocol layer: pure encode/decode with no I/O and no state.
//!
//! [`wire_format`] covers the fixed request layout and the frame header,
//! [`fields`] declares the bit → field table, [`reader`] is the decode
//! cursor, and [`response`] walks a poll-response payload into a
//! [`PollUpdate`](crate::PollUpdate). Safe to call from any number of
//! callers concurrently.

pub mod fields;
pub mod reader;
pub mod response;
pub mod wire_format;

pub use fields::{descriptor_for_bit, FieldDescriptor, FieldKind, FIELD_TABLE};
pub use reader::{combine_u64, PayloadReader};
pub use response::decode_poll_response;
pub use wire_format::{
    encode_poll_request, FrameHeader, CALL_HEADER_SIZE, FUNCTION_GET_UPDATES, FUNCTION_ID_MASK,
    POLL_REQUEST_SIZE, RESPONSE_FLAG, RESPONSE_HEADER_SIZE,
};

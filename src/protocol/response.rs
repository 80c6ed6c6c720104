//! Poll-response payload decoding.
//!
//! The payload (everything after the 4-byte response header) is:
//! ```text
//! new-frame(u32) | record-count(u32) | records…
//! ```
//! and each record:
//! ```text
//! info-hash(20) | mask-high(u32) | mask-low(u32) | fields…
//! ```
//! with fields appearing in ascending bit order of the low mask word, each
//! shaped per the [`fields`](super::fields) table. Records have no length
//! prefix: the cursor position after one record's last present field is
//! the next record's info-hash, which is why any width miscount is fatal
//! for the remainder of the message.

use crate::error::{Result, SwarmpollError};
use crate::status::{FieldValue, InfoHash, PollUpdate, TorrentStatus};

use super::fields::{descriptor_for_bit, FieldKind};
use super::reader::PayloadReader;

/// Decode a complete poll-response payload.
///
/// # Example
///
/// ```
/// use swarmpoll::protocol::decode_poll_response;
///
/// // frame 7, zero records
/// let payload = [0, 0, 0, 7, 0, 0, 0, 0];
/// let update = decode_poll_response(&payload).unwrap();
/// assert_eq!(update.frame, 7);
/// assert!(update.torrents.is_empty());
/// ```
pub fn decode_poll_response(payload: &[u8]) -> Result<PollUpdate> {
    let mut reader = PayloadReader::new(payload);

    let frame = reader.read_u32()?;
    let count = reader.read_u32()?;

    // The count is untrusted input; never preallocate from it directly.
    let mut torrents = Vec::with_capacity(count.min(1024) as usize);
    for _ in 0..count {
        let hash = InfoHash(reader.read_info_hash()?);
        let status = decode_record(&mut reader)?;
        torrents.push((hash, status));
    }

    Ok(PollUpdate { frame, torrents })
}

/// Decode one record body (everything after the info-hash).
fn decode_record(reader: &mut PayloadReader<'_>) -> Result<TorrentStatus> {
    // Reserved for fields 32..63; read and discarded.
    let mask_high = reader.read_u32()?;
    let mask_low = reader.read_u32()?;

    if mask_high != 0 {
        tracing::debug!(mask_high, "ignoring reserved high presence-mask word");
    }

    let mut status = TorrentStatus::new();
    for bit in 0..32u8 {
        if mask_low & (1u32 << bit) == 0 {
            continue;
        }
        let desc = descriptor_for_bit(bit).ok_or(SwarmpollError::UnknownField(bit))?;
        let value = match desc.kind {
            FieldKind::U32 => FieldValue::Gauge(reader.read_u32()?),
            FieldKind::U64 => FieldValue::Counter(reader.read_u64()?),
            FieldKind::U8 => FieldValue::State(reader.read_u8()?),
            FieldKind::Flags => {
                // High half of the 64-bit flags value, discarded.
                let _ = reader.read_u32()?;
                FieldValue::Gauge(reader.read_u32()?)
            }
            FieldKind::Str => FieldValue::Text(reader.read_string()?),
            FieldKind::ScaledPair => {
                let integer = reader.read_u32()?;
                let thousandths = reader.read_u32()?;
                FieldValue::Ratio(integer as f64 + thousandths as f64 / 1000.0)
            }
        };
        status.insert(desc.name, value);
    }

    Ok(status)
}

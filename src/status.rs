//! Decoded status data model.
//!
//! [`TorrentStatus`] is a mapping from field name to [`FieldValue`]; only
//! fields whose bit was set in the record's presence mask are populated.
//! [`InfoHash`] keys the per-torrent results and renders as 40 hex digits.
//!
//! # Example
//!
//! ```
//! use swarmpoll::{FieldMask, InfoHash};
//!
//! let mask = FieldMask::NAME | FieldMask::PROGRESS;
//! assert!(mask.contains(1)); // name is bit 1
//! assert!(!mask.contains(0));
//!
//! let hash = InfoHash([0xab; 20]);
//! assert_eq!(hash.to_string().len(), 40);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;

/// 20-byte torrent identifier.
///
/// Displays as 40 lowercase, zero-padded hexadecimal digits, which is also
/// the form used as a mapping key and for serde serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    /// Raw bytes of the hash.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl Serialize for InfoHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Field-presence bitset.
///
/// Selects which optional fields the server includes per record; the same
/// bits determine each record's total byte length on the wire. The high 32
/// bits are reserved and always sent as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMask(u64);

impl FieldMask {
    /// No fields.
    pub const EMPTY: FieldMask = FieldMask(0);

    /// Torrent flags word (low half of a 64-bit value).
    pub const FLAGS: FieldMask = FieldMask(1 << 0);
    /// Torrent name.
    pub const NAME: FieldMask = FieldMask(1 << 1);
    /// Total payload uploaded this session, bytes.
    pub const TOTAL_UPLOADED: FieldMask = FieldMask(1 << 2);
    /// Total payload downloaded this session, bytes.
    pub const TOTAL_DOWNLOADED: FieldMask = FieldMask(1 << 3);
    /// Time the torrent was added (seconds since epoch).
    pub const ADDED_TIME: FieldMask = FieldMask(1 << 4);
    /// Time the torrent finished (seconds since epoch).
    pub const COMPLETED_TIME: FieldMask = FieldMask(1 << 5);
    /// Upload rate, bytes/second.
    pub const UPLOAD_RATE: FieldMask = FieldMask(1 << 6);
    /// Download rate, bytes/second.
    pub const DOWNLOAD_RATE: FieldMask = FieldMask(1 << 7);
    /// Download progress.
    pub const PROGRESS: FieldMask = FieldMask(1 << 8);
    /// Error message, empty when healthy.
    pub const ERROR: FieldMask = FieldMask(1 << 9);
    /// Connected peer count.
    pub const CONNECTED_PEERS: FieldMask = FieldMask(1 << 10);
    /// Connected seed count.
    pub const CONNECTED_SEEDS: FieldMask = FieldMask(1 << 11);
    /// Number of downloaded pieces.
    pub const DOWNLOADED_PIECES: FieldMask = FieldMask(1 << 12);
    /// Bytes of the wanted payload completed.
    pub const TOTAL_DONE: FieldMask = FieldMask(1 << 13);
    /// Distributed copies (integer + thousandths on the wire).
    pub const DISTRIBUTED_COPIES: FieldMask = FieldMask(1 << 14);
    /// All-time uploaded bytes.
    pub const ALL_TIME_UPLOAD: FieldMask = FieldMask(1 << 15);
    /// All-time downloaded bytes.
    pub const ALL_TIME_DOWNLOAD: FieldMask = FieldMask(1 << 16);
    /// Peers we are currently unchoking.
    pub const UNCHOKED_PEERS: FieldMask = FieldMask(1 << 17);
    /// Total connection count.
    pub const NUM_CONNECTIONS: FieldMask = FieldMask(1 << 18);
    /// Queue position.
    pub const QUEUE_POSITION: FieldMask = FieldMask(1 << 19);
    /// Torrent state code (values opaque to the codec).
    pub const STATE: FieldMask = FieldMask(1 << 20);
    /// Bytes that failed hash check.
    pub const FAILED_BYTES: FieldMask = FieldMask(1 << 21);
    /// Redundant (wasted) bytes downloaded.
    pub const REDUNDANT_BYTES: FieldMask = FieldMask(1 << 22);

    /// Every defined field (bits 0..=22).
    pub const ALL: FieldMask = FieldMask((1 << 23) - 1);

    /// The field set a status display typically polls: flags, name, rates,
    /// progress, error, connected peers and state.
    pub const DEFAULT: FieldMask = FieldMask(
        (1 << 0) | (1 << 1) | (1 << 6) | (1 << 7) | (1 << 8) | (1 << 9) | (1 << 10) | (1 << 20),
    );

    /// Construct from a raw 64-bit mask.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        FieldMask(bits)
    }

    /// Raw 64-bit mask value.
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// Low 32 bits, carrying all currently defined fields.
    #[inline]
    pub const fn low_word(&self) -> u32 {
        self.0 as u32
    }

    /// High 32 bits, reserved (zero for every defined field).
    #[inline]
    pub const fn high_word(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Whether the field at `bit` is selected.
    #[inline]
    pub const fn contains(&self, bit: u8) -> bool {
        self.0 & (1u64 << bit) != 0
    }

    /// Whether no field is selected.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for FieldMask {
    fn default() -> Self {
        FieldMask::DEFAULT
    }
}

impl BitOr for FieldMask {
    type Output = FieldMask;

    fn bitor(self, rhs: FieldMask) -> FieldMask {
        FieldMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for FieldMask {
    fn bitor_assign(&mut self, rhs: FieldMask) {
        self.0 |= rhs.0;
    }
}

/// A single decoded field value.
///
/// The variant mirrors the field's wire shape, not its semantic unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// 8-byte counter (byte totals, timestamps).
    Counter(u64),
    /// 4-byte value (rates, peer counts, progress, flags low word).
    Gauge(u32),
    /// Single-byte enumerated state code.
    State(u8),
    /// Length-prefixed string (name, error).
    ///
    /// The wire format is one byte per character with no Unicode decoding;
    /// each byte maps losslessly to the char of the same code point.
    Text(String),
    /// Integer + thousandths pair (distributed-copies).
    Ratio(f64),
}

impl FieldValue {
    fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::Counter(v) => Some(v),
            _ => None,
        }
    }

    fn as_u32(&self) -> Option<u32> {
        match *self {
            FieldValue::Gauge(v) => Some(v),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Decoded per-torrent status: field name → value.
///
/// Only fields present in the record's mask are populated. Iteration order
/// is the field-name order of the underlying `BTreeMap`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TorrentStatus {
    fields: BTreeMap<&'static str, FieldValue>,
}

impl TorrentStatus {
    /// Create an empty status (no fields populated).
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &'static str, value: FieldValue) {
        self.fields.insert(name, value);
    }

    /// Look up a field by its wire name (e.g. `"total-done"`).
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is populated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate populated fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Torrent name, if polled.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(FieldValue::as_str)
    }

    /// Error message, if polled. Empty string means no error.
    pub fn error(&self) -> Option<&str> {
        self.get("error").and_then(FieldValue::as_str)
    }

    /// State code, if polled. Values are opaque to the codec.
    pub fn state(&self) -> Option<u8> {
        match self.get("state") {
            Some(&FieldValue::State(v)) => Some(v),
            _ => None,
        }
    }

    /// Download progress, if polled.
    pub fn progress(&self) -> Option<u32> {
        self.get("progress").and_then(FieldValue::as_u32)
    }

    /// Upload rate in bytes/second, if polled.
    pub fn upload_rate(&self) -> Option<u32> {
        self.get("upload-rate").and_then(FieldValue::as_u32)
    }

    /// Download rate in bytes/second, if polled.
    pub fn download_rate(&self) -> Option<u32> {
        self.get("download-rate").and_then(FieldValue::as_u32)
    }

    /// Completed payload bytes, if polled.
    pub fn total_done(&self) -> Option<u64> {
        self.get("total-done").and_then(FieldValue::as_u64)
    }

    /// Distributed copies, if polled.
    pub fn distributed_copies(&self) -> Option<f64> {
        match self.get("distributed-copies") {
            Some(&FieldValue::Ratio(v)) => Some(v),
            _ => None,
        }
    }
}

/// One decoded poll response: the server's new frame number plus the
/// torrents that changed since the frame echoed in the request.
#[derive(Debug, Clone, Default)]
pub struct PollUpdate {
    /// Server-side sequence number of this update batch.
    pub frame: u32,
    /// Changed torrents, in wire order.
    pub torrents: Vec<(InfoHash, TorrentStatus)>,
}

impl PollUpdate {
    /// Consume into a map keyed by the 40-digit hex rendering of each hash.
    pub fn into_map(self) -> BTreeMap<String, TorrentStatus> {
        self.torrents
            .into_iter()
            .map(|(hash, status)| (hash.to_string(), status))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_hash_display_zero_padded() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0x01;
        bytes[19] = 0xff;
        let hash = InfoHash(bytes);
        let hex = hash.to_string();
        assert_eq!(hex.len(), 40);
        assert!(hex.starts_with("01"));
        assert!(hex.ends_with("ff"));
        // Middle bytes render as "00", never collapse to "0"
        assert_eq!(&hex[2..4], "00");
    }

    #[test]
    fn test_info_hash_serializes_as_hex_string() {
        let hash = InfoHash([0xab; 20]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(20)));
    }

    #[test]
    fn test_field_mask_default_matches_status_display_set() {
        let expected = FieldMask::FLAGS
            | FieldMask::NAME
            | FieldMask::UPLOAD_RATE
            | FieldMask::DOWNLOAD_RATE
            | FieldMask::PROGRESS
            | FieldMask::ERROR
            | FieldMask::CONNECTED_PEERS
            | FieldMask::STATE;
        assert_eq!(FieldMask::DEFAULT, expected);
        assert_eq!(FieldMask::default(), expected);
    }

    #[test]
    fn test_field_mask_words() {
        let mask = FieldMask::ALL;
        assert_eq!(mask.low_word(), (1 << 23) - 1);
        assert_eq!(mask.high_word(), 0);
        assert!(mask.contains(0));
        assert!(mask.contains(22));
        assert!(!mask.contains(23));
    }

    #[test]
    fn test_field_mask_bitor() {
        let mut mask = FieldMask::EMPTY;
        assert!(mask.is_empty());
        mask |= FieldMask::STATE;
        assert!(mask.contains(20));
        assert_eq!((mask | FieldMask::NAME).bits(), (1 << 20) | (1 << 1));
    }

    #[test]
    fn test_status_accessors() {
        let mut status = TorrentStatus::new();
        status.insert("name", FieldValue::Text("ubuntu.iso".to_string()));
        status.insert("download-rate", FieldValue::Gauge(1024));
        status.insert("total-done", FieldValue::Counter(5_000_000_000));
        status.insert("state", FieldValue::State(4));
        status.insert("distributed-copies", FieldValue::Ratio(3.5));

        assert_eq!(status.name(), Some("ubuntu.iso"));
        assert_eq!(status.download_rate(), Some(1024));
        assert_eq!(status.total_done(), Some(5_000_000_000));
        assert_eq!(status.state(), Some(4));
        assert_eq!(status.distributed_copies(), Some(3.5));
        assert_eq!(status.error(), None);
        assert_eq!(status.len(), 5);
    }

    #[test]
    fn test_accessor_rejects_wrong_shape() {
        let mut status = TorrentStatus::new();
        // A Gauge under "name" must not surface through the str accessor.
        status.insert("name", FieldValue::Gauge(7));
        assert_eq!(status.name(), None);
        assert!(status.get("name").is_some());
    }

    #[test]
    fn test_poll_update_into_map_keys_are_hex() {
        let update = PollUpdate {
            frame: 9,
            torrents: vec![(InfoHash([0x0a; 20]), TorrentStatus::new())],
        };
        let map = update.into_map();
        assert!(map.contains_key(&"0a".repeat(20)));
    }

    #[test]
    fn test_status_serializes_as_flat_object() {
        let mut status = TorrentStatus::new();
        status.insert("name", FieldValue::Text("x".to_string()));
        status.insert("progress", FieldValue::Gauge(500));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["name"], "x");
        assert_eq!(json["progress"], 500);
    }
}

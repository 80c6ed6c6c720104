//! Declarative field table for the poll-response record format.
//!
//! Each record carries a 32-bit presence mask; for every set bit, the field
//! at that position appears on the wire in ascending bit order. This table
//! is the single source of truth for bit → (name, shape): the cursor walk
//! in [`response`](super::response) dispatches on [`FieldKind`] and never
//! hard-codes a field.

/// Wire shape of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 4-byte unsigned integer.
    U32,
    /// 8-byte unsigned integer as two 32-bit words, high then low.
    U64,
    /// Single-byte unsigned integer.
    U8,
    /// 64-bit flags value; the high word is read and discarded, the low
    /// word kept.
    Flags,
    /// 2-byte big-endian length followed by that many single-byte chars.
    Str,
    /// Two 4-byte words: integer part, then fractional part in thousandths.
    ScaledPair,
}

/// One row of the field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    /// Bit position in the low presence-mask word.
    pub bit: u8,
    /// Field name, used as the status map key.
    pub name: &'static str,
    /// Wire shape.
    pub kind: FieldKind,
}

/// All defined fields, in ascending bit order (bits 0..=22).
pub const FIELD_TABLE: [FieldDescriptor; 23] = [
    FieldDescriptor { bit: 0, name: "flags", kind: FieldKind::Flags },
    FieldDescriptor { bit: 1, name: "name", kind: FieldKind::Str },
    FieldDescriptor { bit: 2, name: "total-uploaded", kind: FieldKind::U64 },
    FieldDescriptor { bit: 3, name: "total-downloaded", kind: FieldKind::U64 },
    FieldDescriptor { bit: 4, name: "added-time", kind: FieldKind::U64 },
    FieldDescriptor { bit: 5, name: "completed-time", kind: FieldKind::U64 },
    FieldDescriptor { bit: 6, name: "upload-rate", kind: FieldKind::U32 },
    FieldDescriptor { bit: 7, name: "download-rate", kind: FieldKind::U32 },
    FieldDescriptor { bit: 8, name: "progress", kind: FieldKind::U32 },
    FieldDescriptor { bit: 9, name: "error", kind: FieldKind::Str },
    FieldDescriptor { bit: 10, name: "connected-peers", kind: FieldKind::U32 },
    FieldDescriptor { bit: 11, name: "connected-seeds", kind: FieldKind::U32 },
    FieldDescriptor { bit: 12, name: "downloaded-pieces", kind: FieldKind::U32 },
    FieldDescriptor { bit: 13, name: "total-done", kind: FieldKind::U64 },
    FieldDescriptor { bit: 14, name: "distributed-copies", kind: FieldKind::ScaledPair },
    FieldDescriptor { bit: 15, name: "all-time-upload", kind: FieldKind::U64 },
    FieldDescriptor { bit: 16, name: "all-time-download", kind: FieldKind::U64 },
    FieldDescriptor { bit: 17, name: "unchoked-peers", kind: FieldKind::U32 },
    FieldDescriptor { bit: 18, name: "num-connections", kind: FieldKind::U32 },
    FieldDescriptor { bit: 19, name: "queue-position", kind: FieldKind::U32 },
    FieldDescriptor { bit: 20, name: "state", kind: FieldKind::U8 },
    FieldDescriptor { bit: 21, name: "failed-bytes", kind: FieldKind::U64 },
    FieldDescriptor { bit: 22, name: "redundant-bytes", kind: FieldKind::U64 },
];

/// Look up the field defined at `bit`, if any.
///
/// The table is dense over bits 0..=22, so this is an index, not a scan.
#[inline]
pub fn descriptor_for_bit(bit: u8) -> Option<&'static FieldDescriptor> {
    FIELD_TABLE.get(bit as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_dense_and_ascending() {
        for (i, desc) in FIELD_TABLE.iter().enumerate() {
            assert_eq!(desc.bit as usize, i, "field {} out of place", desc.name);
        }
    }

    #[test]
    fn test_names_are_unique() {
        for a in 0..FIELD_TABLE.len() {
            for b in (a + 1)..FIELD_TABLE.len() {
                assert_ne!(FIELD_TABLE[a].name, FIELD_TABLE[b].name);
            }
        }
    }

    #[test]
    fn test_descriptor_for_bit() {
        assert_eq!(descriptor_for_bit(0).unwrap().name, "flags");
        assert_eq!(descriptor_for_bit(14).unwrap().kind, FieldKind::ScaledPair);
        assert_eq!(descriptor_for_bit(20).unwrap().kind, FieldKind::U8);
        assert_eq!(descriptor_for_bit(22).unwrap().name, "redundant-bytes");
        assert!(descriptor_for_bit(23).is_none());
        assert!(descriptor_for_bit(31).is_none());
    }

    #[test]
    fn test_known_field_shapes() {
        // Spot checks against the wire format.
        assert_eq!(descriptor_for_bit(1).unwrap().kind, FieldKind::Str);
        assert_eq!(descriptor_for_bit(9).unwrap().kind, FieldKind::Str);
        assert_eq!(descriptor_for_bit(2).unwrap().kind, FieldKind::U64);
        assert_eq!(descriptor_for_bit(19).unwrap().kind, FieldKind::U32);
    }
}

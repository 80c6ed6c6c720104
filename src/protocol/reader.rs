//! Cursor-driven decode context.
//!
//! [`PayloadReader`] carries the buffer and the cursor position through a
//! single decode invocation; nothing is shared between calls. There is no
//! record-length prefix anywhere in the format, so the cursor position
//! after a field is the only thing locating the next one — every primitive
//! here advances by exactly the bytes it consumed or fails without
//! advancing.

use crate::error::{Result, SwarmpollError};

/// Combine two 32-bit words into the 64-bit value `high * 2^32 + low`.
///
/// Exact integer arithmetic; byte counters routinely exceed what an f64
/// mantissa can hold.
#[inline]
pub fn combine_u64(high: u32, low: u32) -> u64 {
    ((high as u64) << 32) | low as u64
}

/// Sequential big-endian reader over a response payload.
#[derive(Debug)]
pub struct PayloadReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Create a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current cursor position.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Take the next `n` bytes, or fail without moving the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(SwarmpollError::TruncatedRecord {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a 2-byte big-endian unsigned integer.
    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a 4-byte big-endian unsigned integer.
    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read an 8-byte unsigned integer encoded as two 32-bit words,
    /// high word first.
    pub fn read_u64(&mut self) -> Result<u64> {
        let high = self.read_u32()?;
        let low = self.read_u32()?;
        Ok(combine_u64(high, low))
    }

    /// Read a length-prefixed string: 2-byte big-endian length `n`, then
    /// `n` bytes, one char per byte.
    ///
    /// This is a lossless byte-preserving mapping (each byte becomes the
    /// char of the same code point), not a text decode — names and errors
    /// may carry raw non-ASCII bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// Read a 20-byte info-hash.
    pub fn read_info_hash(&mut self) -> Result<[u8; 20]> {
        let bytes = self.read_bytes(20)?;
        let mut hash = [0u8; 20];
        hash.copy_from_slice(bytes);
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_u64_exact() {
        assert_eq!(combine_u64(0, 0), 0);
        assert_eq!(combine_u64(0x0000_0001, 0x0000_0000), 4_294_967_296);
        assert_eq!(combine_u64(0xFFFF_FFFF, 0xFFFF_FFFF), u64::MAX);
        assert_eq!(combine_u64(0, 0xFFFF_FFFF), 4_294_967_295);
    }

    #[test]
    fn test_read_primitives_advance_exactly() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = PayloadReader::new(&buf);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.position(), 1);
        assert_eq!(reader.read_u16().unwrap(), 0x0203);
        assert_eq!(reader.position(), 3);
        assert_eq!(reader.read_u32().unwrap(), 0x0405_0607);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_u64_two_words() {
        let buf = [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.read_u64().unwrap(), 4_294_967_296);
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_read_string_empty() {
        let buf = [0x00, 0x00, 0xAA];
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), "");
        // Length prefix consumed, nothing else.
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_read_string_five_chars() {
        let mut buf = vec![0x00, 0x05];
        buf.extend_from_slice(b"hello");
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), "hello");
        assert_eq!(reader.position(), 7);
    }

    #[test]
    fn test_read_string_non_ascii_byte_preserving() {
        // 0xE9 is 'é' in Latin-1; must map to U+00E9, not be rejected.
        let buf = [0x00, 0x02, 0xE9, 0x7A];
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.read_string().unwrap(), "\u{e9}z");
    }

    #[test]
    fn test_truncated_read_reports_sizes() {
        let buf = [0x01, 0x02];
        let mut reader = PayloadReader::new(&buf);
        match reader.read_u32() {
            Err(SwarmpollError::TruncatedRecord { needed, remaining }) => {
                assert_eq!(needed, 4);
                assert_eq!(remaining, 2);
            }
            other => panic!("expected TruncatedRecord, got {:?}", other),
        }
        // Failed read must not move the cursor.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_truncated_string_body() {
        // Claims 10 bytes, provides 3.
        let buf = [0x00, 0x0A, 0x61, 0x62, 0x63];
        let mut reader = PayloadReader::new(&buf);
        assert!(matches!(
            reader.read_string(),
            Err(SwarmpollError::TruncatedRecord { needed: 10, remaining: 3 })
        ));
    }

    #[test]
    fn test_read_info_hash() {
        let mut buf = Vec::new();
        buf.extend((0u8..20).collect::<Vec<_>>());
        let mut reader = PayloadReader::new(&buf);
        let hash = reader.read_info_hash().unwrap();
        assert_eq!(hash[0], 0);
        assert_eq!(hash[19], 19);
        assert_eq!(reader.position(), 20);
    }
}

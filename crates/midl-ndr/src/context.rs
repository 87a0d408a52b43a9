//! NDR encoding/decoding context
//!
//! [`NdrContext`] carries the negotiated data representation (byte order) and
//! the primitive put/get helpers. [`NdrCursor`] carries the per-message state:
//! the byte offset used for alignment, the referent IDs handed out while
//! encoding and the referent table consulted while decoding.

use crate::error::{NdrError, Result};
use crate::pointers::ReferentTable;
use bytes::{Buf, BufMut};

/// Data representation negotiated for the connection
///
/// MS-RPC peers always send little-endian NDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NdrContext {
    pub little_endian: bool,
}

impl NdrContext {
    /// Little-endian, the MS-RPC representation
    pub fn new() -> Self {
        Self { little_endian: true }
    }

    pub fn big_endian() -> Self {
        Self { little_endian: false }
    }

    pub fn with_byte_order(little_endian: bool) -> Self {
        Self { little_endian }
    }

    /// Zero bytes to insert at `position` to reach a multiple of `alignment`
    #[inline]
    pub fn align_padding(position: usize, alignment: usize) -> usize {
        match alignment {
            0 | 1 => 0,
            _ => (alignment - position % alignment) % alignment,
        }
    }

    #[inline]
    pub fn put_u8<B: BufMut>(&self, buf: &mut B, value: u8) {
        buf.put_u8(value);
    }

    #[inline]
    pub fn put_i8<B: BufMut>(&self, buf: &mut B, value: i8) {
        buf.put_i8(value);
    }

    // Callers check `remaining()` before any get.

    #[inline]
    pub fn get_u8<B: Buf>(&self, buf: &mut B) -> u8 {
        buf.get_u8()
    }

    #[inline]
    pub fn get_i8<B: Buf>(&self, buf: &mut B) -> i8 {
        buf.get_i8()
    }
}

/// Byte-order aware put/get pairs for the multi-byte integers
macro_rules! ordered_accessors {
    ($($ty:ty => $put:ident($put_le:ident, $put_be:ident), $get:ident($get_le:ident, $get_be:ident);)*) => {
        impl NdrContext {
            $(
                #[inline]
                pub fn $put<B: BufMut>(&self, buf: &mut B, value: $ty) {
                    if self.little_endian {
                        buf.$put_le(value)
                    } else {
                        buf.$put_be(value)
                    }
                }

                #[inline]
                pub fn $get<B: Buf>(&self, buf: &mut B) -> $ty {
                    if self.little_endian {
                        buf.$get_le()
                    } else {
                        buf.$get_be()
                    }
                }
            )*
        }
    };
}

ordered_accessors! {
    u16 => put_u16(put_u16_le, put_u16), get_u16(get_u16_le, get_u16);
    i16 => put_i16(put_i16_le, put_i16), get_i16(get_i16_le, get_i16);
    u32 => put_u32(put_u32_le, put_u32), get_u32(get_u32_le, get_u32);
    i32 => put_i32(put_i32_le, put_i32), get_i32(get_i32_le, get_i32);
    u64 => put_u64(put_u64_le, put_u64), get_u64(get_u64_le, get_u64);
    i64 => put_i64(put_i64_le, put_i64), get_i64(get_i64_le, get_i64);
}

impl Default for NdrContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-message marshalling state
///
/// A cursor is created for one message encode or decode and dropped with it.
/// Positions are measured from the start of the stub data, which is what NDR
/// alignment is relative to.
#[derive(Debug)]
pub struct NdrCursor {
    position: usize,
    next_referent: u32,
    referents: ReferentTable,
}

impl NdrCursor {
    /// First referent ID handed out when encoding embedded pointers
    pub const FIRST_REFERENT_ID: u32 = 0x0002_0000;

    /// Step between consecutive referent IDs
    pub const REFERENT_ID_STEP: u32 = 4;

    pub fn new() -> Self {
        Self {
            position: 0,
            next_referent: Self::FIRST_REFERENT_ID,
            referents: ReferentTable::default(),
        }
    }

    /// Current byte offset from the start of the stub
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Record that `count` bytes were written or consumed
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position += count;
    }

    /// Allocate the referent ID for the next non-null pointer being encoded
    pub fn next_referent_id(&mut self) -> u32 {
        let id = self.next_referent;
        self.next_referent = self.next_referent.wrapping_add(Self::REFERENT_ID_STEP);
        id
    }

    pub fn referents(&self) -> &ReferentTable {
        &self.referents
    }

    pub fn referents_mut(&mut self) -> &mut ReferentTable {
        &mut self.referents
    }

    /// Write zero padding up to the given boundary
    pub fn write_align<B: BufMut>(&mut self, buf: &mut B, alignment: usize) {
        let padding = NdrContext::align_padding(self.position, alignment);
        buf.put_bytes(0, padding);
        self.position += padding;
    }

    /// Skip padding up to the given boundary and make sure `needed` more
    /// bytes are available after it
    pub fn read_align<B: Buf>(&mut self, buf: &mut B, alignment: usize, needed: usize) -> Result<()> {
        let padding = NdrContext::align_padding(self.position, alignment);
        let total = padding.checked_add(needed).ok_or(NdrError::IntegerOverflow)?;
        ensure_remaining(buf, total)?;
        buf.advance(padding);
        self.position += padding;
        Ok(())
    }
}

impl Default for NdrCursor {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail with [`NdrError::BufferUnderflow`] unless `needed` bytes remain
#[inline]
pub fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(NdrError::BufferUnderflow {
            needed,
            have: buf.remaining(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_alignment_padding() {
        assert_eq!(NdrContext::align_padding(0, 4), 0);
        assert_eq!(NdrContext::align_padding(1, 4), 3);
        assert_eq!(NdrContext::align_padding(2, 4), 2);
        assert_eq!(NdrContext::align_padding(3, 4), 1);
        assert_eq!(NdrContext::align_padding(4, 4), 0);
        assert_eq!(NdrContext::align_padding(5, 8), 3);
        assert_eq!(NdrContext::align_padding(0, 1), 0);
        assert_eq!(NdrContext::align_padding(5, 1), 0);
    }

    #[test]
    fn test_primitive_roundtrip_le() {
        let ctx = NdrContext::new();
        let mut buf = BytesMut::new();

        ctx.put_u16(&mut buf, 0x1234);
        ctx.put_i32(&mut buf, -42);
        ctx.put_u64(&mut buf, 0xDEADBEEF12345678);

        assert_eq!(&buf[..2], &[0x34, 0x12]);

        let mut reader = buf.freeze();
        assert_eq!(ctx.get_u16(&mut reader), 0x1234);
        assert_eq!(ctx.get_i32(&mut reader), -42);
        assert_eq!(ctx.get_u64(&mut reader), 0xDEADBEEF12345678);
    }

    #[test]
    fn test_primitive_roundtrip_be() {
        let ctx = NdrContext::big_endian();
        let mut buf = BytesMut::new();

        ctx.put_u32(&mut buf, 0x12345678);
        assert_eq!(&buf[..], &[0x12, 0x34, 0x56, 0x78]);

        let mut reader = buf.freeze();
        assert_eq!(ctx.get_u32(&mut reader), 0x12345678);
    }

    #[test]
    fn test_referent_ids_step_by_four() {
        let mut cursor = NdrCursor::new();
        assert_eq!(cursor.next_referent_id(), 0x0002_0000);
        assert_eq!(cursor.next_referent_id(), 0x0002_0004);
        assert_eq!(cursor.next_referent_id(), 0x0002_0008);
    }

    #[test]
    fn test_write_align_pads_with_zeros() {
        let mut cursor = NdrCursor::new();
        let mut buf = BytesMut::new();
        buf.put_u8(0xff);
        cursor.advance(1);

        cursor.write_align(&mut buf, 4);
        assert_eq!(&buf[..], &[0xff, 0, 0, 0]);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_read_align_underflow() {
        let mut cursor = NdrCursor::new();
        cursor.advance(1);
        let mut reader: &[u8] = &[0, 0, 0, 1, 2];

        // Three padding bytes leave two, not four
        let err = cursor.read_align(&mut reader, 4, 4).unwrap_err();
        assert!(matches!(err, NdrError::BufferUnderflow { needed: 7, have: 5 }));
        // Nothing consumed on failure
        assert_eq!(reader.len(), 5);
        assert_eq!(cursor.position(), 1);
    }
}

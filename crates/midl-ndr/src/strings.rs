//! Counted Unicode strings
//!
//! `RPC_UNICODE_STRING` is the string type used throughout the MS-RPC
//! security interfaces. Unlike `[string] wchar_t*` it carries explicit byte
//! lengths and no terminator.
//!
//! Wire format:
//! ```text
//! inline:   Length: u16          # bytes in use, excluding any terminator
//!           MaximumLength: u16   # bytes allocated
//!           Buffer: u32          # referent ID (0 = null)
//! deferred: max_count: u32       # MaximumLength / 2
//!           offset: u32          # 0
//!           actual_count: u32    # Length / 2
//!           chars[actual_count]  # UTF-16LE
//! ```

use crate::{ConformantVaryingArray, NdrContext, NdrCursor, NdrDecode, NdrEncode, NdrError, Result};
use bytes::{Buf, BufMut};
use std::fmt;
use std::hash::{Hash, Hasher};

/// `RPC_UNICODE_STRING`
///
/// Equality and hashing look at the text only.
#[derive(Debug, Clone, Default)]
pub struct UnicodeString {
    value: String,
    /// `MaximumLength` received from the peer, kept so the string encodes
    /// back the way it arrived
    maximum_length: Option<u16>,
    /// `Length` field of a decoded header whose buffer is still to be read
    pending: Option<u16>,
}

impl UnicodeString {
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            value: s.into(),
            maximum_length: None,
            pending: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    /// `Length` as it goes on the wire, in bytes
    pub fn byte_len(&self) -> Result<u16> {
        let units = self.value.encode_utf16().count();
        units
            .checked_mul(2)
            .and_then(|bytes| u16::try_from(bytes).ok())
            .ok_or_else(|| NdrError::InvalidString(format!("{units} UTF-16 units do not fit a counted string")))
    }

    /// `MaximumLength` as it goes on the wire, never below `Length`
    pub fn maximum_byte_len(&self) -> Result<u16> {
        let length = self.byte_len()?;
        Ok(self.maximum_length.map_or(length, |max| max.max(length)))
    }
}

impl PartialEq for UnicodeString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for UnicodeString {}

impl Hash for UnicodeString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl From<String> for UnicodeString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for UnicodeString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for UnicodeString {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for UnicodeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl NdrEncode for UnicodeString {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        let length = self.byte_len()?;
        let maximum_length = self.maximum_byte_len()?;

        cursor.write_align(buf, 4);
        ctx.put_u16(buf, length);
        ctx.put_u16(buf, maximum_length);
        ctx.put_u32(buf, cursor.next_referent_id());
        cursor.advance(8);
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        let units: Vec<u16> = self.value.encode_utf16().collect();
        let max_count = usize::from(self.maximum_byte_len()? / 2);
        ConformantVaryingArray::with_max(max_count, units).ndr_encode(buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl NdrDecode for UnicodeString {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        cursor.read_align(buf, 4, 8)?;
        let length = ctx.get_u16(buf);
        // MaximumLength only sizes the peer's allocation; the text is
        // rebuilt from Length.
        let maximum_length = ctx.get_u16(buf);
        let referent = ctx.get_u32(buf);
        cursor.advance(8);

        if length % 2 != 0 {
            return Err(NdrError::InvalidString(format!("odd byte length {length}")));
        }

        if referent == 0 {
            if length != 0 {
                return Err(NdrError::InvalidString(format!(
                    "null buffer with length {length}"
                )));
            }
            return Ok(Self::default());
        }
        if !cursor.referents_mut().claim(referent) {
            return Err(NdrError::InvalidPointer(referent));
        }

        Ok(Self {
            value: String::new(),
            maximum_length: (maximum_length > length).then_some(maximum_length),
            pending: Some(length),
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        let Some(length) = self.pending.take() else {
            return Ok(());
        };

        let chars = ConformantVaryingArray::<u16>::ndr_decode(buf, ctx, cursor)?;
        if chars.offset != 0 {
            return Err(NdrError::InvalidString("non-zero offset".to_string()));
        }
        let expected = usize::from(length / 2);
        if chars.len() != expected {
            return Err(NdrError::ArraySizeMismatch {
                expected,
                got: chars.len(),
            });
        }

        self.value = char::decode_utf16(chars.elements).collect::<std::result::Result<String, _>>()?;
        Ok(())
    }

    fn ndr_align() -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn encode(s: &UnicodeString) -> BytesMut {
        let ctx = NdrContext::new();
        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        s.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();
        buf
    }

    fn decode(bytes: &[u8]) -> Result<UnicodeString> {
        let ctx = NdrContext::new();
        let mut reader = bytes;
        let mut cursor = NdrCursor::new();
        UnicodeString::ndr_decode_complete(&mut reader, &ctx, &mut cursor)
    }

    #[test]
    fn test_wire_layout() {
        let buf = encode(&UnicodeString::new("Ab"));
        assert_eq!(
            &buf[..],
            &[
                4, 0, 4, 0, // Length, MaximumLength
                0x00, 0x00, 0x02, 0x00, // Buffer referent
                2, 0, 0, 0, // max_count
                0, 0, 0, 0, // offset
                2, 0, 0, 0, // actual_count
                b'A', 0, b'b', 0,
            ]
        );
    }

    #[test]
    fn test_unicode_roundtrip() {
        let s = UnicodeString::new("Hello\u{00e9} \u{1f600}");
        let buf = encode(&s);
        assert_eq!(decode(&buf).unwrap(), s);
    }

    #[test]
    fn test_empty_string() {
        let s = UnicodeString::new("");
        let buf = encode(&s);
        // Header plus an empty conformant varying array
        assert_eq!(buf.len(), 8 + 12);
        assert_eq!(decode(&buf).unwrap().as_str(), "");
    }

    #[test]
    fn test_null_buffer_decodes_empty() {
        let decoded = decode(&[0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(decoded.as_str(), "");
    }

    #[test]
    fn test_excess_maximum_length_preserved() {
        // Length 2, MaximumLength 8, one char transmitted of four allocated
        let bytes = [
            2, 0, 8, 0, 0x00, 0x00, 0x02, 0x00, // header
            4, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, // max 4, offset 0, actual 1
            b'x', 0,
        ];
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.as_str(), "x");
        assert_eq!(decoded, UnicodeString::new("x"));

        // Encodes back exactly as received
        assert_eq!(&encode(&decoded)[..], &bytes[..]);
    }

    #[test]
    fn test_actual_count_must_match_length() {
        // Length says two chars, buffer carries one
        let bytes = [
            4, 0, 4, 0, 0x00, 0x00, 0x02, 0x00, //
            2, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, //
            b'x', 0,
        ];
        assert!(matches!(
            decode(&bytes).unwrap_err(),
            NdrError::ArraySizeMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn test_truncated_buffer() {
        let bytes = [
            4, 0, 4, 0, 0x00, 0x00, 0x02, 0x00, //
            2, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, //
            b'x', 0,
        ];
        assert!(matches!(decode(&bytes).unwrap_err(), NdrError::BufferUnderflow { .. }));
    }

    #[test]
    fn test_odd_length_rejected() {
        let bytes = [3, 0, 4, 0, 0x00, 0x00, 0x02, 0x00];
        assert!(matches!(decode(&bytes).unwrap_err(), NdrError::InvalidString(_)));
    }

    #[test]
    fn test_unpaired_surrogate_rejected() {
        let bytes = [
            2, 0, 2, 0, 0x00, 0x00, 0x02, 0x00, //
            1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, //
            0x00, 0xd8,
        ];
        assert!(matches!(decode(&bytes).unwrap_err(), NdrError::Utf16Error(_)));
    }
}

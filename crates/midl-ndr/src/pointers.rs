//! NDR pointer types
//!
//! Embedded pointers are transmitted as a 4-byte referent ID in the inline
//! part of the enclosing structure; the pointee follows in the deferred part.
//! A referent ID of zero is a null pointer and has no deferred data.
//!
//! - Unique (`[unique]`): nullable, no aliasing. A referent ID that repeats
//!   within one message is rejected.
//! - Full (`[ptr]`): nullable, aliasing allowed. A repeated referent ID
//!   resolves to the value already materialized for it; no second payload is
//!   read.

use crate::{NdrContext, NdrCursor, NdrDecode, NdrEncode, NdrError, Result};
use bytes::{Buf, BufMut};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Decode-time table of referent IDs seen in the current message
///
/// Each entry records that the ID was claimed by a pointer and, once its
/// pointee has been read, the materialized value for later aliases.
#[derive(Default)]
pub struct ReferentTable {
    entries: HashMap<u32, Option<Box<dyn Any + Send>>>,
}

impl ReferentTable {
    /// Record `id` as seen. Returns false if it was already present.
    pub fn claim(&mut self, id: u32) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, None);
        true
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Store the value decoded for `id`
    pub fn materialize<T: Clone + Send + 'static>(&mut self, id: u32, value: &T) {
        self.entries.insert(id, Some(Box::new(value.clone())));
    }

    /// Fetch a copy of the value decoded for `id`, if it has been read and
    /// has type `T`
    pub fn resolve<T: Clone + 'static>(&self, id: u32) -> Option<T> {
        self.entries
            .get(&id)?
            .as_deref()?
            .downcast_ref::<T>()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ReferentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<_> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        f.debug_struct("ReferentTable").field("ids", &ids).finish()
    }
}

fn encode_referent<B: BufMut>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor, non_null: bool) {
    cursor.write_align(buf, 4);
    let id = if non_null { cursor.next_referent_id() } else { 0 };
    ctx.put_u32(buf, id);
    cursor.advance(4);
}

fn decode_referent<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<u32> {
    cursor.read_align(buf, 4, 4)?;
    let id = ctx.get_u32(buf);
    cursor.advance(4);
    Ok(id)
}

/// Unique pointer - nullable, no aliasing
///
/// The `[unique]` attribute in MIDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquePtr<T> {
    value: Option<Box<T>>,
    pending: Option<u32>,
}

impl<T> UniquePtr<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
            pending: None,
        }
    }

    pub fn null() -> Self {
        Self {
            value: None,
            pending: None,
        }
    }

    pub fn from_option(opt: Option<T>) -> Self {
        opt.map_or_else(Self::null, Self::new)
    }

    pub fn into_option(self) -> Option<T> {
        self.value.map(|b| *b)
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none() && self.pending.is_none()
    }
}

impl<T> Default for UniquePtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> From<Option<T>> for UniquePtr<T> {
    fn from(opt: Option<T>) -> Self {
        Self::from_option(opt)
    }
}

impl<T: NdrEncode> NdrEncode for UniquePtr<T> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_referent(buf, ctx, cursor, self.value.is_some());
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        match &self.value {
            Some(value) => value.ndr_encode_complete(buf, ctx, cursor),
            None => Ok(()),
        }
    }

    fn ndr_align() -> usize {
        4 // For referent ID
    }
}

impl<T: NdrDecode> NdrDecode for UniquePtr<T> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let id = decode_referent(buf, ctx, cursor)?;
        if id == 0 {
            return Ok(Self::null());
        }
        if !cursor.referents_mut().claim(id) {
            return Err(NdrError::InvalidPointer(id));
        }
        Ok(Self {
            value: None,
            pending: Some(id),
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        if self.pending.take().is_some() {
            let value = T::ndr_decode_complete(buf, ctx, cursor)?;
            self.value = Some(Box::new(value));
        }
        Ok(())
    }

    fn ndr_align() -> usize {
        4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FullPending {
    /// First occurrence; the payload follows in the deferred part
    Fresh(u32),
    /// Repeat of an ID claimed earlier in the message
    Alias(u32),
}

/// Full pointer - nullable, aliasing allowed
///
/// The `[ptr]` attribute in MIDL. Encoding always emits a fresh referent,
/// decoding honours aliases through the cursor's [`ReferentTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullPtr<T> {
    value: Option<Box<T>>,
    pending: Option<FullPending>,
}

impl<T> FullPtr<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
            pending: None,
        }
    }

    pub fn null() -> Self {
        Self {
            value: None,
            pending: None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.value.map(|b| *b)
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.value.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none() && self.pending.is_none()
    }
}

impl<T> Default for FullPtr<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: NdrEncode> NdrEncode for FullPtr<T> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_referent(buf, ctx, cursor, self.value.is_some());
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        match &self.value {
            Some(value) => value.ndr_encode_complete(buf, ctx, cursor),
            None => Ok(()),
        }
    }

    fn ndr_align() -> usize {
        4
    }
}

impl<T: NdrDecode + Clone + Send + 'static> NdrDecode for FullPtr<T> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let id = decode_referent(buf, ctx, cursor)?;
        if id == 0 {
            return Ok(Self::null());
        }

        if let Some(value) = cursor.referents().resolve::<T>(id) {
            return Ok(Self::new(value));
        }

        let pending = if cursor.referents_mut().claim(id) {
            FullPending::Fresh(id)
        } else {
            FullPending::Alias(id)
        };
        Ok(Self {
            value: None,
            pending: Some(pending),
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        match self.pending.take() {
            None => {}
            Some(FullPending::Fresh(id)) => {
                let value = T::ndr_decode_complete(buf, ctx, cursor)?;
                cursor.referents_mut().materialize(id, &value);
                self.value = Some(Box::new(value));
            }
            Some(FullPending::Alias(id)) => {
                let value = cursor
                    .referents()
                    .resolve::<T>(id)
                    .ok_or(NdrError::InvalidPointer(id))?;
                self.value = Some(Box::new(value));
            }
        }
        Ok(())
    }

    fn ndr_align() -> usize {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConformantArray;
    use bytes::BytesMut;

    #[test]
    fn test_unique_ptr_non_null() {
        let ctx = NdrContext::new();
        let ptr = UniquePtr::new(0xDEADBEEFu32);

        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        ptr.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();

        // Referent ID + data
        assert_eq!(&buf[..], &[0x00, 0x00, 0x02, 0x00, 0xef, 0xbe, 0xad, 0xde]);

        let mut reader = buf.freeze();
        let mut cursor = NdrCursor::new();
        let decoded: UniquePtr<u32> = UniquePtr::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap();

        assert!(!decoded.is_null());
        assert_eq!(decoded.as_ref(), Some(&0xDEADBEEF));
    }

    #[test]
    fn test_unique_ptr_null() {
        let ctx = NdrContext::new();
        let ptr: UniquePtr<u32> = UniquePtr::null();

        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        ptr.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();

        // Just referent ID = 0
        assert_eq!(&buf[..], &[0, 0, 0, 0]);

        let mut reader = buf.freeze();
        let mut cursor = NdrCursor::new();
        let decoded: UniquePtr<u32> = UniquePtr::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap();

        assert!(decoded.is_null());
    }

    #[test]
    fn test_array_of_pointers_defers_pointees() {
        let ctx = NdrContext::new();
        let arr = ConformantArray::new(vec![UniquePtr::new(7u32), UniquePtr::null(), UniquePtr::new(9u32)]);

        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        arr.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();

        let words: Vec<u32> = buf
            .chunks(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(words, vec![3, 0x0002_0000, 0, 0x0002_0004, 7, 9]);

        let mut reader = buf.freeze();
        let mut cursor = NdrCursor::new();
        let decoded: ConformantArray<UniquePtr<u32>> =
            ConformantArray::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap();
        assert_eq!(decoded, arr);
        assert_eq!(cursor.referents().len(), 2);
    }

    #[test]
    fn test_missing_deferred_payload() {
        let ctx = NdrContext::new();
        // Non-null referent, no pointee
        let mut reader: &[u8] = &[0x00, 0x00, 0x02, 0x00];
        let mut cursor = NdrCursor::new();

        let err = UniquePtr::<u32>::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap_err();
        assert!(matches!(err, NdrError::BufferUnderflow { .. }));
    }

    #[test]
    fn test_unique_ptr_repeated_referent_is_rejected() {
        let ctx = NdrContext::new();
        let mut reader: &[u8] = &[
            2, 0, 0, 0, // max_count
            0x00, 0x00, 0x02, 0x00, // referent
            0x00, 0x00, 0x02, 0x00, // same referent again
            1, 0, 0, 0,
        ];
        let mut cursor = NdrCursor::new();

        let err = ConformantArray::<UniquePtr<u32>>::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap_err();
        assert!(matches!(err, NdrError::InvalidPointer(0x0002_0000)));
    }

    #[test]
    fn test_full_ptr_alias_reuses_payload() {
        let ctx = NdrContext::new();
        let mut reader: &[u8] = &[
            2, 0, 0, 0, // max_count
            0x00, 0x00, 0x02, 0x00, // referent
            0x00, 0x00, 0x02, 0x00, // alias of the same referent
            0x2a, 0, 0, 0, // single payload
        ];
        let mut cursor = NdrCursor::new();

        let decoded = ConformantArray::<FullPtr<u32>>::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap();
        let values: Vec<_> = decoded.elements.iter().map(|p| p.as_ref().copied()).collect();
        assert_eq!(values, vec![Some(42), Some(42)]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_full_ptr_roundtrip() {
        let ctx = NdrContext::new();
        let ptr = FullPtr::new(12345i64);

        let mut buf = BytesMut::new();
        let mut cursor = NdrCursor::new();
        ptr.ndr_encode_complete(&mut buf, &ctx, &mut cursor).unwrap();

        let mut reader = buf.freeze();
        let mut cursor = NdrCursor::new();
        let decoded: FullPtr<i64> = FullPtr::ndr_decode_complete(&mut reader, &ctx, &mut cursor).unwrap();

        assert_eq!(decoded.as_ref(), Some(&12345));
    }

    #[test]
    fn test_referent_table_resolve_type_mismatch() {
        let mut table = ReferentTable::default();
        assert!(table.claim(4));
        assert!(!table.claim(4));
        assert_eq!(table.resolve::<u32>(4), None);

        table.materialize(4, &5u32);
        assert_eq!(table.resolve::<u32>(4), Some(5));
        assert_eq!(table.resolve::<u16>(4), None);
    }
}

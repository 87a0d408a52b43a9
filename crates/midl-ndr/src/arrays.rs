//! NDR array types
//!
//! NDR supports several array types:
//!
//! - Fixed arrays: size known at compile time
//! - Conformant arrays: size determined at runtime, transmitted as prefix
//! - Conformant varying arrays: both conformant and varying
//!
//! Every runtime-sized sequence is read through [`decode_elements`], which
//! applies the allocation limit before anything is reserved.

use crate::error::MAX_NDR_ARRAY_ELEMENTS;
use crate::{NdrContext, NdrCursor, NdrDecode, NdrEncode, NdrError, Result};
use bytes::{Buf, BufMut};

/// Fixed-size array
///
/// Wire format: just the elements (no size prefix)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedArray<T, const N: usize> {
    pub elements: [T; N],
}

impl<T: Default + Copy, const N: usize> Default for FixedArray<T, N> {
    fn default() -> Self {
        Self {
            elements: [T::default(); N],
        }
    }
}

impl<T, const N: usize> FixedArray<T, N> {
    pub fn new(elements: [T; N]) -> Self {
        Self { elements }
    }

    pub fn into_inner(self) -> [T; N] {
        self.elements
    }
}

impl<T: NdrEncode, const N: usize> NdrEncode for FixedArray<T, N> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        for elem in &self.elements {
            elem.ndr_encode(buf, ctx, cursor)?;
        }
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_deferred_all(&self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        T::ndr_align()
    }
}

impl<T: NdrDecode + Default + Copy, const N: usize> NdrDecode for FixedArray<T, N> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let mut elements = [T::default(); N];
        for elem in &mut elements {
            *elem = T::ndr_decode(buf, ctx, cursor)?;
        }
        Ok(Self { elements })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        decode_deferred_all(&mut self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        T::ndr_align()
    }
}

/// Conformant array - size determined at runtime
///
/// Wire format:
/// ```text
/// max_count: u32      # Maximum elements
/// elements[max_count] # Element data
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantArray<T> {
    pub elements: Vec<T>,
}

impl<T> ConformantArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<T> From<Vec<T>> for ConformantArray<T> {
    fn from(elements: Vec<T>) -> Self {
        Self { elements }
    }
}

impl<T: NdrEncode> NdrEncode for ConformantArray<T> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_conformance(buf, ctx, cursor, wire_count(self.elements.len())?);
        for elem in &self.elements {
            elem.ndr_encode(buf, ctx, cursor)?;
        }
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_deferred_all(&self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4 // For max_count
    }
}

impl<T: NdrDecode> NdrDecode for ConformantArray<T> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let max_count = decode_conformance(buf, ctx, cursor)? as usize;
        let elements = decode_elements(buf, ctx, cursor, max_count, T::ndr_decode)?;
        Ok(Self { elements })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        decode_deferred_all(&mut self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// Conformant varying array - size and subset determined at runtime
///
/// Wire format:
/// ```text
/// max_count: u32    # Maximum elements (conformance)
/// offset: u32       # First transmitted element
/// actual_count: u32 # Number of transmitted elements
/// elements[actual_count]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConformantVaryingArray<T> {
    pub max_count: usize,
    pub offset: usize,
    pub elements: Vec<T>,
}

impl<T> ConformantVaryingArray<T> {
    pub fn new(elements: Vec<T>) -> Self {
        let len = elements.len();
        Self {
            max_count: len,
            offset: 0,
            elements,
        }
    }

    pub fn with_max(max_count: usize, elements: Vec<T>) -> Self {
        Self {
            max_count,
            offset: 0,
            elements,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: NdrEncode> NdrEncode for ConformantVaryingArray<T> {
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        let actual_count = wire_count(self.elements.len())?;
        let total = self
            .offset
            .checked_add(self.elements.len())
            .ok_or(NdrError::IntegerOverflow)?;
        if total > self.max_count {
            return Err(NdrError::ConformanceMismatch {
                max_count: wire_count(self.max_count)?,
                actual_count,
            });
        }

        encode_conformance(buf, ctx, cursor, wire_count(self.max_count)?);
        ctx.put_u32(buf, wire_count(self.offset)?);
        ctx.put_u32(buf, actual_count);
        cursor.advance(8);

        for elem in &self.elements {
            elem.ndr_encode(buf, ctx, cursor)?;
        }
        Ok(())
    }

    fn ndr_encode_deferred<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        encode_deferred_all(&self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

impl<T: NdrDecode> NdrDecode for ConformantVaryingArray<T> {
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        cursor.read_align(buf, 4, 12)?;
        let max_count = ctx.get_u32(buf) as usize;
        let offset = ctx.get_u32(buf) as usize;
        let actual_count = ctx.get_u32(buf) as usize;
        cursor.advance(12);

        let total_count = offset.checked_add(actual_count).ok_or(NdrError::IntegerOverflow)?;
        if total_count > max_count {
            return Err(NdrError::ConformanceMismatch {
                max_count: max_count as u32,
                actual_count: actual_count as u32,
            });
        }

        let elements = decode_elements(buf, ctx, cursor, actual_count, T::ndr_decode)?;

        Ok(Self {
            max_count,
            offset,
            elements,
        })
    }

    fn ndr_decode_deferred<B: Buf>(&mut self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        decode_deferred_all(&mut self.elements, buf, ctx, cursor)
    }

    fn ndr_align() -> usize {
        4
    }
}

/// Pointees of array elements follow the whole array, in element order
fn encode_deferred_all<T: NdrEncode, B: BufMut>(
    elements: &[T],
    buf: &mut B,
    ctx: &NdrContext,
    cursor: &mut NdrCursor,
) -> Result<()> {
    elements
        .iter()
        .try_for_each(|elem| elem.ndr_encode_deferred(buf, ctx, cursor))
}

fn decode_deferred_all<T: NdrDecode, B: Buf>(
    elements: &mut [T],
    buf: &mut B,
    ctx: &NdrContext,
    cursor: &mut NdrCursor,
) -> Result<()> {
    elements
        .iter_mut()
        .try_for_each(|elem| elem.ndr_decode_deferred(buf, ctx, cursor))
}

/// Read `count` elements with `decode`, after checking `count` against the
/// allocation limit.
///
/// Every runtime-sized sequence is read through here. Capacity reserved up
/// front never exceeds the bytes left in the buffer.
pub fn decode_elements<B, T, F>(
    buf: &mut B,
    ctx: &NdrContext,
    cursor: &mut NdrCursor,
    count: usize,
    mut decode: F,
) -> Result<Vec<T>>
where
    B: Buf,
    F: FnMut(&mut B, &NdrContext, &mut NdrCursor) -> Result<T>,
{
    if count > MAX_NDR_ARRAY_ELEMENTS {
        return Err(NdrError::AllocationLimitExceeded {
            requested: count,
            limit: MAX_NDR_ARRAY_ELEMENTS,
        });
    }

    let mut elements = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        elements.push(decode(buf, ctx, cursor)?);
    }
    Ok(elements)
}

/// Encode conformance (max_count) separately for embedded conformant arrays
pub fn encode_conformance<B: BufMut>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor, max_count: u32) {
    cursor.write_align(buf, 4);
    ctx.put_u32(buf, max_count);
    cursor.advance(4);
}

/// Decode conformance (max_count) separately for embedded conformant arrays
pub fn decode_conformance<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<u32> {
    cursor.read_align(buf, 4, 4)?;
    let max_count = ctx.get_u32(buf);
    cursor.advance(4);
    Ok(max_count)
}

fn wire_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| NdrError::IntegerOverflow)
}

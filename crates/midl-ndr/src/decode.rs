//! NDR decoding trait

use crate::{NdrContext, NdrCursor, Result};
use bytes::Buf;

/// Trait for types that can be decoded from NDR format
///
/// Mirrors [`NdrEncode`](crate::NdrEncode): `ndr_decode` reads the inline
/// part and leaves embedded pointers pending, `ndr_decode_deferred` then reads
/// the pointees in wire order.
pub trait NdrDecode: Sized {
    /// Decode the inline part of a value at the cursor position.
    fn ndr_decode<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self>;

    /// Decode the pointees left pending by `ndr_decode`.
    fn ndr_decode_deferred<B: Buf>(&mut self, _buf: &mut B, _ctx: &NdrContext, _cursor: &mut NdrCursor) -> Result<()> {
        Ok(())
    }

    /// Decode a top-level value together with its deferred pointees.
    fn ndr_decode_complete<B: Buf>(buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<Self> {
        let mut value = Self::ndr_decode(buf, ctx, cursor)?;
        value.ndr_decode_deferred(buf, ctx, cursor)?;
        Ok(value)
    }

    /// Get the NDR alignment requirement for this type
    fn ndr_align() -> usize {
        1
    }
}

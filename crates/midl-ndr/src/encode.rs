//! NDR encoding trait

use crate::{NdrContext, NdrCursor, Result};
use bytes::BufMut;

/// Trait for types that can be encoded to NDR format
///
/// Encoding is split in two phases. `ndr_encode` writes the inline part of a
/// value (scalars, referent IDs of embedded pointers). `ndr_encode_deferred`
/// writes the pointees of those embedded pointers, which NDR places after the
/// outermost structure or array that contains them.
pub trait NdrEncode {
    /// Encode the inline part of this value at the cursor position.
    fn ndr_encode<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()>;

    /// Encode the deferred pointees of this value.
    fn ndr_encode_deferred<B: BufMut>(&self, _buf: &mut B, _ctx: &NdrContext, _cursor: &mut NdrCursor) -> Result<()> {
        Ok(())
    }

    /// Encode a top-level value: the inline part immediately followed by
    /// its deferred pointees.
    fn ndr_encode_complete<B: BufMut>(&self, buf: &mut B, ctx: &NdrContext, cursor: &mut NdrCursor) -> Result<()> {
        self.ndr_encode(buf, ctx, cursor)?;
        self.ndr_encode_deferred(buf, ctx, cursor)
    }

    /// Get the NDR alignment requirement for this type
    fn ndr_align() -> usize
    where
        Self: Sized,
    {
        1
    }
}
